//! Politics news aggregation.
//!
//! Fetches the configured RSS feeds, keeps only politics-related items
//! (keyword filter over title + description, spanning English and Nepali
//! terms), and returns them newest-first. A source that fails to fetch or
//! parse is reported alongside the results, never as a request failure.

use chrono::DateTime;
use netabase_common::config::{NewsConfig, NewsSource};
use netabase_common::{AppError, AppResult};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::Serialize;
use std::time::Duration;

/// Keywords that mark an item as politics content.
const POLITICS_KEYWORDS: &[&str] = &[
    "politics",
    "political",
    "government",
    "election",
    "राजनीति",
    "नेता",
    "संसद",
    "मन्त्री",
    "प्रधानमन्त्री",
    "दल",
    "कांग्रेस",
    "एमाले",
    "माओवादी",
    "सरकार",
];

/// A single aggregated news article.
#[derive(Debug, Clone, Serialize)]
pub struct NewsArticle {
    pub source_name: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub category: String,
    pub author: String,
    /// Raw RFC 2822 `pubDate` as published by the feed.
    pub pub_date: Option<String>,
    /// RFC 3339 rendering of `pub_date`, used for sorting.
    pub parsed_date: Option<String>,
    pub guid: String,
    pub image: Option<String>,
    pub content_type: &'static str,
}

/// A source that failed to fetch or parse this round.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFailure {
    pub source_name: String,
    pub error: String,
}

/// The aggregated news response payload.
#[derive(Debug, Serialize)]
pub struct NewsDigest {
    pub status: &'static str,
    pub total_articles: usize,
    pub data: Vec<NewsArticle>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SourceFailure>,
}

/// News aggregation service.
#[derive(Clone)]
pub struct NewsService {
    http: reqwest::Client,
    sources: Vec<NewsSource>,
    timeout: Duration,
}

impl NewsService {
    /// Create a news service from configuration.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &NewsConfig) -> Self {
        Self {
            http,
            sources: config.sources.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Fetch and aggregate all sources, newest first.
    pub async fn aggregate(&self) -> NewsDigest {
        let mut articles = Vec::new();
        let mut failures = Vec::new();

        for source in &self.sources {
            match self.fetch_source(source).await {
                Ok(mut items) => articles.append(&mut items),
                Err(e) => {
                    tracing::warn!(source = %source.name, error = %e, "News source failed");
                    failures.push(SourceFailure {
                        source_name: source.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        // Newest first; items without a parseable date sort last
        articles.sort_by(|a, b| b.parsed_date.cmp(&a.parsed_date));

        NewsDigest {
            status: "success",
            total_articles: articles.len(),
            data: articles,
            failures,
        }
    }

    /// Fetch one feed and return its politics items.
    async fn fetch_source(&self, source: &NewsSource) -> AppResult<Vec<NewsArticle>> {
        tracing::debug!(source = %source.name, url = %source.url, "Fetching RSS feed");

        let response = self
            .http
            .get(&source.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalService(format!(
                "HTTP {status} when fetching {}",
                source.url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        let items = parse_feed(&bytes, &source.name)?;
        let politics = items
            .into_iter()
            .filter(|item| is_politics(&format!("{} {}", item.title, item.description)))
            .collect::<Vec<_>>();

        tracing::debug!(
            source = %source.name,
            kept = politics.len(),
            "Filtered feed for politics content"
        );

        Ok(politics)
    }
}

/// Check whether text mentions politics (case-insensitive keyword match).
fn is_politics(text: &str) -> bool {
    let text = text.to_lowercase();
    POLITICS_KEYWORDS
        .iter()
        .any(|keyword| text.contains(&keyword.to_lowercase()))
}

#[derive(Default)]
struct ArticleBuilder {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    category: Option<String>,
    author: Option<String>,
    pub_date: Option<String>,
    guid: Option<String>,
    media_content_url: Option<String>,
    media_thumbnail_url: Option<String>,
    enclosure_url: Option<String>,
}

impl ArticleBuilder {
    fn set_field(&mut self, element: &str, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let slot = match element {
            "title" => &mut self.title,
            "link" => &mut self.link,
            "description" => &mut self.description,
            "category" => &mut self.category,
            "author" | "dc:creator" => &mut self.author,
            "pubDate" => &mut self.pub_date,
            "guid" => &mut self.guid,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(text.to_string());
        }
    }

    fn build(self, source_name: &str) -> Option<NewsArticle> {
        let title = self.title?;
        let link = self.link?;

        let parsed_date = self
            .pub_date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
            .map(|d| d.to_rfc3339());

        // media:content wins, then media:thumbnail, then enclosure
        let image = self
            .media_content_url
            .or(self.media_thumbnail_url)
            .or(self.enclosure_url);

        Some(NewsArticle {
            source_name: source_name.to_string(),
            guid: self.guid.unwrap_or_else(|| link.clone()),
            title,
            description: self.description.unwrap_or_default(),
            link,
            category: self.category.unwrap_or_default(),
            author: self.author.unwrap_or_else(|| source_name.to_string()),
            pub_date: self.pub_date,
            parsed_date,
            image,
            content_type: "politics",
        })
    }
}

/// Parse an RSS feed from raw XML bytes.
fn parse_feed(xml: &[u8], source_name: &str) -> AppResult<Vec<NewsArticle>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut buf = Vec::new();

    let mut current_item: Option<ArticleBuilder> = None;
    let mut current_element = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                current_element = name.clone();

                if name == "item" {
                    current_item = Some(ArticleBuilder::default());
                }

                read_image_attributes(&name, &e, current_item.as_mut());
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                read_image_attributes(&name, &e, current_item.as_mut());
            }
            Ok(Event::Text(e)) => {
                if let Some(ref mut item) = current_item {
                    let text = e.unescape().unwrap_or_default().to_string();
                    item.set_field(&current_element, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(ref mut item) = current_item {
                    let bytes = e.into_inner();
                    let text = String::from_utf8_lossy(&bytes).to_string();
                    item.set_field(&current_element, &text);
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "item" {
                    if let Some(item) = current_item.take() {
                        if let Some(article) = item.build(source_name) {
                            items.push(article);
                        }
                    }
                }
                current_element.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AppError::ExternalService(format!(
                    "XML parse error in {source_name} feed: {e}"
                )));
            }
            Ok(_) => {}
        }
        buf.clear();
    }

    Ok(items)
}

/// Capture image URLs carried as attributes on media/enclosure elements.
fn read_image_attributes(
    name: &str,
    element: &quick_xml::events::BytesStart<'_>,
    item: Option<&mut ArticleBuilder>,
) {
    let Some(item) = item else { return };

    let slot = match name {
        "media:content" => &mut item.media_content_url,
        "media:thumbnail" => &mut item.media_thumbnail_url,
        "enclosure" => &mut item.enclosure_url,
        _ => return,
    };

    for attr in element.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref());
        if key.as_ref() == "url" && slot.is_none() {
            let value = String::from_utf8_lossy(&attr.value);
            *slot = Some(value.to_string());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Example News</title>
    <item>
      <title>Government announces election date</title>
      <link>https://example.com/election-date</link>
      <description>The government confirmed the election schedule.</description>
      <category>Politics</category>
      <author>Desk</author>
      <pubDate>Tue, 04 Aug 2026 10:00:00 +0545</pubDate>
      <guid>https://example.com/election-date</guid>
      <media:content url="https://example.com/img/election.jpg" />
    </item>
    <item>
      <title>Local team wins football cup</title>
      <link>https://example.com/football</link>
      <description>A thrilling final match.</description>
      <pubDate>Tue, 04 Aug 2026 12:00:00 +0545</pubDate>
    </item>
    <item>
      <title>संसदमा नयाँ विधेयक पेस</title>
      <link>https://example.com/bill</link>
      <description>विधेयकमाथि छलफल सुरु।</description>
      <pubDate>Mon, 03 Aug 2026 08:00:00 +0545</pubDate>
      <enclosure url="https://example.com/img/bill.jpg" type="image/jpeg" />
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_is_politics_english() {
        assert!(is_politics("Government announces election date"));
        assert!(!is_politics("Local team wins football cup"));
    }

    #[test]
    fn test_is_politics_nepali() {
        assert!(is_politics("संसदमा नयाँ विधेयक पेस"));
    }

    #[test]
    fn test_is_politics_case_insensitive() {
        assert!(is_politics("POLITICAL crisis deepens"));
    }

    #[test]
    fn test_parse_feed_extracts_items() {
        let items = parse_feed(SAMPLE_FEED.as_bytes(), "example").unwrap();
        assert_eq!(items.len(), 3);

        let first = &items[0];
        assert_eq!(first.title, "Government announces election date");
        assert_eq!(first.link, "https://example.com/election-date");
        assert_eq!(first.category, "Politics");
        assert_eq!(first.author, "Desk");
        assert_eq!(first.source_name, "example");
        assert_eq!(
            first.image.as_deref(),
            Some("https://example.com/img/election.jpg")
        );
        assert!(first.parsed_date.is_some());
    }

    #[test]
    fn test_parse_feed_enclosure_image() {
        let items = parse_feed(SAMPLE_FEED.as_bytes(), "example").unwrap();
        assert_eq!(
            items[2].image.as_deref(),
            Some("https://example.com/img/bill.jpg")
        );
    }

    #[test]
    fn test_parse_feed_defaults() {
        let items = parse_feed(SAMPLE_FEED.as_bytes(), "example").unwrap();
        // No author or guid on the football item
        assert_eq!(items[1].author, "example");
        assert_eq!(items[1].guid, "https://example.com/football");
        assert_eq!(items[1].category, "");
    }

    #[test]
    fn test_politics_filter_keeps_two_of_three() {
        let items = parse_feed(SAMPLE_FEED.as_bytes(), "example").unwrap();
        let politics: Vec<_> = items
            .into_iter()
            .filter(|i| is_politics(&format!("{} {}", i.title, i.description)))
            .collect();
        assert_eq!(politics.len(), 2);
    }

    #[test]
    fn test_parse_date_to_rfc3339() {
        let items = parse_feed(SAMPLE_FEED.as_bytes(), "example").unwrap();
        let parsed = items[0].parsed_date.as_deref().unwrap();
        assert!(parsed.starts_with("2026-08-04T10:00:00"));
    }

    #[test]
    fn test_digest_sorting_newest_first() {
        let mut articles = parse_feed(SAMPLE_FEED.as_bytes(), "example").unwrap();
        articles.sort_by(|a, b| b.parsed_date.cmp(&a.parsed_date));
        assert_eq!(articles[0].title, "Local team wins football cup");
        assert_eq!(articles[2].title, "संसदमा नयाँ विधेयक पेस");
    }
}
