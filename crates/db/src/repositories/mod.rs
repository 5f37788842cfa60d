//! Database repositories.
//!
//! One repository per aggregate, each a thin typed wrapper over the shared
//! connection. Repositories translate `DbErr` into [`AppError`] and keep
//! query construction out of the service layer.

#![allow(missing_docs)]

mod initiative;
mod party;
mod politician;
mod promise;
mod rating;
mod user;

pub use initiative::InitiativeRepository;
pub use party::{PartyListQuery, PartyOrder, PartyRepository};
pub use politician::{
    PoliticianListQuery, PoliticianListRow, PoliticianOrder, PoliticianRepository,
};
pub use promise::PromiseRepository;
pub use rating::{RatingListQuery, RatingOrder, RatingRepository};
pub use user::UserRepository;

/// Escape `%`, `_` and `\` in user-supplied search input before embedding it
/// in a LIKE/ILIKE pattern.
#[must_use]
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_passthrough() {
        assert_eq!(escape_like("jane doe"), "jane doe");
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
