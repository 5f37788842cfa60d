//! Slug derivation.
//!
//! Parties and politicians are addressed by a URL-safe slug derived from
//! their name at creation time. The slug is immutable afterwards; renames
//! never change it.

/// Derive a URL-safe slug from a display name.
///
/// Lowercases ASCII, maps every run of non-alphanumeric characters to a
/// single `-`, and trims leading/trailing dashes. Non-ASCII characters are
/// kept as-is so names in other scripts still produce usable slugs.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }

    slug
}
