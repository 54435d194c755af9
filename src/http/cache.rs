//! Conditional request validators
//!
//! `If-None-Match` and `If-Modified-Since` checks against the facts in a
//! resource descriptor.

use crate::http::date;

/// `If-None-Match` comparison: surrounding quotes (double or single) are
/// stripped, the rest is byte-exact against the identity tag.
pub fn none_match(if_none_match: &str, identity_tag: &str) -> bool {
    let stripped = if_none_match.trim_matches(|c| c == '"' || c == '\'');
    stripped == identity_tag
}

/// `If-Modified-Since` comparison.
///
/// Matches only when the parsed instant equals the file mtime exactly, not
/// at-or-after, so a browser replaying an older date revalidates to a 200.
/// Candidate for a `>=` comparison.
pub fn not_modified_since(if_modified_since: &str, modified_at: i64) -> bool {
    date::parse_http_date(if_modified_since) == Some(modified_at)
}
