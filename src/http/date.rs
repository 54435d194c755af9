//! HTTP date handling
//!
//! RFC 1123 formatting with the literal `GMT` zone, and lenient parsing of
//! the date formats clients still send.

use chrono::{DateTime, NaiveDateTime, Utc};

/// The only format we emit: `Sun, 06 Nov 1994 08:49:37 GMT`.
const RFC1123: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// RFC 850 with a two-digit year, still seen from old proxies.
const RFC850: &str = "%A, %d-%b-%y %H:%M:%S GMT";

/// ANSI C asctime, the third format the HTTP grammar grandfathers in.
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Format a unix timestamp as an RFC 1123 HTTP date.
pub fn format_http_date(unix_secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(unix_secs, 0)
        .unwrap_or_default()
        .format(RFC1123)
        .to_string()
}

/// Parse an HTTP date in any accepted format to unix seconds.
///
/// Returns `None` when nothing matches; callers treat an unparseable
/// validator as absent.
pub fn parse_http_date(value: &str) -> Option<i64> {
    let value = value.trim();
    for fmt in [RFC1123, RFC850, ASCTIME] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.and_utc().timestamp());
        }
    }
    // Senders that spell the zone as "+0000" instead of "GMT"
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.timestamp())
}
