//! Range header resolution
//!
//! Resolves a client `Range` header against a known file size into a byte
//! window. Only the first range of a multi-range request is honored; the
//! rest is silently discarded (no `multipart/byteranges` support).

/// Outcome of resolving a `Range` header against a file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeWindow {
    /// No `Range` header, or the request resolves to the whole file
    Full,
    /// A proper sub-window, inclusive bounds
    Partial { start: u64, end: u64 },
    /// Unusable header, answer 416
    Bad,
}

/// Resolve a `Range` header value into a byte window.
///
/// `size` is the stat size of the file; callers only invoke this for files
/// that are eligible for range serving.
///
/// # Examples
/// ```
/// use servefile::http::range::{resolve_range, RangeWindow};
///
/// assert_eq!(
///     resolve_range(Some("bytes=100-199"), 1000),
///     RangeWindow::Partial { start: 100, end: 199 },
/// );
/// assert_eq!(resolve_range(None, 1000), RangeWindow::Full);
/// ```
pub fn resolve_range(header: Option<&str>, size: u64) -> RangeWindow {
    let Some(header) = header else {
        return RangeWindow::Full;
    };

    let Some((unit, ranges)) = header.split_once('=') else {
        return RangeWindow::Bad;
    };
    if unit != "bytes" {
        return RangeWindow::Bad;
    }

    // Only the first range of a multi-range request is honored.
    let first = ranges.split(',').next().unwrap_or(ranges);
    let (start_str, end_str) = first.split_once('-').unwrap_or((first, ""));

    // Suffix form "bytes=-N": the empty start resolves to 0 before the
    // trailing-N length can be applied, so the request collapses to the
    // full file. Kept as-is for compatibility with long-standing behavior;
    // real trailing-N support is the eventual fix.
    if start_str.is_empty() {
        return RangeWindow::Full;
    }

    let Some(start_abs) = parse_bound(start_str) else {
        return RangeWindow::Bad;
    };
    let end = if end_str.is_empty() {
        size.saturating_sub(1)
    } else {
        match parse_bound(end_str) {
            Some(end_abs) => end_abs.min(size.saturating_sub(1)),
            None => return RangeWindow::Bad,
        }
    };

    // A start past the resolved end is pulled back to 0 instead of being
    // rejected. Candidate for a strict 416 on inverted windows.
    let start = if end < start_abs { 0 } else { start_abs };

    if start > 0 || end < size.saturating_sub(1) {
        RangeWindow::Partial { start, end }
    } else {
        RangeWindow::Full
    }
}

/// Numeric range bound. Signed integers are accepted and coerced positive;
/// anything that is not an integer at all is a bad range.
fn parse_bound(s: &str) -> Option<u64> {
    s.trim().parse::<i64>().ok().map(i64::unsigned_abs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_header_is_full() {
        assert_eq!(resolve_range(None, 1000), RangeWindow::Full);
    }

    #[test]
    fn bounded_window() {
        assert_eq!(
            resolve_range(Some("bytes=100-199"), 1000),
            RangeWindow::Partial { start: 100, end: 199 },
        );
    }

    #[test]
    fn open_ended_window() {
        assert_eq!(
            resolve_range(Some("bytes=100-"), 1000),
            RangeWindow::Partial { start: 100, end: 999 },
        );
    }

    #[test]
    fn whole_file_window_is_full() {
        assert_eq!(resolve_range(Some("bytes=0-999"), 1000), RangeWindow::Full);
    }

    #[test]
    fn end_clamped_to_size() {
        assert_eq!(
            resolve_range(Some("bytes=990-2000"), 1000),
            RangeWindow::Partial { start: 990, end: 999 },
        );
    }

    // Pins the suffix fallback: "bytes=-50" serves the whole file, not the
    // trailing 50 bytes.
    #[test]
    fn suffix_request_collapses_to_full() {
        assert_eq!(resolve_range(Some("bytes=-50"), 1000), RangeWindow::Full);
    }

    // Pins the sign coercion: a negative end bound is read as positive.
    #[test]
    fn negative_bound_coerced_positive() {
        assert_eq!(
            resolve_range(Some("bytes=5--10"), 1000),
            RangeWindow::Partial { start: 5, end: 10 },
        );
    }

    // Pins the inverted-window coercion: start falls back to 0.
    #[test]
    fn inverted_window_starts_at_zero() {
        assert_eq!(
            resolve_range(Some("bytes=200-100"), 1000),
            RangeWindow::Partial { start: 0, end: 100 },
        );
    }

    #[test]
    fn non_numeric_bounds_are_bad() {
        assert_eq!(resolve_range(Some("bytes=abc-def"), 1000), RangeWindow::Bad);
        assert_eq!(resolve_range(Some("bytes=10-def"), 1000), RangeWindow::Bad);
    }

    #[test]
    fn wrong_unit_is_bad() {
        assert_eq!(resolve_range(Some("items=0-5"), 1000), RangeWindow::Bad);
        assert_eq!(resolve_range(Some("bytes 0-5"), 1000), RangeWindow::Bad);
    }

    #[test]
    fn only_first_range_honored() {
        assert_eq!(
            resolve_range(Some("bytes=0-499,500-999"), 1000),
            RangeWindow::Partial { start: 0, end: 499 },
        );
    }
}
