//! max-age expressions
//!
//! A max-age is written either as integer seconds or as a short duration
//! vocabulary: `"1w"`, `"2 days"`, `"+1 hour"`, `"1w 3d"`. Everything is
//! resolved to seconds at load time; a negative result is rejected there,
//! never deferred into request handling.

use crate::error::ConfigError;

const UNITS: &[(&str, i64)] = &[
    ("seconds", 1),
    ("second", 1),
    ("secs", 1),
    ("sec", 1),
    ("s", 1),
    ("minutes", 60),
    ("minute", 60),
    ("mins", 60),
    ("min", 60),
    ("m", 60),
    ("hours", 3600),
    ("hour", 3600),
    ("hrs", 3600),
    ("hr", 3600),
    ("h", 3600),
    ("days", 86_400),
    ("day", 86_400),
    ("d", 86_400),
    ("weeks", 604_800),
    ("week", 604_800),
    ("w", 604_800),
];

/// Resolve a max-age expression to seconds.
pub fn parse_max_age(expr: &str) -> Result<u64, ConfigError> {
    let trimmed = expr.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed).trim_start();
    if body.is_empty() {
        return Err(ConfigError::BadMaxAge(expr.to_string()));
    }

    // Plain integer seconds
    if let Ok(n) = body.parse::<i64>() {
        return u64::try_from(n).map_err(|_| ConfigError::NegativeMaxAge(n));
    }

    // Duration vocabulary, possibly compound: "1w 3d"
    let mut total: i64 = 0;
    let mut rest = body;
    while !rest.trim_start().is_empty() {
        rest = rest.trim_start();
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '-')
            .unwrap_or(rest.len());
        let (num_str, after) = rest.split_at(digits_end);
        let value: i64 = num_str
            .parse()
            .map_err(|_| ConfigError::BadMaxAge(expr.to_string()))?;

        let after = after.trim_start();
        let unit_end = after
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(after.len());
        let (unit_str, tail) = after.split_at(unit_end);
        let unit = unit_seconds(unit_str).ok_or_else(|| ConfigError::BadMaxAge(expr.to_string()))?;

        total = value
            .checked_mul(unit)
            .and_then(|part| total.checked_add(part))
            .ok_or_else(|| ConfigError::BadMaxAge(expr.to_string()))?;
        rest = tail;
    }

    u64::try_from(total).map_err(|_| ConfigError::NegativeMaxAge(total))
}

fn unit_seconds(unit: &str) -> Option<i64> {
    let unit = unit.to_ascii_lowercase();
    UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, secs)| *secs)
}
