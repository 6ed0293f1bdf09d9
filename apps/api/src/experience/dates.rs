//! Date token normalizer.
//!
//! Turns one raw date token into a canonical month or an open sentinel.
//! Accepted shapes:
//! - `YYYY-MM-DD`, ISO timestamps with or without offset (date taken as written)
//! - `YYYY-MM`
//! - `Mon YYYY` / `Month YYYY`, case-insensitive, `sept` included
//! - `starting <date>`
//! - sentinels: `present`, `now`, `current`, `ongoing`, `today`, `null`,
//!   `none`, `unknown`, `n/a`

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::experience::models::{CanonicalMonth, DateToken, YearMonth};

const OPEN_SENTINELS: &[&str] = &[
    "", "present", "now", "current", "ongoing", "today", "null", "none", "unknown", "n/a",
];

const MONTH_NAMES: &[(&str, u32)] = &[
    ("jan", 1),
    ("january", 1),
    ("feb", 2),
    ("february", 2),
    ("mar", 3),
    ("march", 3),
    ("apr", 4),
    ("april", 4),
    ("may", 5),
    ("jun", 6),
    ("june", 6),
    ("jul", 7),
    ("july", 7),
    ("aug", 8),
    ("august", 8),
    ("sep", 9),
    ("sept", 9),
    ("september", 9),
    ("oct", 10),
    ("october", 10),
    ("nov", 11),
    ("november", 11),
    ("dec", 12),
    ("december", 12),
];

/// Regex fragment matching one date token, for embedding in grammar rules.
/// Must be compiled case-insensitively. Anything it matches is handed to
/// [`normalize_token`], which still has the final say.
pub const DATE_TOKEN_PATTERN: &str = concat!(
    r"(?:(?:starting\s+)?(?:",
    r"\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?",
    r"|\d{4}-\d{1,2}",
    r"|(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?",
    r"|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?,?\s+\d{4}",
    r")|(?:present|now|current|ongoing|today|null|none|unknown|n/a)\b)",
);

static MONTH_NAME_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z]+)\.?,?\s+(\d{4})$").unwrap());

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalizes a single date token. Returns `None` when the token is not a
/// recognizable date or its year falls outside 1900..=2100.
pub fn normalize_token(token: &str) -> Option<DateToken> {
    let cleaned = token.trim().trim_end_matches(['.', ',', ';']).trim_end();
    let lower = cleaned.to_lowercase();

    if OPEN_SENTINELS.contains(&lower.as_str()) {
        return Some(DateToken::Open);
    }

    if let Some(rest) = lower.strip_prefix("starting") {
        if rest.is_empty() {
            return Some(DateToken::Open);
        }
        if rest.starts_with(char::is_whitespace) {
            // Same offset in `cleaned` since the prefix is ASCII.
            let date = cleaned["starting".len()..].trim();
            return parse_month(date).map(DateToken::Month);
        }
        return None;
    }

    parse_month(cleaned).map(DateToken::Month)
}

/// Resolves a token in start position: sentinels mean the start is unknown.
pub fn resolve_start(token: &str) -> Option<CanonicalMonth> {
    match normalize_token(token)? {
        DateToken::Month(month) => Some(CanonicalMonth::Known(month)),
        DateToken::Open => Some(CanonicalMonth::Unknown),
    }
}

/// Resolves a token in end position: sentinels mean the position is ongoing
/// and end in `current`. The flag reports whether that happened.
pub fn resolve_end(token: &str, current: YearMonth) -> Option<(YearMonth, bool)> {
    match normalize_token(token)? {
        DateToken::Month(month) => Some((month, false)),
        DateToken::Open => Some((current, true)),
    }
}

fn parse_month(value: &str) -> Option<YearMonth> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return YearMonth::from_date(date).ok();
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
        return YearMonth::from_date(stamp.date_naive()).ok();
    }
    if let Ok(stamp) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return YearMonth::from_date(stamp.date_naive()).ok();
    }
    for format in DATETIME_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(value, format) {
            return YearMonth::from_date(stamp.date()).ok();
        }
    }
    if let Ok(month) = value.parse::<YearMonth>() {
        return Some(month);
    }
    parse_month_name(value)
}

fn parse_month_name(value: &str) -> Option<YearMonth> {
    let lower = value.to_lowercase();
    let caps = MONTH_NAME_DATE.captures(&lower)?;
    let name = caps.get(1)?.as_str();
    let month = MONTH_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, number)| *number)?;
    let year = caps.get(2)?.as_str().parse::<i32>().ok()?;
    YearMonth::new(year, month).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn month_of(token: &str) -> Option<YearMonth> {
        match normalize_token(token)? {
            DateToken::Month(month) => Some(month),
            DateToken::Open => None,
        }
    }

    #[test]
    fn test_iso_date_drops_day() {
        assert_eq!(month_of("2025-07-01"), Some(ym(2025, 7)));
        assert_eq!(month_of("2019-12-31"), Some(ym(2019, 12)));
    }

    #[test]
    fn test_iso_timestamp_with_offset_keeps_written_date() {
        assert_eq!(month_of("2024-03-31T23:30:00-05:00"), Some(ym(2024, 3)));
        assert_eq!(month_of("2024-03-31T23:30:00.000Z"), Some(ym(2024, 3)));
        assert_eq!(month_of("2024-03-31T23:30:00+0530"), Some(ym(2024, 3)));
    }

    #[test]
    fn test_naive_timestamp() {
        assert_eq!(month_of("2021-06-15T08:00:00"), Some(ym(2021, 6)));
        assert_eq!(month_of("2021-06-15 08:00"), Some(ym(2021, 6)));
    }

    #[test]
    fn test_bare_year_month() {
        assert_eq!(month_of("2020-01"), Some(ym(2020, 1)));
        assert_eq!(month_of("2020-1"), Some(ym(2020, 1)));
    }

    #[test]
    fn test_month_names_case_insensitive() {
        assert_eq!(month_of("Jan 2020"), Some(ym(2020, 1)));
        assert_eq!(month_of("JANUARY 2020"), Some(ym(2020, 1)));
        assert_eq!(month_of("sept 2018"), Some(ym(2018, 9)));
        assert_eq!(month_of("Sep. 2018"), Some(ym(2018, 9)));
        assert_eq!(month_of("December, 2015"), Some(ym(2015, 12)));
    }

    #[test]
    fn test_malformed_month_name_fails() {
        assert_eq!(normalize_token("Septembr 2018"), None);
        assert_eq!(normalize_token("Smarch 2018"), None);
    }

    #[test]
    fn test_sentinels_are_open() {
        for token in ["present", "Present", "NOW", "null", "unknown", "Current", " ongoing "] {
            assert_eq!(normalize_token(token), Some(DateToken::Open), "{token}");
        }
    }

    #[test]
    fn test_starting_prefix() {
        assert_eq!(month_of("starting Jan 2024"), Some(ym(2024, 1)));
        assert_eq!(month_of("Starting 2023-05-01"), Some(ym(2023, 5)));
        assert_eq!(normalize_token("starting"), Some(DateToken::Open));
        assert_eq!(normalize_token("startingly"), None);
    }

    #[test]
    fn test_out_of_range_years_fail() {
        assert_eq!(normalize_token("1899-12-01"), None);
        assert_eq!(normalize_token("2101-01"), None);
        assert_eq!(normalize_token("Jan 1850"), None);
    }

    #[test]
    fn test_unrecognized_tokens_fail() {
        assert_eq!(normalize_token("last summer"), None);
        assert_eq!(normalize_token("2020-13-01"), None);
        assert_eq!(normalize_token("2020"), None);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for token in ["2025-07-01", "Sept 2018", "2024-03-31T23:30:00Z", "1900-01"] {
            let first = month_of(token).unwrap();
            assert_eq!(month_of(&first.to_string()), Some(first), "{token}");
        }
    }

    #[test]
    fn test_resolve_start_maps_sentinel_to_unknown() {
        assert_eq!(resolve_start("unknown"), Some(CanonicalMonth::Unknown));
        assert_eq!(
            resolve_start("2020-02-02"),
            Some(CanonicalMonth::Known(ym(2020, 2)))
        );
        assert_eq!(resolve_start("whenever"), None);
    }

    #[test]
    fn test_resolve_end_maps_sentinel_to_current_month() {
        let now = ym(2025, 10);
        assert_eq!(resolve_end("Present", now), Some((now, true)));
        assert_eq!(resolve_end("2021-04", now), Some((ym(2021, 4), false)));
    }

    #[test]
    fn test_date_pattern_matches_whole_tokens() {
        let re = Regex::new(&format!("(?i)^{DATE_TOKEN_PATTERN}$")).unwrap();
        for token in [
            "2025-07-01",
            "2025-07",
            "2024-03-31T23:30:00-05:00",
            "Sept 2018",
            "March, 2019",
            "starting Jan 2024",
            "Present",
            "n/a",
        ] {
            assert!(re.is_match(token), "{token}");
        }
        assert!(!re.is_match("nowhere"));
        assert!(!re.is_match("2020"));
    }
}
