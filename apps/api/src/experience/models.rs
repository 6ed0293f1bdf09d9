use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthParseError {
    #[error("expected YYYY-MM, got '{0}'")]
    Malformed(String),

    #[error("year {0} is outside 1900..=2100")]
    YearOutOfRange(i32),

    #[error("month {0} is outside 1..=12")]
    MonthOutOfRange(u32),
}

/// A concrete calendar month. Day and time are never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthParseError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(MonthParseError::YearOutOfRange(year));
        }
        if !(1..=12).contains(&month) {
            return Err(MonthParseError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// Clamps into the supported range instead of failing.
    pub fn saturating(year: i32, month: u32) -> Self {
        Self {
            year: year.clamp(MIN_YEAR, MAX_YEAR),
            month: month.clamp(1, 12),
        }
    }

    pub fn from_date(date: NaiveDate) -> Result<Self, MonthParseError> {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Signed number of months from `self` to `later`.
    pub fn months_until(&self, later: YearMonth) -> i32 {
        (later.year - self.year) * 12 + (later.month as i32 - self.month as i32)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || MonthParseError::Malformed(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(malformed)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(malformed());
        }
        let year = year.parse::<i32>().map_err(|_| malformed())?;
        let month = month.parse::<u32>().map_err(|_| malformed())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Start month of a position. `Unknown` sorts after every known month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CanonicalMonth {
    Known(YearMonth),
    Unknown,
}

impl CanonicalMonth {
    pub fn known(&self) -> Option<YearMonth> {
        match self {
            CanonicalMonth::Known(month) => Some(*month),
            CanonicalMonth::Unknown => None,
        }
    }
}

impl From<YearMonth> for CanonicalMonth {
    fn from(value: YearMonth) -> Self {
        CanonicalMonth::Known(value)
    }
}

impl fmt::Display for CanonicalMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalMonth::Known(month) => month.fmt(f),
            CanonicalMonth::Unknown => f.write_str("unknown"),
        }
    }
}

impl TryFrom<String> for CanonicalMonth {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case("unknown") {
            return Ok(CanonicalMonth::Unknown);
        }
        value.parse().map(CanonicalMonth::Known)
    }
}

impl From<CanonicalMonth> for String {
    fn from(value: CanonicalMonth) -> Self {
        value.to_string()
    }
}

/// Output of the date token normalizer: a concrete month, or a sentinel such
/// as "present" / "null" whose meaning depends on which end of the range it sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateToken {
    Month(YearMonth),
    Open,
}

/// An experience record that already carries explicit fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredExperience {
    pub title: String,
    pub company: String,
    /// Missing or null reads as blank, which the adapter resolves to an unknown start.
    #[serde(
        rename = "startDate",
        alias = "start_date",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub start_date: String,
    #[serde(rename = "endDate", alias = "end_date", default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One input entry: free text from the extraction step, or a structured record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawEntry {
    FreeText(String),
    Structured(StructuredExperience),
}

impl From<&str> for RawEntry {
    fn from(value: &str) -> Self {
        RawEntry::FreeText(value.to_string())
    }
}

impl From<StructuredExperience> for RawEntry {
    fn from(value: StructuredExperience) -> Self {
        RawEntry::Structured(value)
    }
}

/// Months plus the human-readable phrase for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenure {
    pub months: u32,
    pub text: String,
}

/// A single normalized position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedPosition {
    pub title: String,
    pub company: String,
    pub start: CanonicalMonth,
    pub end: YearMonth,
    /// End token was a sentinel or missing and resolved to the current month.
    pub open_ended: bool,
    pub duration_months: u32,
    pub duration_text: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub original_text: String,
}

/// A maximal run of positions at one employer without a gap over one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stint {
    pub company: String,
    pub positions: Vec<ParsedPosition>,
    pub total_duration_months: u32,
    pub total_duration_text: String,
    pub earliest_start: CanonicalMonth,
    pub latest_end: YearMonth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceSummary {
    pub total_duration_text: String,
    pub total_duration_months: u32,
    pub stints: Vec<Stint>,
    pub positions: Vec<ParsedPosition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_year_month_display_is_zero_padded() {
        assert_eq!(ym(2022, 3).to_string(), "2022-03");
    }

    #[test]
    fn test_year_month_parse_round_trips_display() {
        let month = ym(1999, 11);
        assert_eq!(month.to_string().parse::<YearMonth>().unwrap(), month);
    }

    #[test]
    fn test_year_month_rejects_out_of_range() {
        assert_eq!(
            YearMonth::new(1899, 5),
            Err(MonthParseError::YearOutOfRange(1899))
        );
        assert_eq!(
            YearMonth::new(2101, 5),
            Err(MonthParseError::YearOutOfRange(2101))
        );
        assert_eq!(
            "2020-13".parse::<YearMonth>(),
            Err(MonthParseError::MonthOutOfRange(13))
        );
    }

    #[test]
    fn test_year_month_rejects_garbage() {
        assert!("2020".parse::<YearMonth>().is_err());
        assert!("20-01".parse::<YearMonth>().is_err());
        assert!("2020-1x".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_months_until_is_signed() {
        assert_eq!(ym(2022, 1).months_until(ym(2023, 1)), 12);
        assert_eq!(ym(2022, 11).months_until(ym(2023, 2)), 3);
        assert_eq!(ym(2022, 1).months_until(ym(2021, 1)), -12);
    }

    #[test]
    fn test_unknown_sorts_after_known() {
        let known = CanonicalMonth::Known(ym(2100, 12));
        assert!(known < CanonicalMonth::Unknown);
    }

    #[test]
    fn test_canonical_month_serde() {
        let json = serde_json::to_string(&CanonicalMonth::Known(ym(2024, 2))).unwrap();
        assert_eq!(json, r#""2024-02""#);
        let unknown: CanonicalMonth = serde_json::from_str(r#""unknown""#).unwrap();
        assert_eq!(unknown, CanonicalMonth::Unknown);
    }

    #[test]
    fn test_raw_entry_dispatches_on_shape() {
        let json = r#"[
            "Engineer at Acme (2020-01-01 to 2021-01-01)",
            {"title": "CTO", "company": "Initech", "startDate": "2021-02-01", "endDate": null}
        ]"#;
        let entries: Vec<RawEntry> = serde_json::from_str(json).unwrap();
        assert!(matches!(entries[0], RawEntry::FreeText(_)));
        match &entries[1] {
            RawEntry::Structured(s) => {
                assert_eq!(s.start_date, "2021-02-01");
                assert_eq!(s.end_date, None);
            }
            other => panic!("expected structured entry, got {other:?}"),
        }
    }

    #[test]
    fn test_structured_accepts_snake_case_dates() {
        let json = r#"{"title": "CTO", "company": "Initech", "start_date": "2021-02-01", "end_date": "present"}"#;
        let entry: StructuredExperience = serde_json::from_str(json).unwrap();
        assert_eq!(entry.end_date.as_deref(), Some("present"));
    }

    #[test]
    fn test_structured_null_or_missing_start_is_blank() {
        let json = r#"[
            {"title": "CTO", "company": "Initech", "startDate": null},
            {"title": "CTO", "company": "Initech"}
        ]"#;
        let entries: Vec<RawEntry> = serde_json::from_str(json).unwrap();
        for entry in &entries {
            match entry {
                RawEntry::Structured(s) => assert_eq!(s.start_date, ""),
                other => panic!("expected structured entry, got {other:?}"),
            }
        }
    }
}
