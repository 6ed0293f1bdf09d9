//! Grammar matcher: ordered, regex-based recognizers for free-text experience lines.
//!
//! Each rule is one date syntax combined with one title/company separator,
//! compiled once into an anchored regex with named groups
//! (`title`, `company`, `start`, `end`, `location`, `description`).
//! Rules are tried in declaration order and the first rule whose dates also
//! normalize wins. Order is part of the contract:
//! - date syntaxes run from most to least specific, so a loose trailing-range
//!   rule never steals text a labeled or parenthesized rule would have split
//!   differently
//! - within a syntax, `at` is tried before `@`, `—`, `|`, `,` and a spaced `-`,
//!   so "Engineer, Platform at Acme" keeps the comma inside the title

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::experience::dates::{normalize_token, DATE_TOKEN_PATTERN};

/// Separator between the two dates of a range.
const RANGE: &str = r"\s*(?:-|–|—|to|until|through|thru)\s*";

/// Optional trailing location after a closing separator.
const TRAILING_LOCATION: &str = r"(?:\s*[|;,–—-]\s*(?P<location>.+?))?";

/// Date syntaxes in priority order. `{date}` and `{range}` are expanded at
/// compile time; `{location}` becomes [`TRAILING_LOCATION`].
const DATE_SYNTAXES: &[(&str, &str)] = &[
    // Founder at Stealth (start_date: 2025-07-01 - end_date: Present) — High-signal data.
    (
        "labeled_dates",
        r"\s*[,;:–—-]?\s*\(?\s*start[_ ]date\s*[:=]\s*(?P<start>{date})\s*[-–—,;|]?\s*end[_ ]date\s*[:=]\s*(?P<end>{date})\s*\)?(?:\s*[—–|;:,.-]?\s*(?P<description>.+?))?",
    ),
    // Engineer @ Initech start=2019-03-01, end=2021-08-15 | Austin, TX
    (
        "key_value_dates",
        r"\s*[,;:–—-]?\s*[(\[]?\s*start\s*[=:]\s*(?P<start>{date})\s*[,;]?\s*end\s*[=:]\s*(?P<end>{date})\s*[)\]]?{location}",
    ),
    // Software Engineer, Google, January 2020–March 2022; Mountain View, CA. Built search.
    (
        "range_location_description",
        r"\s*[,|:–—-]?\s*\(?(?P<start>{date}){range}(?P<end>{date})\)?\s*;\s*(?P<location>[^.;]+?)\s*(?:\.\s*(?P<description>.*?))?",
    ),
    // Data Analyst at Beat (2018-05 – 2020-02), Athens
    (
        "parenthesized_range_with_location",
        r"\s*[,;:–—-]?\s*\(\s*(?P<start>{date}){range}(?P<end>{date})\s*\)\s*,\s*(?P<location>.+?)",
    ),
    // Product Manager at Globex (Mar 2021 to Present) | Led the billing revamp
    (
        "parenthesized_range",
        r"\s*[,;:–—-]?\s*\(\s*(?P<start>{date}){range}(?P<end>{date})\s*\)(?:\s*[|;:.–—-]?\s*(?P<description>.+?))?",
    ),
    // Staff Engineer at Hooli, starting Jan 2024
    (
        "starting",
        r"\s*[,;:–—-]?\s*\(?\s*(?:starting|since|from)\s+(?P<start>{date})\s*\)?{location}",
    ),
    // Engineer | Acme Corp | 2020-01 - 2022-03 | Remote
    // Engineer, Acme, 2020-01-01, 2021-06-30, Berlin
    (
        "trailing_range",
        r"\s*[,|;:–—-]?\s*\(?(?P<start>{date})(?:{range}|\s*,\s*)(?P<end>{date})\)?{location}",
    ),
];

/// Title/company separators in priority order.
const SEPARATORS: &[(&str, &str)] = &[
    ("at", r"\s+at\s+"),
    ("at_sign", r"\s*@\s*"),
    ("em_dash", r"\s*—\s*"),
    ("pipe", r"\s*\|\s*"),
    ("comma", r"\s*,\s*"),
    ("dash", r"\s+[-–]\s+"),
];

/// Characters stripped from the edges of every captured field.
const EDGE_PUNCTUATION: &[char] = &[',', ';', ':', '|', '-', '–', '—'];

/// Fields extracted from one free-text entry, before date normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFields {
    pub title: String,
    pub company: String,
    pub raw_start: String,
    /// `None` when the syntax has no end date (e.g. "starting Jan 2024").
    pub raw_end: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl RawFields {
    fn dates_normalize(&self) -> bool {
        normalize_token(&self.raw_start).is_some()
            && self
                .raw_end
                .as_deref()
                .map_or(true, |end| normalize_token(end).is_some())
    }
}

/// The winning rule and what it extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarMatch {
    pub syntax: &'static str,
    pub separator: &'static str,
    pub fields: RawFields,
}

/// One recognizer: a date syntax paired with a separator.
pub struct GrammarRule {
    pub syntax: &'static str,
    pub separator: &'static str,
    regex: Regex,
}

impl GrammarRule {
    fn compile(syntax: &'static str, tail: &str, separator: &'static str, sep: &str) -> Self {
        let tail = tail
            .replace("{date}", DATE_TOKEN_PATTERN)
            .replace("{range}", RANGE)
            .replace("{location}", TRAILING_LOCATION);
        let pattern = format!(r"(?i)^\s*(?P<title>.+?){sep}(?P<company>.+?){tail}\s*$");
        let regex = Regex::new(&pattern)
            .unwrap_or_else(|e| panic!("grammar rule {syntax}/{separator} must compile: {e}"));
        Self {
            syntax,
            separator,
            regex,
        }
    }

    /// Attempts to decompose `text`. Dates are captured raw and not yet validated.
    pub fn recognize(&self, text: &str) -> Option<RawFields> {
        let caps = self.regex.captures(text)?;
        let title = field(&caps, "title")?;
        let company = field(&caps, "company")?;
        let raw_start = caps.name("start")?.as_str().trim().to_string();
        let raw_end = caps.name("end").map(|m| m.as_str().trim().to_string());

        Some(RawFields {
            title,
            company,
            raw_start,
            raw_end,
            location: field(&caps, "location"),
            description: field(&caps, "description").and_then(|text| {
                let text = text.trim_start_matches(|c: char| c == '.' || c.is_whitespace());
                (!text.is_empty()).then(|| text.to_string())
            }),
        })
    }
}

static RULES: Lazy<Vec<GrammarRule>> = Lazy::new(|| {
    DATE_SYNTAXES
        .iter()
        .flat_map(|&(syntax, tail)| {
            SEPARATORS
                .iter()
                .map(move |&(separator, sep)| GrammarRule::compile(syntax, tail, separator, sep))
        })
        .collect()
});

/// The compiled rules, in the order they are tried.
pub fn rules() -> &'static [GrammarRule] {
    &RULES
}

/// Runs the rules in order against `text` and returns the first match whose
/// dates normalize. A rule whose date tokens fail to normalize is skipped,
/// never partially applied.
pub fn match_entry(text: &str) -> Option<GrammarMatch> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }

    for rule in rules() {
        let Some(fields) = rule.recognize(&collapsed) else {
            continue;
        };
        if !fields.dates_normalize() {
            trace!(
                "Rule {}/{} matched but dates did not normalize: {:?} / {:?}",
                rule.syntax,
                rule.separator,
                fields.raw_start,
                fields.raw_end
            );
            continue;
        }
        return Some(GrammarMatch {
            syntax: rule.syntax,
            separator: rule.separator,
            fields,
        });
    }

    debug!("No grammar rule matched experience entry: {collapsed:?}");
    None
}

fn field(caps: &Captures<'_>, name: &str) -> Option<String> {
    let value = caps
        .name(name)?
        .as_str()
        .trim_matches(|c: char| c.is_whitespace() || EDGE_PUNCTUATION.contains(&c));
    (!value.is_empty()).then(|| value.to_string())
}
