// Experience parsing and tenure aggregation.
// Free text and structured records both become `ParsedPosition`s, which the
// aggregator folds into per-employer stints. Nothing here performs I/O; the
// only outside input is the injected clock.

pub mod aggregate;
pub mod clock;
pub mod dates;
pub mod duration;
pub mod grammar;
pub mod handlers;
pub mod models;
pub mod structured;

use crate::experience::clock::Clock;
use crate::experience::grammar::GrammarMatch;
use crate::experience::models::{
    CanonicalMonth, ExperienceSummary, ParsedPosition, RawEntry, StructuredExperience, YearMonth,
};

/// Parses one free-text entry. `None` when no grammar rule recognizes it.
pub fn parse_experience_string(text: &str, clock: &dyn Clock) -> Option<ParsedPosition> {
    parse_free_text(text, clock.current_month())
}

/// Converts one structured entry. Never fails.
pub fn convert_structured_experience(
    entry: &StructuredExperience,
    clock: &dyn Clock,
) -> ParsedPosition {
    structured::adapt(entry, clock.current_month())
}

/// Parses every entry, drops the unrecognized ones and aggregates the rest.
/// The clock is read once so every entry sees the same current month.
pub fn calculate_total_experience_duration(
    entries: &[RawEntry],
    clock: &dyn Clock,
) -> ExperienceSummary {
    let current = clock.current_month();
    let positions: Vec<ParsedPosition> = entries
        .iter()
        .filter_map(|entry| match entry {
            RawEntry::FreeText(text) => parse_free_text(text, current),
            RawEntry::Structured(record) => Some(structured::adapt(record, current)),
        })
        .collect();

    if positions.len() < entries.len() {
        tracing::debug!(
            "Dropped {} of {} experience entries that did not parse",
            entries.len() - positions.len(),
            entries.len()
        );
    }

    aggregate::aggregate(positions, current)
}

/// One-line rendering: `"<title> at <company> (<start> to <end|present>) • <duration>"`.
/// Returns `text` unchanged when it does not parse.
pub fn format_experience_with_duration(text: &str, clock: &dyn Clock) -> String {
    match parse_experience_string(text, clock) {
        Some(position) => {
            let end = if position.open_ended {
                "present".to_string()
            } else {
                position.end.to_string()
            };
            format!(
                "{} at {} ({} to {}) • {}",
                position.title, position.company, position.start, end, position.duration_text
            )
        }
        None => text.to_string(),
    }
}

fn parse_free_text(text: &str, current: YearMonth) -> Option<ParsedPosition> {
    let GrammarMatch {
        syntax,
        separator,
        fields,
    } = grammar::match_entry(text)?;
    tracing::trace!(
        "Experience entry matched rule {syntax}/{separator}: {} at {}",
        fields.title,
        fields.company
    );
    let start = dates::resolve_start(&fields.raw_start)?;
    let (end, open_ended) = match fields.raw_end.as_deref() {
        Some(raw) => dates::resolve_end(raw, current)?,
        None => (current, true),
    };

    Some(build_position(PositionParts {
        title: fields.title,
        company: fields.company,
        start,
        end,
        open_ended,
        location: fields.location,
        description: fields.description,
        original_text: text.to_string(),
    }))
}

struct PositionParts {
    title: String,
    company: String,
    start: CanonicalMonth,
    end: YearMonth,
    open_ended: bool,
    location: Option<String>,
    description: Option<String>,
    original_text: String,
}

fn build_position(parts: PositionParts) -> ParsedPosition {
    let tenure = duration::duration(parts.start, parts.end.into());
    ParsedPosition {
        title: parts.title,
        company: parts.company,
        start: parts.start,
        end: parts.end,
        open_ended: parts.open_ended,
        duration_months: tenure.months,
        duration_text: tenure.text,
        location: parts.location,
        description: parts.description,
        original_text: parts.original_text,
    }
}
