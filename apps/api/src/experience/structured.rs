use tracing::debug;

use crate::experience::dates::{resolve_end, resolve_start};
use crate::experience::models::{CanonicalMonth, ParsedPosition, StructuredExperience, YearMonth};
use crate::experience::{build_position, PositionParts};

/// Converts an already-structured record. Never fails: an unreadable start
/// becomes `Unknown`, and a missing, "present" or unreadable end resolves
/// to `current`.
pub fn adapt(entry: &StructuredExperience, current: YearMonth) -> ParsedPosition {
    let start = resolve_start(&entry.start_date).unwrap_or_else(|| {
        debug!(
            "Unrecognized start date {:?} for {} at {}",
            entry.start_date, entry.title, entry.company
        );
        CanonicalMonth::Unknown
    });

    let (end, open_ended) = match entry.end_date.as_deref().map(str::trim) {
        None => (current, true),
        Some(end) if end.eq_ignore_ascii_case("present") => (current, true),
        Some(end) => resolve_end(end, current).unwrap_or_else(|| {
            debug!(
                "Unrecognized end date {end:?} for {} at {}, treating as ongoing",
                entry.title, entry.company
            );
            (current, true)
        }),
    };

    build_position(PositionParts {
        title: entry.title.trim().to_string(),
        company: entry.company.trim().to_string(),
        start,
        end,
        open_ended,
        location: non_blank(entry.location.as_deref()),
        description: non_blank(entry.description.as_deref()),
        original_text: describe(entry),
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn describe(entry: &StructuredExperience) -> String {
    format!(
        "{} at {} ({} to {})",
        entry.title.trim(),
        entry.company.trim(),
        Some(entry.start_date.trim())
            .filter(|start| !start.is_empty())
            .unwrap_or("unknown"),
        entry.end_date.as_deref().map_or("present", str::trim)
    )
}
