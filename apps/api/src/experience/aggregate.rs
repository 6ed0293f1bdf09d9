//! Experience aggregator: groups positions into per-employer stints and sums tenure.
//!
//! Ordering rule shared by positions and stints:
//! 1. ongoing (ends in the current month) before everything else
//! 2. then most recent start first, unknown starts last
//!
//! A stint breaks whenever the next position (by start) begins more than one
//! month after the previous one ended. Overlap inside a stint is not
//! de-duplicated; the stint spans earliest start to latest end.

use std::cmp::Ordering;

use tracing::debug;

use crate::experience::duration::{duration, format_months, months_between};
use crate::experience::models::{
    CanonicalMonth, ExperienceSummary, ParsedPosition, Stint, YearMonth,
};

pub const NO_EXPERIENCE: &str = "No experience data";

/// Largest gap, in months, that still keeps two positions in one stint.
pub const MAX_STINT_GAP_MONTHS: i32 = 1;

pub fn aggregate(mut positions: Vec<ParsedPosition>, current: YearMonth) -> ExperienceSummary {
    if positions.is_empty() {
        return ExperienceSummary {
            total_duration_text: NO_EXPERIENCE.to_string(),
            total_duration_months: 0,
            stints: Vec::new(),
            positions: Vec::new(),
        };
    }

    positions.sort_by(|a, b| recency_order((a.start, a.end), (b.start, b.end), current));

    let mut stints: Vec<Stint> = group_by_employer(&positions)
        .into_iter()
        .flat_map(split_into_runs)
        .filter_map(build_stint)
        .collect();
    stints.sort_by(|a, b| {
        recency_order(
            (a.earliest_start, a.latest_end),
            (b.earliest_start, b.latest_end),
            current,
        )
    });

    let total_months: u32 = stints.iter().map(|s| s.total_duration_months).sum();
    debug!(
        "Aggregated {} positions into {} stints ({} months)",
        positions.len(),
        stints.len(),
        total_months
    );

    ExperienceSummary {
        total_duration_text: format_months(total_months),
        total_duration_months: total_months,
        stints,
        positions,
    }
}

/// Employer identity: whitespace-collapsed, case-folded name.
pub fn employer_key(company: &str) -> String {
    company
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn recency_order(
    (a_start, a_end): (CanonicalMonth, YearMonth),
    (b_start, b_end): (CanonicalMonth, YearMonth),
    current: YearMonth,
) -> Ordering {
    let a_ongoing = a_end == current;
    let b_ongoing = b_end == current;
    b_ongoing
        .cmp(&a_ongoing)
        .then_with(|| match (a_start, b_start) {
            (CanonicalMonth::Known(a), CanonicalMonth::Known(b)) => b.cmp(&a),
            (CanonicalMonth::Known(_), CanonicalMonth::Unknown) => Ordering::Less,
            (CanonicalMonth::Unknown, CanonicalMonth::Known(_)) => Ordering::Greater,
            (CanonicalMonth::Unknown, CanonicalMonth::Unknown) => Ordering::Equal,
        })
}

/// Buckets positions by employer, keeping first-seen order.
fn group_by_employer(positions: &[ParsedPosition]) -> Vec<Vec<ParsedPosition>> {
    let mut groups: Vec<(String, Vec<ParsedPosition>)> = Vec::new();
    for position in positions {
        let key = employer_key(&position.company);
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, members)) => members.push(position.clone()),
            None => groups.push((key, vec![position.clone()])),
        }
    }
    groups.into_iter().map(|(_, members)| members).collect()
}

/// Walks one employer's positions chronologically and cuts a new run at
/// every gap wider than [`MAX_STINT_GAP_MONTHS`], measured from the latest
/// end seen so far in the run. Runs are therefore disjoint. A position with
/// an unknown start gives no evidence of a gap and joins the run in progress.
fn split_into_runs(mut positions: Vec<ParsedPosition>) -> Vec<Vec<ParsedPosition>> {
    positions.sort_by(|a, b| a.start.cmp(&b.start));

    let mut runs = Vec::new();
    let mut run: Vec<ParsedPosition> = Vec::new();
    let mut run_end: Option<YearMonth> = None;
    for position in positions {
        let gap = run_end
            .zip(position.start.known())
            .map(|(end, start)| months_between(end, start));
        if matches!(gap, Some(months) if months > MAX_STINT_GAP_MONTHS) {
            runs.push(std::mem::take(&mut run));
            run_end = None;
        }
        run_end = Some(run_end.map_or(position.end, |end| end.max(position.end)));
        run.push(position);
    }
    if !run.is_empty() {
        runs.push(run);
    }
    runs
}

fn build_stint(positions: Vec<ParsedPosition>) -> Option<Stint> {
    let company = positions.first()?.company.trim().to_string();
    let earliest_start = positions.iter().map(|p| p.start).min()?;
    let latest_end = positions.iter().map(|p| p.end).max()?;
    let tenure = duration(earliest_start, latest_end.into());

    Some(Stint {
        company,
        positions,
        total_duration_months: tenure.months,
        total_duration_text: tenure.text,
        earliest_start,
        latest_end,
    })
}
