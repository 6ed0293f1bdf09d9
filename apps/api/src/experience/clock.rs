//! Clock: the single source of "now" for the experience pipeline.
//!
//! Open-ended positions resolve their end to the current month and ongoing
//! positions sort first, so every entry point takes a `&dyn Clock` instead of
//! reading the system time itself. `AppState` carries an `Arc<dyn Clock>`.

use chrono::{Datelike, Utc};

use crate::experience::models::YearMonth;

pub trait Clock: Send + Sync {
    fn current_month(&self) -> YearMonth;
}

/// Wall-clock month in UTC.
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_month(&self) -> YearMonth {
        let today = Utc::now().date_naive();
        YearMonth::saturating(today.year(), today.month())
    }
}

/// A frozen month. Used by tests and by deployments pinned via
/// `EXPERIENCE_FROZEN_MONTH`.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub YearMonth);

impl Clock for FixedClock {
    fn current_month(&self) -> YearMonth {
        self.0
    }
}
