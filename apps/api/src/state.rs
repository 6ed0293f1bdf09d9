use std::sync::Arc;

use crate::config::Config;
use crate::experience::clock::Clock;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Source of the current month. `SystemClock` unless `EXPERIENCE_FROZEN_MONTH` is set.
    pub clock: Arc<dyn Clock>,
}
