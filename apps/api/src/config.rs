use std::sync::Arc;

use anyhow::{Context, Result};

use crate::experience::clock::{Clock, FixedClock, SystemClock};
use crate::experience::models::YearMonth;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_ENTRIES: usize = 500;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Pins the clock to one month (`YYYY-MM`) instead of the wall clock.
    pub frozen_month: Option<YearMonth>,
    /// Upper bound on entries accepted by one summary request.
    pub max_entries: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            None => DEFAULT_PORT,
        };

        let frozen_month = lookup("EXPERIENCE_FROZEN_MONTH")
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                raw.parse::<YearMonth>()
                    .with_context(|| format!("EXPERIENCE_FROZEN_MONTH '{raw}' must be YYYY-MM"))
            })
            .transpose()?;

        let max_entries = match lookup("EXPERIENCE_MAX_ENTRIES") {
            Some(raw) => raw
                .parse::<usize>()
                .context("EXPERIENCE_MAX_ENTRIES must be a positive integer")?,
            None => DEFAULT_MAX_ENTRIES,
        };

        Ok(Config {
            port,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            frozen_month,
            max_entries,
        })
    }

    /// The clock every request is evaluated against.
    pub fn clock(&self) -> Arc<dyn Clock> {
        match self.frozen_month {
            Some(month) => Arc::new(FixedClock(month)),
            None => Arc::new(SystemClock),
        }
    }
}
