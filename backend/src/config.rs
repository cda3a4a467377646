//! Search defaults and their environment overrides.
//!
//! The values end up in [`SearchConfig`], which the search engine receives
//! at construction. A `[search]` table in `repository.toml` deserializes
//! into the same type, so file and environment share one set of names.
//!
//! # Environment Variables
//! - `SEARCH_MAX_COORDS`: points kept per returned track (default: 50)
//! - `SEARCH_MIN_TIME`: first year of the default window (default: 1967)
//! - `SEARCH_MAX_TIME`: last year of the default window (default: current year)
//! - `SEARCH_CIRCLE_STEPS`: vertices of a normalized circle (default: 25)
//! - `SEARCH_STORE_TIMEOUT_MS`: deadline per coarse store query (default: 30000)
//! - `SEARCH_PARALLEL_SHAPES`: run shapes concurrently (default: true)
//! - `SEARCH_GEODESIC_CIRCLES`: great-circle refinement for circles (default: false)

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::algorithms::DEFAULT_MAX_POINTS;
use crate::models::{current_year, TimeWindow, DEFAULT_CIRCLE_STEPS, DEFAULT_MIN_YEAR};

/// Default deadline for one coarse store query.
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 30_000;

/// Engine defaults, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Points kept per track when the request does not say
    pub max_coords: usize,
    /// Default first year of the time window
    pub min_time: i32,
    /// Default last year of the time window
    pub max_time: i32,
    /// Vertices used to approximate a circle
    pub circle_steps: usize,
    /// Deadline for each coarse store query, in milliseconds
    pub store_timeout_ms: u64,
    /// Run per-shape work concurrently
    pub parallel_shapes: bool,
    /// Also accept circle candidates within the great-circle radius
    pub geodesic_circles: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_coords: DEFAULT_MAX_POINTS,
            min_time: DEFAULT_MIN_YEAR,
            max_time: current_year(),
            circle_steps: DEFAULT_CIRCLE_STEPS,
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
            parallel_shapes: true,
            geodesic_circles: false,
        }
    }
}

impl SearchConfig {
    /// Defaults overridden by any `SEARCH_*` variables that are set.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `SEARCH_*` variables on top of `self`.
    ///
    /// Unparseable values are ignored and logged.
    pub fn with_env_overrides(self) -> Self {
        Self {
            max_coords: env_or("SEARCH_MAX_COORDS", self.max_coords),
            min_time: env_or("SEARCH_MIN_TIME", self.min_time),
            max_time: env_or("SEARCH_MAX_TIME", self.max_time),
            circle_steps: env_or("SEARCH_CIRCLE_STEPS", self.circle_steps),
            store_timeout_ms: env_or("SEARCH_STORE_TIMEOUT_MS", self.store_timeout_ms),
            parallel_shapes: env_flag_or("SEARCH_PARALLEL_SHAPES", self.parallel_shapes),
            geodesic_circles: env_flag_or("SEARCH_GEODESIC_CIRCLES", self.geodesic_circles),
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// The window used when a request gives no years.
    pub fn default_window(&self) -> TimeWindow {
        TimeWindow::new(self.min_time, self.max_time)
    }

    /// Fill in missing request years from the defaults.
    pub fn window(&self, min_time: Option<i32>, max_time: Option<i32>) -> TimeWindow {
        TimeWindow::new(
            min_time.unwrap_or(self.min_time),
            max_time.unwrap_or(self.max_time),
        )
    }
}

pub(crate) fn env_or<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}={:?}", key, raw);
            fallback
        }),
        Err(_) => fallback,
    }
}

fn env_flag_or(key: &str, fallback: bool) -> bool {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                log::warn!("Ignoring invalid {}={:?}", key, raw);
                fallback
            }
        },
        Err(_) => fallback,
    }
}
