use crate::limits::{DEFAULT_MAX_SLOTS, MAX_RESERVATION_SPAN_MS, MAX_SLOTS};
use crate::model::{DAY_MS, Ms};

/// Host settings read from `RESERVO_*` environment variables. Missing or
/// unparseable values fall back to defaults; values above the hard limits
/// are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// `RESERVO_MAX_SLOTS`
    pub max_slots: usize,
    /// `RESERVO_MAX_SPAN_DAYS`, in milliseconds
    pub max_span_ms: Ms,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_slots: DEFAULT_MAX_SLOTS,
            max_span_ms: MAX_RESERVATION_SPAN_MS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let max_slots = lookup("RESERVO_MAX_SLOTS")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .map_or(defaults.max_slots, |n| n.min(MAX_SLOTS));
        let max_span_ms = lookup("RESERVO_MAX_SPAN_DAYS")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|&days| days > 0)
            .map_or(defaults.max_span_ms, |days| {
                days.saturating_mul(DAY_MS).min(MAX_RESERVATION_SPAN_MS)
            });
        Self {
            max_slots,
            max_span_ms,
        }
    }
}
