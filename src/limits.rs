use crate::model::{DAY_MS, Ms};

/// 2000-01-01T00:00:00Z
pub const MIN_VALID_TIMESTAMP_MS: Ms = 946_684_800_000;
/// 2200-01-01T00:00:00Z
pub const MAX_VALID_TIMESTAMP_MS: Ms = 7_258_118_400_000;

/// Widest reservation the engine accepts.
pub const MAX_RESERVATION_SPAN_MS: Ms = 366 * DAY_MS;

/// Hard ceiling on slots a single host request may materialize.
pub const MAX_SLOTS: usize = 100_000;
pub const DEFAULT_MAX_SLOTS: usize = 10_000;
/// Most instants a single slot request may examine, matching or not.
pub const MAX_SLOT_STEPS: i64 = 1_000_000;

/// Longest pattern string a host request may carry.
pub const MAX_PATTERN_LEN: usize = 512;
