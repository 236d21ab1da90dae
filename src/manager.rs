use tracing::{debug, warn};

use crate::calendar;
use crate::model::*;
use crate::pattern::AvailabilityPattern;

/// A resource's availability: a set of patterns plus a per-user quota.
#[derive(Debug, Clone)]
pub struct AvailabilityManager {
    patterns: Vec<AvailabilityPattern>,
    quota: Quota,
}

impl AvailabilityManager {
    pub fn new(quota: Quota) -> Self {
        Self {
            patterns: Vec::new(),
            quota,
        }
    }

    pub fn quota(&self) -> Quota {
        self.quota
    }

    /// Replace count and period together.
    pub fn set_quota(&mut self, quota: Quota) {
        self.quota = quota;
    }

    /// Parse and add a pattern. A malformed pattern is logged and skipped,
    /// narrowing availability instead of failing the caller. Returns whether
    /// the pattern was added.
    pub fn add_pattern(&mut self, spec: &str) -> bool {
        match AvailabilityPattern::parse(spec) {
            Ok(pattern) => {
                self.patterns.push(pattern);
                true
            }
            Err(e) => {
                warn!("skipping availability pattern {spec:?}: {e}");
                metrics::counter!(crate::observability::PATTERNS_REJECTED_TOTAL).increment(1);
                false
            }
        }
    }

    pub fn add(&mut self, pattern: AvailabilityPattern) {
        self.patterns.push(pattern);
    }

    /// Remove the first pattern whose canonical form equals that of `spec`.
    pub fn remove_pattern(&mut self, spec: &str) -> bool {
        let canonical = match AvailabilityPattern::parse(spec) {
            Ok(p) => p.to_string(),
            Err(e) => {
                debug!("remove_pattern: {spec:?} does not parse: {e}");
                return false;
            }
        };
        match self.patterns.iter().position(|p| p.to_string() == canonical) {
            Some(pos) => {
                self.patterns.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn patterns(&self) -> &[AvailabilityPattern] {
        &self.patterns
    }

    pub fn is_available(&self, at: Ms) -> bool {
        self.patterns.iter().any(|p| p.matches(at))
    }

    pub fn is_available_in_range(&self, start: Ms, end: Ms) -> bool {
        self.patterns.iter().any(|p| p.matches_range(start, end))
    }

    /// Available instants in `[start, end)`, `step_minutes` apart, starting at
    /// `start`. Lazily evaluated; every call starts a fresh sequence. A zero
    /// step yields nothing.
    pub fn available_slots(&self, start: Ms, end: Ms, step_minutes: u32) -> Slots<'_> {
        let step = i64::from(step_minutes) * MINUTE_MS;
        Slots {
            manager: self,
            next: if step > 0 { start } else { end },
            end,
            step,
        }
    }

    /// The quota bucket `[start, end)` containing `at`.
    pub fn period(&self, at: Ms) -> Option<Span> {
        calendar::period_bounds(at, self.quota.period)
    }

    /// True while fewer than `quota.count` schedules fall in the period
    /// containing `now`. The period test includes both bucket ends.
    pub fn is_quota_available(&self, schedules: &[Ms], now: Ms) -> bool {
        let Some(period) = self.period(now) else {
            debug!("no quota period for instant {now}");
            return false;
        };
        let used = schedules
            .iter()
            .filter(|&&t| period.contains_inclusive(t))
            .count();
        used < self.quota.count as usize
    }

    /// [`Self::is_quota_available`] against the system clock.
    pub fn is_quota_available_now(&self, schedules: &[Ms]) -> bool {
        self.is_quota_available(schedules, now_ms())
    }
}

/// End of a slot window that examines at most `max_steps` instants, or
/// `None` when `[start, end)` already fits.
pub fn bounded_slot_end(start: Ms, end: Ms, step_minutes: u32, max_steps: i64) -> Option<Ms> {
    let step = i64::from(step_minutes) * MINUTE_MS;
    if step == 0 || end <= start {
        return None;
    }
    let limit = start.saturating_add(step.saturating_mul(max_steps));
    (end > limit).then_some(limit)
}

pub fn now_ms() -> Ms {
    chrono::Utc::now().timestamp_millis()
}

/// Iterator returned by [`AvailabilityManager::available_slots`].
#[derive(Debug, Clone)]
pub struct Slots<'a> {
    manager: &'a AvailabilityManager,
    next: Ms,
    end: Ms,
    step: Ms,
}

impl Iterator for Slots<'_> {
    type Item = Ms;

    fn next(&mut self) -> Option<Ms> {
        while self.next < self.end {
            let current = self.next;
            self.next = current.saturating_add(self.step);
            if self.manager.is_available(current) {
                return Some(current);
            }
        }
        None
    }
}
