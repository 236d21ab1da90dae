use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds, UTC. The only time type.
pub type Ms = i64;

pub const MINUTE_MS: Ms = 60_000;
pub const DAY_MS: Ms = 86_400_000;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    /// Both ends inclusive. Quota counting uses this form.
    pub fn contains_inclusive(&self, t: Ms) -> bool {
        self.start <= t && t <= self.end
    }
}

/// A booked window. Immutable once appended to the reservation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Ulid,
    pub user_id: Ulid,
    pub resource_id: Ulid,
    pub start: Ms,
    pub end: Ms,
}

impl Reservation {
    pub fn new(id: Ulid, user_id: Ulid, resource_id: Ulid, start: Ms, end: Ms) -> Self {
        Self {
            id,
            user_id,
            resource_id,
            start,
            end,
        }
    }
}

/// A named set of interchangeable resources sharing reservation rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityGroup {
    pub id: Ulid,
    pub name: String,
    /// Membership is append-only, in insertion order.
    #[serde(default)]
    pub resources: Vec<Ulid>,
}

impl AvailabilityGroup {
    pub fn new(id: Ulid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            resources: Vec::new(),
        }
    }

    pub fn add_resource(&mut self, resource_id: Ulid) -> &[Ulid] {
        self.resources.push(resource_id);
        &self.resources
    }

    pub fn contains_resource(&self, resource_id: &Ulid) -> bool {
        self.resources.contains(resource_id)
    }
}

/// Reset cadence for a quota.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaPeriod {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    pub count: u32,
    #[serde(default)]
    pub period: QuotaPeriod,
}

impl Quota {
    pub fn new(count: u32, period: QuotaPeriod) -> Self {
        Self { count, period }
    }
}
