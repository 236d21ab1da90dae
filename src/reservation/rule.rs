use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::model::{Ms, Reservation};
use crate::pattern::AvailabilityPattern;

/// At most `max_reservations_per_window` bookings per user whose start and
/// end both fall inside `window`, for one availability group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRule {
    pub id: Ulid,
    pub availability_group_id: Ulid,
    pub max_reservations_per_window: u32,
    pub window: AvailabilityPattern,
    /// Carried for the host; not interpreted here.
    #[serde(default)]
    pub resource_constraints: serde_json::Value,
}

impl ReservationRule {
    pub fn new(
        id: Ulid,
        availability_group_id: Ulid,
        max_reservations_per_window: u32,
        window: AvailabilityPattern,
    ) -> Self {
        Self {
            id,
            availability_group_id,
            max_reservations_per_window,
            window,
            resource_constraints: serde_json::Value::Null,
        }
    }

    pub fn with_resource_constraints(mut self, constraints: serde_json::Value) -> Self {
        self.resource_constraints = constraints;
        self
    }

    pub fn check_constraints<'a, I>(&self, existing: I, user_id: Ulid, start: Ms, end: Ms) -> bool
    where
        I: IntoIterator<Item = &'a Reservation>,
    {
        if !self.window.matches_range(start, end) {
            return false;
        }
        let in_window = existing
            .into_iter()
            .filter(|r| self.window.matches(r.start) && self.window.matches(r.end))
            .filter(|r| r.user_id == user_id)
            .count();
        in_window < self.max_reservations_per_window as usize
    }
}
