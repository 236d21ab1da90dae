use std::collections::HashMap;

use tracing::debug;
use ulid::Ulid;

use crate::model::*;

use super::ReservationRule;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    UnknownGroup,
    /// The first attached rule (in insertion order) that failed.
    Rejected { rule_id: Ulid },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Availability groups, the append-only reservation log, and the rules
/// attached to each group.
///
/// Ids are not checked for uniqueness. A second group with an existing id is
/// ignored; duplicate reservations and rules are kept and all take part in
/// admission checks.
#[derive(Debug, Clone, Default)]
pub struct ReservationSystem {
    groups: HashMap<Ulid, AvailabilityGroup>,
    reservations: Vec<Reservation>,
    /// user id → positions in `reservations`
    by_user: HashMap<Ulid, Vec<usize>>,
    /// group id → rules, in insertion order
    rules: HashMap<Ulid, Vec<ReservationRule>>,
}

impl ReservationSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_availability_group(&mut self, group: AvailabilityGroup) {
        if self.groups.contains_key(&group.id) {
            debug!("availability group {} already registered, keeping the first", group.id);
            return;
        }
        self.groups.insert(group.id, group);
    }

    /// Append a resource to a registered group. Returns false for an unknown group.
    pub fn add_resource_to_group(&mut self, group_id: Ulid, resource_id: Ulid) -> bool {
        match self.groups.get_mut(&group_id) {
            Some(group) => {
                group.add_resource(resource_id);
                true
            }
            None => false,
        }
    }

    pub fn add_reservation(&mut self, reservation: Reservation) {
        self.by_user
            .entry(reservation.user_id)
            .or_default()
            .push(self.reservations.len());
        self.reservations.push(reservation);
    }

    pub fn add_reservation_rule(&mut self, rule: ReservationRule) {
        self.rules
            .entry(rule.availability_group_id)
            .or_default()
            .push(rule);
    }

    pub fn availability_group(&self, group_id: &Ulid) -> Option<&AvailabilityGroup> {
        self.groups.get(group_id)
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn rules_for(&self, group_id: &Ulid) -> &[ReservationRule] {
        self.rules.get(group_id).map_or(&[][..], Vec::as_slice)
    }

    /// The user's reservations on resources belonging to the group, in log order.
    pub fn reservations_for(
        &self,
        user_id: Ulid,
        group_id: Ulid,
    ) -> impl Iterator<Item = &Reservation> {
        let group = self.groups.get(&group_id);
        self.by_user
            .get(&user_id)
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .map(move |&pos| &self.reservations[pos])
            .filter(move |r| group.is_some_and(|g| g.contains_resource(&r.resource_id)))
    }

    pub fn admission(&self, user_id: Ulid, group_id: Ulid, start: Ms, end: Ms) -> Admission {
        if !self.groups.contains_key(&group_id) {
            debug!("admission for user {user_id}: unknown group {group_id}");
            return Admission::UnknownGroup;
        }
        let existing: Vec<&Reservation> = self.reservations_for(user_id, group_id).collect();
        for rule in self.rules_for(&group_id) {
            if !rule.check_constraints(existing.iter().copied(), user_id, start, end) {
                debug!(
                    "admission for user {user_id} on group {group_id} rejected by rule {}",
                    rule.id
                );
                return Admission::Rejected { rule_id: rule.id };
            }
        }
        Admission::Admitted
    }

    /// True iff the group is registered and every rule attached to it passes.
    pub fn can_reserve(&self, user_id: Ulid, group_id: Ulid, start: Ms, end: Ms) -> bool {
        self.admission(user_id, group_id, start, end).is_admitted()
    }
}
