//! Shared, async-safe host around a [`ReservationSystem`].
//!
//! `can_reserve` followed by a separate insert is racy: two callers can both
//! pass the check and together exceed a rule's maximum. [`Engine::reserve`]
//! holds a per-user lock across the check and the insert. Rules only count
//! the requesting user's reservations, but a resource may sit in several
//! groups, so the lock cannot be narrowed to one group.

mod error;

pub use error::EngineError;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::observability::{self, ADMISSION_DECISIONS_TOTAL, RESERVATIONS_TOTAL};
use crate::reservation::{Admission, ReservationRule, ReservationSystem};

pub struct Engine {
    system: RwLock<ReservationSystem>,
    /// user id → lock held across check-then-insert. Entries live only while
    /// a reservation for that user is in flight.
    admission_locks: DashMap<Ulid, Arc<Mutex<()>>>,
    max_span_ms: Ms,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_system(ReservationSystem::new())
    }

    /// Wrap a system pre-loaded by the host (groups, rules, past reservations).
    pub fn with_system(system: ReservationSystem) -> Self {
        Self {
            system: RwLock::new(system),
            admission_locks: DashMap::new(),
            max_span_ms: MAX_RESERVATION_SPAN_MS,
        }
    }

    pub fn with_max_span(mut self, max_span_ms: Ms) -> Self {
        self.max_span_ms = max_span_ms.min(MAX_RESERVATION_SPAN_MS);
        self
    }

    pub async fn add_availability_group(&self, group: AvailabilityGroup) {
        self.system.write().await.add_availability_group(group);
    }

    pub async fn add_resource_to_group(
        &self,
        group_id: Ulid,
        resource_id: Ulid,
    ) -> Result<(), EngineError> {
        if self.system.write().await.add_resource_to_group(group_id, resource_id) {
            Ok(())
        } else {
            Err(EngineError::NotFound(group_id))
        }
    }

    pub async fn add_reservation_rule(&self, rule: ReservationRule) {
        self.system.write().await.add_reservation_rule(rule);
    }

    /// Append a reservation the host already holds, without an admission check.
    pub async fn import_reservation(&self, reservation: Reservation) {
        self.system.write().await.add_reservation(reservation);
    }

    pub async fn admission(&self, user_id: Ulid, group_id: Ulid, start: Ms, end: Ms) -> Admission {
        self.system.read().await.admission(user_id, group_id, start, end)
    }

    pub async fn can_reserve(&self, user_id: Ulid, group_id: Ulid, start: Ms, end: Ms) -> bool {
        self.admission(user_id, group_id, start, end).await.is_admitted()
    }

    pub async fn reservations_for(&self, user_id: Ulid, group_id: Ulid) -> Vec<Reservation> {
        self.system
            .read()
            .await
            .reservations_for(user_id, group_id)
            .cloned()
            .collect()
    }

    /// Admit and append in one step. Concurrent calls for the same user are
    /// serialized, whichever groups they go through.
    pub async fn reserve(
        &self,
        group_id: Ulid,
        reservation: Reservation,
    ) -> Result<(), EngineError> {
        if let Err(e) = self.validate_span(reservation.start, reservation.end) {
            metrics::counter!(
                ADMISSION_DECISIONS_TOTAL,
                "outcome" => observability::OUTCOME_INVALID
            )
            .increment(1);
            return Err(e);
        }

        let user_id = reservation.user_id;
        let lock = self.admission_lock(user_id);
        let result = {
            let _held = lock.lock().await;
            self.admit_and_append(group_id, reservation).await
        };
        drop(lock);
        self.release_admission_lock(user_id);
        result
    }

    async fn admit_and_append(
        &self,
        group_id: Ulid,
        reservation: Reservation,
    ) -> Result<(), EngineError> {
        let admission = {
            let system = self.system.read().await;
            let group = system
                .availability_group(&group_id)
                .ok_or(EngineError::NotFound(group_id))?;
            if !group.contains_resource(&reservation.resource_id) {
                return Err(EngineError::NotInGroup {
                    resource_id: reservation.resource_id,
                    group_id,
                });
            }
            system.admission(reservation.user_id, group_id, reservation.start, reservation.end)
        };
        metrics::counter!(
            ADMISSION_DECISIONS_TOTAL,
            "outcome" => observability::outcome_label(&admission)
        )
        .increment(1);

        match admission {
            Admission::Admitted => {}
            Admission::UnknownGroup => return Err(EngineError::NotFound(group_id)),
            Admission::Rejected { rule_id } => return Err(EngineError::Rejected { rule_id }),
        }

        info!(
            "reservation {} admitted for user {} on group {group_id}",
            reservation.id, reservation.user_id
        );
        self.system.write().await.add_reservation(reservation);
        metrics::counter!(RESERVATIONS_TOTAL).increment(1);
        Ok(())
    }

    fn admission_lock(&self, user_id: Ulid) -> Arc<Mutex<()>> {
        self.admission_locks.entry(user_id).or_default().clone()
    }

    /// Drop the user's lock unless another caller still holds a handle to it.
    /// The caller must have dropped its own handle first.
    fn release_admission_lock(&self, user_id: Ulid) {
        self.admission_locks
            .remove_if(&user_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    fn validate_span(&self, start: Ms, end: Ms) -> Result<(), EngineError> {
        if start >= end {
            return Err(EngineError::InvalidSpan { start, end });
        }
        if start < MIN_VALID_TIMESTAMP_MS || end > MAX_VALID_TIMESTAMP_MS {
            return Err(EngineError::LimitExceeded("timestamp out of range"));
        }
        if Span::new(start, end).duration_ms() > self.max_span_ms {
            return Err(EngineError::LimitExceeded("span too wide"));
        }
        Ok(())
    }
}
