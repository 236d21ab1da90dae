//! Recurrence matching and quota enforcement for resource bookings.
//!
//! - [`pattern`] parses and matches cron-like availability patterns.
//! - [`manager`] answers availability, slot, and per-period quota questions.
//! - [`reservation`] decides whether a user may book an availability group.
//! - [`engine`] serializes check-then-insert for concurrent hosts.

pub mod calendar;
pub mod config;
pub mod engine;
pub mod limits;
pub mod manager;
pub mod model;
pub mod observability;
pub mod pattern;
pub mod reservation;

pub use engine::{Engine, EngineError};
pub use manager::{AvailabilityManager, Slots};
pub use model::{AvailabilityGroup, Ms, Quota, QuotaPeriod, Reservation, Span};
pub use pattern::{AvailabilityPattern, PatternError};
pub use reservation::{Admission, ReservationRule, ReservationSystem};
