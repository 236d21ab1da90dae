mod rule;
mod system;

pub use rule::ReservationRule;
pub use system::{Admission, ReservationSystem};
