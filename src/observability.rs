use crate::reservation::Admission;

/// Counter: admission decisions made by the engine. Labels: outcome.
pub const ADMISSION_DECISIONS_TOTAL: &str = "reservo_admission_decisions_total";

/// Counter: reservations appended through the engine.
pub const RESERVATIONS_TOTAL: &str = "reservo_reservations_total";

/// Counter: malformed patterns skipped by availability managers.
pub const PATTERNS_REJECTED_TOTAL: &str = "reservo_patterns_rejected_total";

/// Outcome label for a span that failed validation before any rule ran.
pub const OUTCOME_INVALID: &str = "invalid";

/// Map an admission decision to its `outcome` label.
pub fn outcome_label(admission: &Admission) -> &'static str {
    match admission {
        Admission::Admitted => "admitted",
        Admission::UnknownGroup => "unknown_group",
        Admission::Rejected { .. } => "rejected",
    }
}
