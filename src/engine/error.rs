use thiserror::Error;
use ulid::Ulid;

use crate::model::Ms;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(Ulid),
    #[error("resource {resource_id} is not in availability group {group_id}")]
    NotInGroup { resource_id: Ulid, group_id: Ulid },
    #[error("rejected by reservation rule {rule_id}")]
    Rejected { rule_id: Ulid },
    #[error("invalid span [{start}, {end})")]
    InvalidSpan { start: Ms, end: Ms },
    #[error("limit exceeded: {0}")]
    LimitExceeded(&'static str),
}
