use thiserror::Error;

use crate::core::request::{Floor, RequestId, Tick};

/// Rejections raised while validating the inbound call-request table.
/// Any of these aborts startup before the engine runs a single tick.
#[derive(Debug, Error)]
pub enum CallRequestError {
    #[error("no call requests found")]
    Empty,

    #[error("request ids must be unique; `{0}` appears more than once")]
    DuplicateId(RequestId),

    #[error("request `{id}`: call time must be a non-negative integer, got {time}")]
    NegativeTime { id: RequestId, time: Tick },

    #[error("request `{id}`: floors must be positive integers, got {floor}")]
    NonPositiveFloor { id: RequestId, floor: Floor },

    #[error("request `{id}`: floor {floor} is above the top floor {top}")]
    FloorAboveBuilding { id: RequestId, floor: Floor, top: Floor },

    #[error("request `{id}`: source and destination floor cannot be the same")]
    SameSourceAndTarget { id: RequestId },

    #[error("failed to read call requests: {0}")]
    Csv(#[from] csv::Error),
}

/// A logical precondition violated inside the dispatch pipeline. These are
/// bugs, not runtime conditions: the simulation halts so tests catch them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("plan is too small to split")]
    PlanTooSmallToSplit,

    #[error("subplan is not sorted for direction {dir}")]
    SubplanNotSorted { dir: i32 },

    #[error("unknown direction sign {0}")]
    UnknownDirection(i32),

    #[error("source floor {0} is outside the subplan range")]
    SourceFloorOutOfRange(Floor),

    #[error("target floor {0} is outside the subplan range")]
    TargetFloorOutOfRange(Floor),

    #[error("no elevator is available to serve request `{0}`")]
    NoElevatorAvailable(RequestId),
}
