use std::cell::RefCell;
use std::rc::Rc;

/// Simulated time, in ticks. The engine clock starts at -1 so the first
/// tick lands on 0.
pub type Tick = i64;

/// Building floors are positive integers; differences carry direction.
pub type Floor = i32;

pub type RequestId = String;

/// A passenger call: "at `call_time`, take me from `source_floor` to
/// `target_floor`". The lifecycle fields start unset and are stamped by the
/// elevator servicing the corresponding stop; `assigned_elevator` is stamped
/// exactly once, at dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub id: RequestId,
    pub call_time: Tick,
    pub source_floor: Floor,
    pub target_floor: Floor,
    pub pickup_time: Option<Tick>,
    pub dropoff_time: Option<Tick>,
    pub assigned_elevator: Option<String>,
}

impl CallRequest {
    pub fn new(
        id: impl Into<RequestId>,
        call_time: Tick,
        source_floor: Floor,
        target_floor: Floor,
    ) -> Self {
        Self {
            id: id.into(),
            call_time,
            source_floor,
            target_floor,
            pickup_time: None,
            dropoff_time: None,
            assigned_elevator: None,
        }
    }

    /// Sign of the travel direction: +1 going up, -1 going down.
    pub fn direction(&self) -> i32 {
        (self.target_floor - self.source_floor).signum()
    }

    pub fn is_complete(&self) -> bool {
        self.pickup_time.is_some() && self.dropoff_time.is_some()
    }

    pub fn into_shared(self) -> SharedRequest {
        Rc::new(RefCell::new(self))
    }
}

/// A request is owned by the engine and referenced from at most one
/// elevator's plan; the elevator stamps the timestamp fields when it
/// services the matching stops. Single-threaded, so shared mutability goes
/// through `Rc<RefCell<_>>`.
pub type SharedRequest = Rc<RefCell<CallRequest>>;
