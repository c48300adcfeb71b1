use std::fmt;

use crate::core::request::{Floor, SharedRequest};

/// One planned stop: the floor plus the requests boarding and alighting
/// there. A dropoff may only appear after its pickup in the same plan, or
/// for a passenger already on board.
#[derive(Clone, Default)]
pub struct ElevatorStop {
    pub floor: Floor,
    pub pickups: Vec<SharedRequest>,
    pub dropoffs: Vec<SharedRequest>,
}

impl ElevatorStop {
    /// A stop with no requests attached. The dispatcher uses this as the
    /// virtual current-floor anchor while costing candidate plans.
    pub fn passage(floor: Floor) -> Self {
        Self { floor, pickups: Vec::new(), dropoffs: Vec::new() }
    }

    pub fn pickup(floor: Floor, request: SharedRequest) -> Self {
        Self { floor, pickups: vec![request], dropoffs: Vec::new() }
    }

    pub fn dropoff(floor: Floor, request: SharedRequest) -> Self {
        Self { floor, pickups: Vec::new(), dropoffs: vec![request] }
    }

    pub fn is_empty(&self) -> bool {
        self.pickups.is_empty() && self.dropoffs.is_empty()
    }

    pub fn contains_pickup(&self, id: &str) -> bool {
        self.pickups.iter().any(|request| request.borrow().id == id)
    }

    pub fn contains_dropoff(&self, id: &str) -> bool {
        self.dropoffs.iter().any(|request| request.borrow().id == id)
    }

    /// Merge another stop for the same floor into this one. Requests already
    /// present are skipped, so merging the two copies of a shared subplan
    /// boundary never duplicates a request.
    pub fn absorb(&mut self, other: ElevatorStop) {
        debug_assert_eq!(self.floor, other.floor, "absorbing a stop on another floor");
        for request in other.pickups {
            if !self.contains_pickup(&request.borrow().id) {
                self.pickups.push(request);
            }
        }
        for request in other.dropoffs {
            if !self.contains_dropoff(&request.borrow().id) {
                self.dropoffs.push(request);
            }
        }
    }

    fn pickup_ids(&self) -> Vec<String> {
        self.pickups.iter().map(|request| request.borrow().id.clone()).collect()
    }

    fn dropoff_ids(&self) -> Vec<String> {
        self.dropoffs.iter().map(|request| request.borrow().id.clone()).collect()
    }
}

impl PartialEq for ElevatorStop {
    fn eq(&self, other: &Self) -> bool {
        self.floor == other.floor
            && self.pickup_ids() == other.pickup_ids()
            && self.dropoff_ids() == other.dropoff_ids()
    }
}

impl fmt::Debug for ElevatorStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElevatorStop")
            .field("floor", &self.floor)
            .field("pickups", &self.pickup_ids())
            .field("dropoffs", &self.dropoff_ids())
            .finish()
    }
}
