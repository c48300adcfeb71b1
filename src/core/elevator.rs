use std::cmp::Ordering;

use log::debug;

use crate::core::plan::coalesce_plan;
use crate::core::request::{Floor, RequestId, Tick};
use crate::core::stop::ElevatorStop;

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum ElevatorState {
    Idle,
    MovingUp,
    MovingDown,
    AtStop,
    /// Out of rotation, e.g. for maintenance. Never dispatched to.
    Unavailable,
}

impl ElevatorState {
    pub fn label(&self) -> &'static str {
        match self {
            ElevatorState::Idle => "idle",
            ElevatorState::MovingUp => "moving_up",
            ElevatorState::MovingDown => "moving_down",
            ElevatorState::AtStop => "at_stop",
            ElevatorState::Unavailable => "unavailable",
        }
    }
}

/// A single cab: its position, capacity, the passengers on board and the
/// ordered plan of future stops. Consecutive plan stops never share a floor,
/// and walking the plan never pushes the passenger count past capacity.
#[derive(Debug)]
pub struct Elevator {
    pub name: String,
    pub current_floor: Floor,
    pub capacity: usize,
    pub state: ElevatorState,
    pub passengers: Vec<RequestId>,
    pub plan: Vec<ElevatorStop>,
}

impl Elevator {
    pub fn new(name: impl Into<String>, current_floor: Floor, capacity: usize) -> Self {
        Self {
            name: name.into(),
            current_floor,
            capacity,
            state: ElevatorState::Idle,
            passengers: Vec::new(),
            plan: Vec::new(),
        }
    }

    /// Advance one tick: move exactly one floor toward the head stop, or
    /// service the head stop when already on its floor. Never fails.
    pub fn tick(&mut self, time: Tick) {
        if self.state == ElevatorState::Unavailable {
            return;
        }
        let Some(head) = self.plan.first() else {
            self.state = ElevatorState::Idle;
            return;
        };

        match self.current_floor.cmp(&head.floor) {
            Ordering::Less => {
                self.current_floor += 1;
                self.state = ElevatorState::MovingUp;
            }
            Ordering::Greater => {
                self.current_floor -= 1;
                self.state = ElevatorState::MovingDown;
            }
            Ordering::Equal => {
                self.state = ElevatorState::AtStop;
                self.service_head_stop(time);
            }
        }
    }

    /// Board every pickup, alight every dropoff, stamp their timestamps and
    /// drop the stop from the plan.
    fn service_head_stop(&mut self, time: Tick) {
        let stop = self.plan.remove(0);

        for request in &stop.pickups {
            let mut request = request.borrow_mut();
            request.pickup_time = Some(time);
            self.passengers.push(request.id.clone());
            debug!("{}: picked up `{}` at floor {}", self.name, request.id, stop.floor);
        }
        for request in &stop.dropoffs {
            let mut request = request.borrow_mut();
            request.dropoff_time = Some(time);
            let position = self
                .passengers
                .iter()
                .position(|passenger| passenger == &request.id)
                .unwrap_or_else(|| {
                    // a dropoff for somebody not on board is a bug, not a runtime condition
                    panic!(
                        "{}: dropoff for `{}` at floor {} but they are not on board",
                        self.name, request.id, stop.floor
                    )
                });
            self.passengers.remove(position);
            debug!("{}: dropped off `{}` at floor {}", self.name, request.id, stop.floor);
        }
    }

    /// Insert a stop at `index`, then merge any same-floor neighbors it
    /// lands next to.
    pub fn insert_stop(&mut self, stop: ElevatorStop, index: usize) {
        let index = index.min(self.plan.len());
        self.plan.insert(index, stop);
        coalesce_plan(&mut self.plan);
    }

    /// Swap in the dispatcher's updated plan. The swap is whole-plan, so no
    /// observer ever sees a half-updated plan.
    pub fn replace_plan(&mut self, new_plan: Vec<ElevatorStop>) {
        self.plan = new_plan;
    }

    pub fn passenger_count(&self) -> usize {
        self.passengers.len()
    }
}
