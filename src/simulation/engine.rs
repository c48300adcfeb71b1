//! The tick driver: advances the logical clock, feeds arriving requests
//! through the dispatcher and moves every elevator one step per tick.

use std::collections::VecDeque;

use log::{debug, info};

use crate::core::building::Building;
use crate::core::request::{CallRequest, SharedRequest, Tick};
use crate::dispatch::dispatcher::ElevatorDispatcher;
use crate::errors::DispatchError;
use crate::report::{ElevatorLog, RequestLog};

pub struct Engine {
    building: Building,
    time: Tick,
    accepted: Vec<SharedRequest>,
    inbound: VecDeque<SharedRequest>,
    elevator_log: ElevatorLog,
}

impl Engine {
    /// Requests may arrive in any order; they are queued by call time, with
    /// input order preserved among requests calling on the same tick.
    pub fn new(building: Building, mut requests: Vec<CallRequest>) -> Self {
        requests.sort_by_key(|request| request.call_time);
        let elevator_log = ElevatorLog::new(&building.elevators);
        Self {
            building,
            time: -1,
            accepted: Vec::new(),
            inbound: requests.into_iter().map(CallRequest::into_shared).collect(),
            elevator_log,
        }
    }

    /// Run to completion: until every request has arrived and every
    /// accepted request has been dropped off.
    pub fn run(&mut self) -> Result<(), DispatchError> {
        while !self.inbound.is_empty()
            || self.accepted.iter().any(|request| !request.borrow().is_complete())
        {
            self.tick()?;
        }
        info!("simulation complete after {} ticks", self.time + 1);
        Ok(())
    }

    /// One step of simulated time. All requests calling now are accepted
    /// before any elevator moves; the log row is written after every
    /// elevator has moved.
    pub fn tick(&mut self) -> Result<(), DispatchError> {
        self.time += 1;
        debug!("tick {}", self.time);

        while self
            .inbound
            .front()
            .is_some_and(|request| request.borrow().call_time == self.time)
        {
            let Some(request) = self.inbound.pop_front() else {
                break;
            };
            self.accept(request)?;
        }

        for elevator in &mut self.building.elevators {
            elevator.tick(self.time);
        }
        self.elevator_log.record(self.time, &self.building.elevators);
        Ok(())
    }

    fn accept(&mut self, request: SharedRequest) -> Result<(), DispatchError> {
        let selection =
            ElevatorDispatcher::new(&self.building.elevators, &request).select_elevator_and_plan()?;
        let elevator = &mut self.building.elevators[selection.elevator_index];
        elevator.replace_plan(selection.plan);
        {
            let mut request = request.borrow_mut();
            request.assigned_elevator = Some(elevator.name.clone());
            info!(
                "tick {}: request `{}` ({} -> {}) assigned to {}",
                self.time, request.id, request.source_floor, request.target_floor, elevator.name
            );
        }
        self.accepted.push(request);
        Ok(())
    }

    pub fn time(&self) -> Tick {
        self.time
    }

    pub fn building(&self) -> &Building {
        &self.building
    }

    pub fn requests(&self) -> &[SharedRequest] {
        &self.accepted
    }

    pub fn elevator_log(&self) -> &ElevatorLog {
        &self.elevator_log
    }

    pub fn request_log(&self) -> RequestLog {
        RequestLog::from_requests(&self.accepted)
    }
}
