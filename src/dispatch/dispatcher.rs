//! The dispatch algorithm.
//!
//! For a new call request, every elevator gets a hypothetical updated plan:
//! the request is worked into an existing directional sweep where one fits,
//! and tacked onto the end of the plan where none does. Plans of already
//! accepted requests are never reshuffled, so a sweep in progress can only
//! gain stops along its own direction. The elevator whose candidate serves
//! the request soonest (wait plus travel) wins; accepting a local minimum
//! here is what bounds the wait of every previously accepted request.

use log::{debug, warn};

use crate::core::elevator::{Elevator, ElevatorState};
use crate::core::plan::{coalesce_plan, find_insertion_points, split_into_monotone_subplans};
use crate::core::request::{CallRequest, Floor, SharedRequest, Tick};
use crate::core::stop::ElevatorStop;
use crate::errors::DispatchError;

/// The winning elevator (by position in the fleet) and its updated plan.
#[derive(Debug)]
pub struct Selection {
    pub elevator_index: usize,
    pub plan: Vec<ElevatorStop>,
}

pub struct ElevatorDispatcher<'a> {
    elevators: &'a [Elevator],
    request: &'a SharedRequest,
}

impl<'a> ElevatorDispatcher<'a> {
    pub fn new(elevators: &'a [Elevator], request: &'a SharedRequest) -> Self {
        Self { elevators, request }
    }

    /// Cost every eligible elevator's candidate plan and pick the cheapest.
    /// Ties go to the elevator listed first.
    pub fn select_elevator_and_plan(&self) -> Result<Selection, DispatchError> {
        let request = self.request.borrow();
        let mut best: Option<(usize, Tick, Vec<ElevatorStop>)> = None;

        for (index, elevator) in self.elevators.iter().enumerate() {
            if elevator.state == ElevatorState::Unavailable {
                continue;
            }
            let candidate = self.candidate_plan(elevator)?;
            let cost = wait_time(elevator.current_floor, &candidate, &request)
                + travel_time(&candidate, &request);
            debug!(
                "request `{}`: {} would take {} ticks",
                request.id, elevator.name, cost
            );
            if best.as_ref().is_none_or(|(_, best_cost, _)| cost < *best_cost) {
                best = Some((index, cost, candidate));
            }
        }

        let (elevator_index, cost, plan) =
            best.ok_or_else(|| DispatchError::NoElevatorAvailable(request.id.clone()))?;
        debug!(
            "request `{}`: assigned to {} at cost {}",
            request.id, self.elevators[elevator_index].name, cost
        );
        Ok(Selection { elevator_index, plan })
    }

    /// Build the hypothetical plan this elevator would run if it accepted
    /// the request: source and target worked into the earliest monotone
    /// subplan going the request's way, or appended to the tail when no
    /// sweep fits. Falls back to the tail append when the in-sweep plan
    /// would exceed capacity somewhere along the way.
    pub fn candidate_plan(&self, elevator: &Elevator) -> Result<Vec<ElevatorStop>, DispatchError> {
        let request = self.request.borrow();
        let source = request.source_floor;
        let target = request.target_floor;
        let direction = request.direction();

        if elevator.plan.is_empty() {
            return Ok(vec![
                ElevatorStop::pickup(source, self.request.clone()),
                ElevatorStop::dropoff(target, self.request.clone()),
            ]);
        }

        // Anchor the sweep search (and the wait accounting) at the current
        // floor when it is not already the head stop.
        let prepended = elevator.current_floor != elevator.plan[0].floor;
        let working: Vec<ElevatorStop> = if prepended {
            let mut working = Vec::with_capacity(elevator.plan.len() + 1);
            working.push(ElevatorStop::passage(elevator.current_floor));
            working.extend(elevator.plan.iter().cloned());
            working
        } else {
            elevator.plan.clone()
        };

        let candidate = if working.len() == 1 {
            // one stop and we are standing on it
            self.tail_append(elevator)
        } else {
            let mut subplans = split_into_monotone_subplans(&working)?;
            match matching_subplan(&subplans, source, target, direction) {
                Some(matched) => {
                    self.insert_into_subplan(&mut subplans[matched], source, target, direction)?;
                    let mut full: Vec<ElevatorStop> = subplans.into_iter().flatten().collect();
                    coalesce_plan(&mut full);
                    if prepended
                        && full.first().is_some_and(|stop| {
                            stop.floor == elevator.current_floor && stop.is_empty()
                        })
                    {
                        // the virtual anchor never leaks into a real plan
                        full.remove(0);
                    }
                    full
                }
                None => self.tail_append(elevator),
            }
        };

        if check_capacity(elevator, &candidate) {
            return Ok(candidate);
        }
        let fallback = self.tail_append(elevator);
        if !check_capacity(elevator, &fallback) {
            warn!(
                "request `{}`: {} exceeds capacity even as a tail append",
                request.id, elevator.name
            );
        }
        Ok(fallback)
    }

    fn tail_append(&self, elevator: &Elevator) -> Vec<ElevatorStop> {
        let request = self.request.borrow();
        let mut plan = elevator.plan.clone();
        plan.push(ElevatorStop::pickup(request.source_floor, self.request.clone()));
        plan.push(ElevatorStop::dropoff(request.target_floor, self.request.clone()));
        coalesce_plan(&mut plan);
        plan
    }

    fn insert_into_subplan(
        &self,
        subplan: &mut Vec<ElevatorStop>,
        source: Floor,
        target: Floor,
        direction: i32,
    ) -> Result<(), DispatchError> {
        let points = find_insertion_points(subplan, source, target, direction)?;

        if points.source_in_plan {
            subplan[points.source_index].pickups.push(self.request.clone());
        } else {
            subplan.insert(
                points.source_index,
                ElevatorStop::pickup(source, self.request.clone()),
            );
        }

        let merge_target = points.target_index < subplan.len()
            && subplan[points.target_index].floor == target;
        if merge_target {
            subplan[points.target_index].dropoffs.push(self.request.clone());
        } else {
            subplan.insert(
                points.target_index,
                ElevatorStop::dropoff(target, self.request.clone()),
            );
        }
        Ok(())
    }
}

/// The earliest subplan running the request's direction whose floor span
/// covers both the source and the target.
fn matching_subplan(
    subplans: &[Vec<ElevatorStop>],
    source: Floor,
    target: Floor,
    direction: i32,
) -> Option<usize> {
    subplans.iter().position(|subplan| {
        let first = subplan[0].floor;
        let last = subplan[subplan.len() - 1].floor;
        if (last - first).signum() != direction {
            return false;
        }
        let span = first.min(last)..=first.max(last);
        span.contains(&source) && span.contains(&target)
    })
}

/// Walk the candidate plan from the elevator's current load; reject when
/// any prefix pushes the on-board count past capacity.
pub fn check_capacity(elevator: &Elevator, plan: &[ElevatorStop]) -> bool {
    let capacity = elevator.capacity as i64;
    let mut on_board = elevator.passenger_count() as i64;
    for stop in plan {
        on_board += stop.pickups.len() as i64 - stop.dropoffs.len() as i64;
        if on_board > capacity {
            return false;
        }
    }
    true
}

/// Ticks until the elevator reaches the request's pickup stop: one tick per
/// floor traversed plus one dwell tick for every stop serviced on the way.
/// No dwell is charged for the pickup stop itself.
pub fn wait_time(current_floor: Floor, plan: &[ElevatorStop], request: &CallRequest) -> Tick {
    let mut wait: Tick = 0;
    let mut previous = current_floor;
    for stop in plan {
        wait += Tick::from((stop.floor - previous).abs());
        if stop.contains_pickup(&request.id) {
            return wait;
        }
        wait += 1;
        previous = stop.floor;
    }
    panic!("request `{}` has no pickup stop in the candidate plan", request.id);
}

/// Ticks from the pickup stop to arrival at the dropoff stop, charging one
/// dwell tick per intermediate stop. No dwell for the dropoff itself.
pub fn travel_time(plan: &[ElevatorStop], request: &CallRequest) -> Tick {
    let mut stops = plan.iter().skip_while(|stop| !stop.contains_pickup(&request.id));
    let Some(pickup_stop) = stops.next() else {
        panic!("request `{}` has no pickup stop in the candidate plan", request.id);
    };

    let mut travel: Tick = 0;
    let mut previous = pickup_stop.floor;
    for stop in stops {
        travel += Tick::from((stop.floor - previous).abs());
        if stop.contains_dropoff(&request.id) {
            return travel;
        }
        travel += 1;
        previous = stop.floor;
    }
    panic!("request `{}` has no dropoff stop in the candidate plan", request.id);
}

#[cfg(test)]
mod dispatcher_tests {
    use super::*;
    use crate::core::request::CallRequest;

    fn request(id: &str, call_time: Tick, source: Floor, target: Floor) -> SharedRequest {
        CallRequest::new(id, call_time, source, target).into_shared()
    }

    fn stop(floor: Floor) -> ElevatorStop {
        ElevatorStop::passage(floor)
    }

    fn stops(floors: &[Floor]) -> Vec<ElevatorStop> {
        floors.iter().copied().map(stop).collect()
    }

    fn elevator(name: &str, floor: Floor, capacity: usize) -> Elevator {
        Elevator::new(name, floor, capacity)
    }

    #[test]
    fn empty_plan_yields_source_then_target() {
        let lift = elevator("Ele 1", 3, 5);
        let req = request("R", 0, 5, 9);

        let plan = ElevatorDispatcher::new(std::slice::from_ref(&lift), &req)
            .candidate_plan(&lift)
            .unwrap();

        assert_eq!(
            plan,
            vec![ElevatorStop::pickup(5, req.clone()), ElevatorStop::dropoff(9, req)]
        );
    }

    #[test]
    fn request_is_worked_into_the_matching_down_sweep() {
        let mut lift = elevator("Ele 1", 3, 5);
        lift.replace_plan(stops(&[3, 4, 6, 2]));
        let req = request("R", 10, 5, 3);

        let plan = ElevatorDispatcher::new(std::slice::from_ref(&lift), &req)
            .candidate_plan(&lift)
            .unwrap();

        assert_eq!(
            plan,
            vec![
                stop(3),
                stop(4),
                stop(6),
                ElevatorStop::pickup(5, req.clone()),
                ElevatorStop::dropoff(3, req),
                stop(2),
            ]
        );
    }

    #[test]
    fn pickup_merges_onto_the_current_head_stop() {
        let mut lift = elevator("Ele 1", 3, 5);
        lift.replace_plan(stops(&[3, 4, 6, 8, 2]));
        let req = request("R", 10, 3, 7);

        let plan = ElevatorDispatcher::new(std::slice::from_ref(&lift), &req)
            .candidate_plan(&lift)
            .unwrap();

        assert_eq!(
            plan,
            vec![
                ElevatorStop::pickup(3, req.clone()),
                stop(4),
                stop(6),
                ElevatorStop::dropoff(7, req),
                stop(8),
                stop(2),
            ]
        );
    }

    #[test]
    fn request_outside_every_sweep_is_appended_to_the_tail() {
        let mut lift = elevator("Ele 1", 3, 5);
        lift.replace_plan(stops(&[3, 4, 6, 8, 2]));
        let req = request("R", 10, 1, 7);

        let plan = ElevatorDispatcher::new(std::slice::from_ref(&lift), &req)
            .candidate_plan(&lift)
            .unwrap();

        assert_eq!(
            plan,
            vec![
                stop(3),
                stop(4),
                stop(6),
                stop(8),
                stop(2),
                ElevatorStop::pickup(1, req.clone()),
                ElevatorStop::dropoff(7, req),
            ]
        );
    }

    #[test]
    fn virtual_current_floor_stop_is_stripped_from_the_final_plan() {
        let mut lift = elevator("Ele 1", 5, 5);
        lift.replace_plan(stops(&[8, 12]));
        let req = request("R", 0, 9, 11);

        let plan = ElevatorDispatcher::new(std::slice::from_ref(&lift), &req)
            .candidate_plan(&lift)
            .unwrap();

        assert_eq!(
            plan,
            vec![
                stop(8),
                ElevatorStop::pickup(9, req.clone()),
                ElevatorStop::dropoff(11, req),
                stop(12),
            ]
        );
    }

    #[test]
    fn virtual_stop_survives_when_it_becomes_the_pickup() {
        let mut lift = elevator("Ele 1", 5, 5);
        lift.replace_plan(stops(&[8]));
        let req = request("R", 0, 5, 8);

        let plan = ElevatorDispatcher::new(std::slice::from_ref(&lift), &req)
            .candidate_plan(&lift)
            .unwrap();

        assert_eq!(
            plan,
            vec![ElevatorStop::pickup(5, req.clone()), ElevatorStop::dropoff(8, req.clone())]
        );
        let borrowed = req.borrow();
        assert_eq!(wait_time(5, &plan, &borrowed), 0, "pickup is immediate");
    }

    #[test]
    fn wait_time_charges_movement_and_intermediate_dwell() {
        let req = request("R", 10, 6, 2);
        let plan = vec![stop(3), stop(4), ElevatorStop::pickup(6, req.clone()), stop(2)];

        assert_eq!(wait_time(3, &plan, &req.borrow()), 5);
        assert_eq!(wait_time(2, &plan, &req.borrow()), 6);
    }

    #[test]
    fn wait_time_is_zero_when_pickup_is_the_head_stop_here() {
        let req = request("R", 10, 3, 6);
        let plan = vec![ElevatorStop::pickup(3, req.clone()), stop(4), stop(6), stop(2)];

        assert_eq!(wait_time(3, &plan, &req.borrow()), 0);
    }

    #[test]
    fn travel_time_charges_movement_and_intermediate_dwell() {
        let across = request("R", 10, 3, 2);
        let plan = vec![
            ElevatorStop::pickup(3, across.clone()),
            stop(4),
            stop(6),
            ElevatorStop::dropoff(2, across.clone()),
        ];
        assert_eq!(travel_time(&plan, &across.borrow()), 9);

        let neighbor = request("S", 10, 3, 4);
        let plan = vec![
            ElevatorStop::pickup(3, neighbor.clone()),
            ElevatorStop::dropoff(4, neighbor.clone()),
            stop(6),
            stop(2),
        ];
        assert_eq!(travel_time(&plan, &neighbor.borrow()), 1);

        let tail = request("T", 10, 6, 2);
        let plan = vec![
            stop(3),
            stop(4),
            ElevatorStop::pickup(6, tail.clone()),
            ElevatorStop::dropoff(2, tail.clone()),
        ];
        assert_eq!(travel_time(&plan, &tail.borrow()), 4);
    }

    #[test]
    fn capacity_accepts_a_plan_that_peaks_at_capacity() {
        let lift = elevator("Ele 1", 3, 2);
        let plan = vec![
            stop(3),
            ElevatorStop {
                floor: 4,
                pickups: vec![request("A", 0, 4, 6), request("B", 0, 4, 6), request("C", 0, 4, 2)],
                dropoffs: vec![request("D", 0, 3, 4)],
            },
            stop(6),
            stop(2),
        ];

        assert!(check_capacity(&lift, &plan), "net load stays within capacity");
    }

    #[test]
    fn capacity_rejects_an_overfull_prefix() {
        let lift = elevator("Ele 1", 3, 2);
        let plan = vec![
            ElevatorStop { floor: 3, pickups: vec![request("A", 0, 3, 6)], dropoffs: vec![] },
            ElevatorStop {
                floor: 4,
                pickups: vec![request("B", 0, 4, 6), request("C", 0, 4, 6), request("D", 0, 4, 6)],
                dropoffs: vec![],
            },
            stop(6),
            stop(2),
        ];

        assert!(!check_capacity(&lift, &plan));
    }

    #[test]
    fn capacity_accepts_an_empty_plan() {
        let lift = elevator("Ele 1", 3, 2);
        assert!(check_capacity(&lift, &[]));
    }

    #[test]
    fn over_capacity_insertion_falls_back_to_tail_append() {
        let boarded = request("X", 0, 2, 10);
        boarded.borrow_mut().pickup_time = Some(1);
        let mut lift = elevator("Ele 1", 3, 1);
        lift.passengers.push("X".to_string());
        lift.replace_plan(vec![ElevatorStop::dropoff(10, boarded)]);

        let req = request("R", 5, 4, 7);
        let plan = ElevatorDispatcher::new(std::slice::from_ref(&lift), &req)
            .candidate_plan(&lift)
            .unwrap();

        let floors: Vec<Floor> = plan.iter().map(|s| s.floor).collect();
        assert_eq!(floors, vec![10, 4, 7], "pickup waits for the cab to empty");
        assert!(plan[1].contains_pickup("R"));
        assert!(plan[2].contains_dropoff("R"));
    }

    #[test]
    fn idle_elevator_nearest_to_the_source_wins() {
        let mut busy = elevator("Ele 1", 3, 5);
        busy.replace_plan(stops(&[3, 4, 6, 8, 2]));
        let idle = elevator("Ele 2", 13, 5);
        let fleet = vec![busy, idle];

        let req = request("R", 10, 11, 3);
        let selection = ElevatorDispatcher::new(&fleet, &req)
            .select_elevator_and_plan()
            .unwrap();

        assert_eq!(selection.elevator_index, 1);
        assert_eq!(
            selection.plan,
            vec![ElevatorStop::pickup(11, req.clone()), ElevatorStop::dropoff(3, req)]
        );
    }

    #[test]
    fn far_idle_elevator_wins_against_an_opposing_sweep() {
        let mut busy = elevator("Ele 1", 3, 5);
        busy.replace_plan(stops(&[4, 6, 2]));
        let idle = elevator("Ele 2", 13, 5);
        let fleet = vec![busy, idle];

        let req = request("R", 0, 11, 3);
        let selection = ElevatorDispatcher::new(&fleet, &req)
            .select_elevator_and_plan()
            .unwrap();

        assert_eq!(selection.elevator_index, 1, "tail append loses to a fresh trip");
    }

    #[test]
    fn elevator_riding_its_sweep_beats_a_nearer_idle_one() {
        let mut busy = elevator("Ele 1", 3, 5);
        busy.replace_plan(stops(&[3, 4, 6, 8, 2]));
        let idle = elevator("Ele 2", 13, 5);
        let fleet = vec![busy, idle];

        let req = request("R", 10, 5, 7);
        let selection = ElevatorDispatcher::new(&fleet, &req)
            .select_elevator_and_plan()
            .unwrap();

        assert_eq!(selection.elevator_index, 0);
        assert_eq!(
            selection.plan,
            vec![
                stop(3),
                stop(4),
                ElevatorStop::pickup(5, req.clone()),
                stop(6),
                ElevatorStop::dropoff(7, req),
                stop(8),
                stop(2),
            ]
        );
    }

    #[test]
    fn choice_flips_when_the_plan_grows() {
        let mut busy = elevator("Ele 1", 3, 5);
        busy.replace_plan(stops(&[3, 4, 6, 2]));
        let idle = elevator("Ele 2", 13, 5);
        let mut fleet = vec![busy, idle];

        let req = request("R", 10, 1, 5);
        let selection = ElevatorDispatcher::new(&fleet, &req)
            .select_elevator_and_plan()
            .unwrap();
        // equal costs: the first elevator takes the tie
        assert_eq!(selection.elevator_index, 0);
        assert_eq!(
            selection.plan,
            vec![
                stop(3),
                stop(4),
                stop(6),
                stop(2),
                ElevatorStop::pickup(1, req.clone()),
                ElevatorStop::dropoff(5, req.clone()),
            ]
        );

        fleet[0].replace_plan(stops(&[3, 4, 6, 8, 2]));
        let selection = ElevatorDispatcher::new(&fleet, &req)
            .select_elevator_and_plan()
            .unwrap();
        assert_eq!(selection.elevator_index, 1);
        assert_eq!(
            selection.plan,
            vec![ElevatorStop::pickup(1, req.clone()), ElevatorStop::dropoff(5, req)]
        );
    }

    #[test]
    fn unavailable_elevators_are_never_considered() {
        let mut offline = elevator("Ele 1", 5, 5);
        offline.state = ElevatorState::Unavailable;
        let idle = elevator("Ele 2", 13, 5);
        let fleet = vec![offline, idle];

        let req = request("R", 0, 5, 7);
        let selection = ElevatorDispatcher::new(&fleet, &req)
            .select_elevator_and_plan()
            .unwrap();

        assert_eq!(selection.elevator_index, 1);
    }

    #[test]
    fn dispatch_fails_when_every_elevator_is_unavailable() {
        let mut offline = elevator("Ele 1", 5, 5);
        offline.state = ElevatorState::Unavailable;
        let fleet = vec![offline];

        let req = request("R", 0, 5, 7);
        let result = ElevatorDispatcher::new(&fleet, &req).select_elevator_and_plan();

        assert_eq!(
            result.unwrap_err(),
            DispatchError::NoElevatorAvailable("R".to_string())
        );
    }
}
