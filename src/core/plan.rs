//! Plan geometry: splitting a stop list into monotone subplans, merging
//! same-floor neighbors, and locating insertion points inside one sweep.

use crate::core::request::Floor;
use crate::core::stop::ElevatorStop;
use crate::errors::DispatchError;

/// Merge every pair of adjacent stops sharing a floor. After this no two
/// neighbors have the same floor.
pub fn coalesce_plan(plan: &mut Vec<ElevatorStop>) {
    let mut index = 1;
    while index < plan.len() {
        if plan[index].floor == plan[index - 1].floor {
            let duplicate = plan.remove(index);
            plan[index - 1].absorb(duplicate);
        } else {
            index += 1;
        }
    }
}

/// Split an ordered stop list at its direction inflections. Each returned
/// slice is strictly monotone and begins with the pivot stop it shares with
/// the previous slice, so rejoining is concatenate-then-coalesce.
pub fn split_into_monotone_subplans(
    plan: &[ElevatorStop],
) -> Result<Vec<Vec<ElevatorStop>>, DispatchError> {
    if plan.len() < 2 {
        return Err(DispatchError::PlanTooSmallToSplit);
    }

    let mut cuts = Vec::new();
    let mut direction = (plan[1].floor - plan[0].floor).signum();
    for index in 1..plan.len() - 1 {
        let next_direction = (plan[index + 1].floor - plan[index].floor).signum();
        if next_direction != direction {
            cuts.push(index + 1);
            direction = next_direction;
        }
    }
    cuts.push(plan.len());

    let mut subplans = Vec::with_capacity(cuts.len());
    let mut start = 0;
    for cut in cuts {
        subplans.push(plan[start..cut].to_vec());
        start = cut - 1;
    }
    Ok(subplans)
}

/// Positions at which a source and target stop slot into a monotone subplan
/// without breaking its ordering. `target_index` already accounts for the
/// source stop when that one has to be inserted rather than merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoints {
    pub source_index: usize,
    pub target_index: usize,
    /// The source floor is already a stop in the subplan; merge into it
    /// instead of inserting.
    pub source_in_plan: bool,
}

/// Find where a request's source and target floors belong inside a subplan
/// sorted for `direction` (+1 ascending, -1 descending). Fails when the
/// subplan is not sorted or the floors fall outside its range; in the
/// dispatch pipeline the subplan-matching step rules those cases out, so a
/// failure here is a bug upstream.
pub fn find_insertion_points(
    subplan: &[ElevatorStop],
    source_floor: Floor,
    target_floor: Floor,
    direction: i32,
) -> Result<InsertionPoints, DispatchError> {
    let at_or_before: fn(Floor, Floor) -> bool = match direction {
        1 => |a, b| a <= b,
        -1 => |a, b| a >= b,
        other => return Err(DispatchError::UnknownDirection(other)),
    };

    if subplan
        .windows(2)
        .any(|pair| !at_or_before(pair[0].floor, pair[1].floor))
    {
        return Err(DispatchError::SubplanNotSorted { dir: direction });
    }

    let mut source = None;
    for (index, stop) in subplan.iter().enumerate() {
        if at_or_before(source_floor, stop.floor) {
            if index == 0 && source_floor != stop.floor {
                return Err(DispatchError::SourceFloorOutOfRange(source_floor));
            }
            source = Some((index, source_floor == stop.floor));
            break;
        }
    }
    let (source_index, source_in_plan) =
        source.ok_or(DispatchError::SourceFloorOutOfRange(source_floor))?;

    let mut target_index = None;
    for index in source_index.saturating_sub(1)..subplan.len() {
        if at_or_before(target_floor, subplan[index].floor) {
            target_index = Some(index);
            break;
        }
    }
    let mut target_index =
        target_index.ok_or(DispatchError::TargetFloorOutOfRange(target_floor))?;

    if !source_in_plan {
        // the source stop will be inserted ahead of the target position
        target_index += 1;
    }

    Ok(InsertionPoints { source_index, target_index, source_in_plan })
}
