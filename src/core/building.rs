use crate::core::elevator::Elevator;
use crate::core::request::Floor;

/// The three integer parameters that shape a simulation.
#[derive(Debug, Clone, Copy)]
pub struct BuildingConfig {
    pub number_of_floors: Floor,
    pub number_of_elevators: usize,
    pub max_capacity_of_elevator: usize,
}

/// The floors and the elevator fleet. Every elevator starts at floor 1,
/// idle, with no passengers.
#[derive(Debug)]
pub struct Building {
    pub floors: Floor,
    pub elevators: Vec<Elevator>,
}

impl Building {
    pub fn new(config: BuildingConfig) -> Self {
        let elevators = (0..config.number_of_elevators)
            .map(|index| {
                Elevator::new(
                    format!("Ele {}", index + 1),
                    1,
                    config.max_capacity_of_elevator,
                )
            })
            .collect();
        Self { floors: config.number_of_floors, elevators }
    }
}
