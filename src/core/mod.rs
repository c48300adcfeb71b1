pub mod building;
pub mod elevator;
pub mod plan;
pub mod request;
pub mod stop;

pub use building::{Building, BuildingConfig};
pub use elevator::{Elevator, ElevatorState};
pub use request::{CallRequest, Floor, RequestId, SharedRequest, Tick};
pub use stop::ElevatorStop;
