pub mod dispatcher;

pub use dispatcher::{ElevatorDispatcher, Selection, check_capacity, travel_time, wait_time};
