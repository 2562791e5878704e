pub mod events;
pub mod steps;

pub use events::{create_event, delete_event, get_event, list_events, CreateEventInput};
pub use steps::{create_step, delete_step, list_steps, update_step, CreateStepInput, UpdateStepInput};
