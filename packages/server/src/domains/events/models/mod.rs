pub mod event;
pub mod step;

pub use event::{Event, NewEvent};
pub use step::{EventStep, NewStep, StepChanges, DEFAULT_ALERT_BEFORE_MINUTES};
