pub mod check_in;

pub use check_in::{CheckIn, CheckInEntry, MemberAttendance, StepStatus};
