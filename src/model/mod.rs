pub mod employee;
pub mod leave;

pub use employee::Employee;
pub use leave::{LeaveApplication, LeaveStatus, LeaveType};
