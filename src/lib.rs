//! Single-process leave management core.
//!
//! Employees submit leave requests against an annual balance; an
//! administrator approves or rejects pending requests; all state lives in
//! two flat-file tables. The presentation layer is external and calls
//! [`ledger::LeaveLedger`] directly in-process.

pub mod config;
pub mod error;
pub mod ledger;
pub mod model;
pub mod store;

pub use config::Config;
pub use error::LedgerError;
pub use ledger::LeaveLedger;
pub use model::{Employee, LeaveApplication, LeaveStatus, LeaveType};
pub use store::FileStore;
