use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Leave categories. The uppercase names are the on-disk encoding and must
/// not change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum LeaveType {
    Annual,
    Sick,
    Unpaid,
}

/// One-way state machine: PENDING is the only initial state and the only
/// state a transition may leave; APPROVED and REJECTED are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// A single leave request. Immutable after creation except for `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApplication {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// Inclusive day count, `(end - start) + 1`. Computed once when the
    /// application is created and frozen thereafter.
    pub days: u32,

    pub status: LeaveStatus,

    /// Free text, may be empty, never absent.
    pub reason: String,
}
