use chrono::NaiveDate;
use derive_more::{Display, Error};

use crate::model::LeaveStatus;

/// Failures surfaced by [`crate::ledger::LeaveLedger`]. None are retried
/// internally; the caller presents the message and re-prompts or aborts.
#[derive(Debug, Display, Error)]
pub enum LedgerError {
    #[display(fmt = "end date {} cannot be before start date {}", end, start)]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[display(fmt = "employee not found: {}", id)]
    UnknownEmployee {
        #[error(not(source))]
        id: u64,
    },

    #[display(
        fmt = "insufficient leave balance: requested {} day(s), {} available",
        requested,
        available
    )]
    InsufficientBalance { requested: u32, available: u32 },

    #[display(
        fmt = "only pending requests can be updated: leave {} is {}",
        id,
        status
    )]
    InvalidTransition { id: u64, status: LeaveStatus },

    #[display(fmt = "leave not found: {}", id)]
    NotFound {
        #[error(not(source))]
        id: u64,
    },

    #[display(fmt = "employee id already exists: {}", id)]
    DuplicateEmployee {
        #[error(not(source))]
        id: u64,
    },

    /// A table rewrite failed. In-memory state has been rolled back, but an
    /// earlier table written by the same operation may already be on disk.
    #[display(fmt = "failed to persist {} table: {}", table, source)]
    Persistence {
        table: &'static str,
        source: std::io::Error,
    },
}
