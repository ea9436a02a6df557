use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::LedgerError;
use crate::model::{Employee, LeaveApplication, LeaveStatus, LeaveType};
use crate::store::FileStore;

/// Single authoritative in-memory state plus the rules of the leave
/// lifecycle. One instance per process run.
///
/// Every mutation is write-through: the affected table is rewritten in full
/// before the call returns, so there is no dirty buffer to flush. If a
/// rewrite fails, the in-memory change from that call is rolled back and the
/// error surfaced as [`LedgerError::Persistence`].
///
/// Mutations take `&mut self`; any multi-client access has to add its own
/// serialization boundary around the whole ledger.
pub struct LeaveLedger {
    store: FileStore,
    employees: Vec<Employee>,
    leaves: Vec<LeaveApplication>,
}

impl LeaveLedger {
    /// Load both tables (seeding on first run) and hold them for the life of
    /// the session.
    pub fn open(store: FileStore) -> Self {
        let employees = store.load_employees();
        let leaves = store.load_leaves();
        info!(
            employees = employees.len(),
            leaves = leaves.len(),
            "leave ledger loaded"
        );
        Self {
            store,
            employees,
            leaves,
        }
    }

    /// All employees, in table order.
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn employee(&self, id: u64) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    /// All leave applications, in table order.
    pub fn all_leaves(&self) -> &[LeaveApplication] {
        &self.leaves
    }

    pub fn leaves_for_employee(&self, employee_id: u64) -> Vec<&LeaveApplication> {
        self.leaves
            .iter()
            .filter(|l| l.employee_id == employee_id)
            .collect()
    }

    pub fn pending_leaves(&self) -> Vec<&LeaveApplication> {
        self.leaves
            .iter()
            .filter(|l| l.status == LeaveStatus::Pending)
            .collect()
    }

    /// Submit a new leave request. The request starts PENDING; no balance is
    /// debited (or reserved) until approval. Returns the stored record.
    pub fn apply_leave(
        &mut self,
        employee_id: u64,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: Option<&str>,
    ) -> Result<LeaveApplication, LedgerError> {
        if end_date < start_date {
            return Err(LedgerError::InvalidRange {
                start: start_date,
                end: end_date,
            });
        }
        let days = (end_date - start_date).num_days() as u32 + 1;
        let employee = self
            .employee(employee_id)
            .ok_or(LedgerError::UnknownEmployee { id: employee_id })?;
        if leave_type == LeaveType::Annual && employee.balance < days {
            return Err(LedgerError::InsufficientBalance {
                requested: days,
                available: employee.balance,
            });
        }

        let id = self.store.next_leave_id(&self.leaves);
        let leave = LeaveApplication {
            id,
            employee_id,
            leave_type,
            start_date,
            end_date,
            days,
            status: LeaveStatus::Pending,
            reason: reason.unwrap_or_default().to_string(),
        };
        self.leaves.push(leave.clone());
        if let Err(e) = self.store.save_leaves(&self.leaves) {
            self.leaves.pop();
            return Err(LedgerError::Persistence {
                table: "leaves",
                source: e,
            });
        }

        info!(leave_id = id, employee_id, days, leave_type = %leave_type, "leave application submitted");
        Ok(leave)
    }

    /// Approve a PENDING request. ANNUAL leave debits the owner's balance
    /// (floored at zero) and rewrites the employee table; the leave table is
    /// rewritten for every type.
    pub fn approve_leave(&mut self, leave_id: u64) -> Result<(), LedgerError> {
        let idx = self.pending_index(leave_id)?;
        self.leaves[idx].status = LeaveStatus::Approved;

        let mut debited: Option<(usize, u32)> = None;
        if self.leaves[idx].leave_type == LeaveType::Annual {
            let employee_id = self.leaves[idx].employee_id;
            let days = self.leaves[idx].days;
            match self.employees.iter().position(|e| e.id == employee_id) {
                Some(ei) => {
                    let prev = self.employees[ei].balance;
                    self.employees[ei].balance = prev.saturating_sub(days);
                    debited = Some((ei, prev));
                    if let Err(e) = self.store.save_employees(&self.employees) {
                        self.employees[ei].balance = prev;
                        self.leaves[idx].status = LeaveStatus::Pending;
                        return Err(LedgerError::Persistence {
                            table: "employees",
                            source: e,
                        });
                    }
                }
                // Only reachable through a hand-edited employee table.
                None => warn!(
                    leave_id,
                    employee_id, "approving leave for unknown employee, no balance to debit"
                ),
            }
        }

        if let Err(e) = self.store.save_leaves(&self.leaves) {
            self.leaves[idx].status = LeaveStatus::Pending;
            if let Some((ei, prev)) = debited {
                self.employees[ei].balance = prev;
                warn!(
                    leave_id,
                    "leave table save failed after the employee table was already rewritten"
                );
            }
            return Err(LedgerError::Persistence {
                table: "leaves",
                source: e,
            });
        }

        info!(leave_id, "leave approved");
        Ok(())
    }

    /// Reject a PENDING request. No balance effect.
    pub fn reject_leave(&mut self, leave_id: u64) -> Result<(), LedgerError> {
        let idx = self.pending_index(leave_id)?;
        self.leaves[idx].status = LeaveStatus::Rejected;
        if let Err(e) = self.store.save_leaves(&self.leaves) {
            self.leaves[idx].status = LeaveStatus::Pending;
            return Err(LedgerError::Persistence {
                table: "leaves",
                source: e,
            });
        }
        info!(leave_id, "leave rejected");
        Ok(())
    }

    /// Provision a new employee with an externally chosen ID.
    pub fn add_employee(
        &mut self,
        id: u64,
        name: &str,
        balance: u32,
    ) -> Result<Employee, LedgerError> {
        if self.employee(id).is_some() {
            return Err(LedgerError::DuplicateEmployee { id });
        }
        let employee = Employee::new(id, name, balance);
        self.employees.push(employee.clone());
        if let Err(e) = self.store.save_employees(&self.employees) {
            self.employees.pop();
            return Err(LedgerError::Persistence {
                table: "employees",
                source: e,
            });
        }
        info!(employee_id = id, name, "employee provisioned");
        Ok(employee)
    }

    fn pending_index(&self, leave_id: u64) -> Result<usize, LedgerError> {
        let idx = self
            .leaves
            .iter()
            .position(|l| l.id == leave_id)
            .ok_or(LedgerError::NotFound { id: leave_id })?;
        let status = self.leaves[idx].status;
        if status != LeaveStatus::Pending {
            return Err(LedgerError::InvalidTransition {
                id: leave_id,
                status,
            });
        }
        Ok(idx)
    }
}
