use serde::{Deserialize, Serialize};

/// One row of the employee table. IDs are assigned externally (seed data or
/// admin provisioning), never generated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: u64,

    /// Display name, free text.
    pub name: String,

    /// Remaining annual leave, in whole days. Only approval of an ANNUAL
    /// application changes it.
    pub balance: u32,
}

impl Employee {
    pub fn new(id: u64, name: impl Into<String>, balance: u32) -> Self {
        Self {
            id,
            name: name.into(),
            balance,
        }
    }
}
