use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::model::{Employee, LeaveApplication, LeaveStatus, LeaveType};

const EMPLOYEE_FILE: &str = "employees.csv";
const LEAVE_FILE: &str = "leaves.csv";
const EMPLOYEE_HEADER: &str = "id,name,balance";
const LEAVE_HEADER: &str = "id,employeeId,type,start,end,days,status,reason";
const DATE_FMT: &str = "%Y-%m-%d";

/// Flat-file backend for the two tables. Pure data-shape translation: no
/// business rules live here.
///
/// Both tables are UTF-8, one row per line, comma-separated with a mandatory
/// header row. Free-text fields are backslash-escaped (`\` -> `\\`,
/// `,` -> `\,`) so rows split cleanly on unescaped commas. Every save is a
/// full truncate-and-rewrite of the table.
pub struct FileStore {
    data_dir: PathBuf,
    emp_path: PathBuf,
    leave_path: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let emp_path = data_dir.join(EMPLOYEE_FILE);
        let leave_path = data_dir.join(LEAVE_FILE);
        Self {
            data_dir,
            emp_path,
            leave_path,
        }
    }

    /// Load the employee table in file order. A missing table is first-run:
    /// the default employees are seeded and written out immediately.
    ///
    /// Read failures are logged and non-fatal; whatever parsed is returned.
    pub fn load_employees(&self) -> Vec<Employee> {
        self.ensure_data_dir();
        if !self.emp_path.exists() {
            let seeds = vec![
                Employee::new(1001, "Alice", 20),
                Employee::new(1002, "Bob", 20),
            ];
            info!(path = %self.emp_path.display(), "employee table missing, seeding defaults");
            if let Err(e) = self.save_employees(&seeds) {
                warn!(error = %e, "failed to write seeded employee table");
            }
            return seeds;
        }

        let raw = match fs::read_to_string(&self.emp_path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, path = %self.emp_path.display(), "failed to read employee table");
                return Vec::new();
            }
        };

        let mut employees = Vec::new();
        for (lineno, line) in raw.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            match parse_employee_row(line) {
                Some(emp) => employees.push(emp),
                None => warn!(line = lineno + 1, "skipping malformed employee row"),
            }
        }
        employees
    }

    /// Rewrite the whole employee table, header first, rows in slice order.
    pub fn save_employees(&self, employees: &[Employee]) -> io::Result<()> {
        self.ensure_data_dir();
        let mut out = String::from(EMPLOYEE_HEADER);
        out.push('\n');
        for e in employees {
            out.push_str(&format!("{},{},{}\n", e.id, escape(&e.name), e.balance));
        }
        fs::write(&self.emp_path, out)
    }

    /// Load the leave table in file order. A missing table is written out as
    /// an empty (header-only) table and an empty list returned.
    pub fn load_leaves(&self) -> Vec<LeaveApplication> {
        self.ensure_data_dir();
        if !self.leave_path.exists() {
            info!(path = %self.leave_path.display(), "leave table missing, creating empty table");
            if let Err(e) = self.save_leaves(&[]) {
                warn!(error = %e, "failed to write empty leave table");
            }
            return Vec::new();
        }

        let raw = match fs::read_to_string(&self.leave_path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, path = %self.leave_path.display(), "failed to read leave table");
                return Vec::new();
            }
        };

        let mut leaves = Vec::new();
        for (lineno, line) in raw.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            match parse_leave_row(line) {
                Some(leave) => leaves.push(leave),
                None => warn!(line = lineno + 1, "skipping malformed leave row"),
            }
        }
        leaves
    }

    /// Rewrite the whole leave table.
    pub fn save_leaves(&self, leaves: &[LeaveApplication]) -> io::Result<()> {
        self.ensure_data_dir();
        let mut out = String::from(LEAVE_HEADER);
        out.push('\n');
        for l in leaves {
            out.push_str(&format!(
                "{},{},{},{},{},{},{},{}\n",
                l.id,
                l.employee_id,
                l.leave_type,
                l.start_date.format(DATE_FMT),
                l.end_date.format(DATE_FMT),
                l.days,
                l.status,
                escape(&l.reason),
            ));
        }
        fs::write(&self.leave_path, out)
    }

    /// Next leave ID by max-scan over the existing records, floor 1001.
    /// Deliberately not a persisted counter: this survives manual edits to
    /// the table and never reuses an ID across restarts.
    pub fn next_leave_id(&self, leaves: &[LeaveApplication]) -> u64 {
        leaves.iter().map(|l| l.id).max().unwrap_or(1000) + 1
    }

    fn ensure_data_dir(&self) {
        if let Err(e) = fs::create_dir_all(&self.data_dir) {
            warn!(error = %e, path = %self.data_dir.display(), "failed to create data directory");
        }
    }
}

fn parse_employee_row(line: &str) -> Option<Employee> {
    let fields = split_row(line);
    if fields.len() < 3 {
        return None;
    }
    Some(Employee {
        id: fields[0].parse().ok()?,
        name: unescape(&fields[1]),
        balance: fields[2].parse().ok()?,
    })
}

fn parse_leave_row(line: &str) -> Option<LeaveApplication> {
    let fields = split_row(line);
    if fields.len() < 8 {
        return None;
    }
    Some(LeaveApplication {
        id: fields[0].parse().ok()?,
        employee_id: fields[1].parse().ok()?,
        leave_type: LeaveType::from_str(&fields[2]).ok()?,
        start_date: NaiveDate::parse_from_str(&fields[3], DATE_FMT).ok()?,
        end_date: NaiveDate::parse_from_str(&fields[4], DATE_FMT).ok()?,
        days: fields[5].parse().ok()?,
        status: LeaveStatus::from_str(&fields[6]).ok()?,
        reason: unescape(&fields[7]),
    })
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace(',', "\\,")
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;
    for c in s.chars() {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else {
            out.push(c);
        }
    }
    out
}

/// Split on unescaped commas, keeping escape sequences intact for
/// [`unescape`] to resolve per field. A trailing empty field is preserved.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut cur = String::new();
    let mut escaped = false;
    for c in line.chars() {
        if escaped {
            cur.push(c);
            escaped = false;
        } else if c == '\\' {
            cur.push(c);
            escaped = true;
        } else if c == ',' {
            fields.push(std::mem::take(&mut cur));
        } else {
            cur.push(c);
        }
    }
    fields.push(cur);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("data"));
        (dir, store)
    }

    fn leave(id: u64, reason: &str) -> LeaveApplication {
        LeaveApplication {
            id,
            employee_id: 1001,
            leave_type: LeaveType::Annual,
            start_date: NaiveDate::from_ymd_opt(2025, 8, 22).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 8, 24).unwrap(),
            days: 3,
            status: LeaveStatus::Pending,
            reason: reason.to_string(),
        }
    }

    #[test]
    fn escape_and_unescape_are_inverse() {
        for s in ["", "plain", "a,b", "back\\slash", "\\,", "mix\\,ed,\\\\"] {
            assert_eq!(unescape(&escape(s)), s);
        }
    }

    #[test]
    fn split_row_honors_escapes_and_trailing_empty() {
        assert_eq!(split_row("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_row("a\\,b,c"), vec!["a\\,b", "c"]);
        assert_eq!(split_row("a,b,"), vec!["a", "b", ""]);
        assert_eq!(split_row(""), vec![""]);
    }

    #[test]
    fn first_run_seeds_default_employees() {
        let (_dir, store) = store();
        let seeded = store.load_employees();
        assert_eq!(
            seeded,
            vec![
                Employee::new(1001, "Alice", 20),
                Employee::new(1002, "Bob", 20)
            ]
        );
        // Seed set must have been written out, not just returned.
        let reloaded = store.load_employees();
        assert_eq!(reloaded, seeded);
    }

    #[test]
    fn first_run_writes_empty_leave_table() {
        let (dir, store) = store();
        assert!(store.load_leaves().is_empty());
        let raw = fs::read_to_string(dir.path().join("data").join("leaves.csv")).unwrap();
        assert_eq!(raw, "id,employeeId,type,start,end,days,status,reason\n");
    }

    #[test]
    fn employee_round_trip_with_commas_and_backslashes() {
        let (_dir, store) = store();
        let employees = vec![
            Employee::new(1001, "Doe, John", 15),
            Employee::new(1002, "O\\Brien", 0),
        ];
        store.save_employees(&employees).unwrap();
        assert_eq!(store.load_employees(), employees);
    }

    #[test]
    fn leave_round_trip_preserves_every_field() {
        let (_dir, store) = store();
        let leaves = vec![leave(1001, "family event, out of town"), leave(1002, "")];
        store.save_leaves(&leaves).unwrap();
        assert_eq!(store.load_leaves(), leaves);
    }

    #[test]
    fn employee_table_format_is_stable() {
        let (dir, store) = store();
        store
            .save_employees(&[Employee::new(1001, "Alice", 20)])
            .unwrap();
        let raw = fs::read_to_string(dir.path().join("data").join("employees.csv")).unwrap();
        assert_eq!(raw, "id,name,balance\n1001,Alice,20\n");
    }

    #[test]
    fn leave_table_format_is_stable() {
        let (dir, store) = store();
        store.save_leaves(&[leave(1001, "Family event")]).unwrap();
        let raw = fs::read_to_string(dir.path().join("data").join("leaves.csv")).unwrap();
        assert_eq!(
            raw,
            "id,employeeId,type,start,end,days,status,reason\n\
             1001,1001,ANNUAL,2025-08-22,2025-08-24,3,PENDING,Family event\n"
        );
    }

    #[test]
    fn load_skips_blank_and_malformed_rows() {
        let (dir, store) = store();
        let path = dir.path().join("data");
        fs::create_dir_all(&path).unwrap();
        fs::write(
            path.join("employees.csv"),
            "id,name,balance\n\n1001,Alice,20\nnot-a-row\n1002,Bob,oops\n",
        )
        .unwrap();
        assert_eq!(store.load_employees(), vec![Employee::new(1001, "Alice", 20)]);
    }

    #[test]
    fn next_leave_id_is_max_plus_one_with_floor() {
        let (_dir, store) = store();
        assert_eq!(store.next_leave_id(&[]), 1001);
        assert_eq!(store.next_leave_id(&[leave(1001, ""), leave(1002, "")]), 1003);
        // Gaps from manual edits still move the allocator forward.
        assert_eq!(store.next_leave_id(&[leave(1001, ""), leave(2000, "")]), 2001);
    }
}
