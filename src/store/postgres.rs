//! Postgres-backed stores built on `sqlx`.
//!
//! The store traits are synchronous, so each call runs its query on the
//! runtime captured at connect time through
//! [`tokio::task::block_in_place`]. That requires the multi-threaded tokio
//! runtime, which is what `#[tokio::main]` starts.
//!
//! Every guarded write is one SQL statement: status transitions are
//! `UPDATE … WHERE status = $expected`, attendance updates compare the
//! `version` column, and the `(employee_id, date)` and
//! `(employee_id, pay_period_start, pay_period_end)` uniqueness rules are
//! table constraints.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tokio::runtime::Handle;
use tracing::info;
use uuid::Uuid;

use super::{
    AttendanceStore, EmployeeDirectory, LeaveStore, PayrollStore, TransitionOutcome,
    ensure_no_manager_cycle,
};
use crate::error::{HrmsError, HrmsResult};
use crate::models::{
    AttendanceRecord, Employee, LeaveApplication, LeaveBalance, LeaveStatus, LeaveType, PayPeriod,
    PayrollRecord, PayrollStatus,
};

/// Upper bound on the reporting chain walked when checking for cycles.
const MAX_REPORTING_DEPTH: i32 = 1024;

/// Advisory lock key serialising manager assignments.
const MANAGER_LOCK_KEY: i64 = 0x5036_3630_4d47_5221;

/// A connection pool plus the runtime its queries run on.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    runtime: Handle,
}

impl PgStore {
    /// Connects to `database_url` and applies pending migrations.
    pub async fn connect(database_url: &str) -> HrmsResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(storage)?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|err| HrmsError::Storage {
                message: format!("migration failed: {}", err),
            })?;
        info!("Connected to Postgres and applied migrations");
        Self::from_pool(pool)
    }

    /// Wraps an existing pool. Must be called from inside a tokio runtime.
    pub fn from_pool(pool: PgPool) -> HrmsResult<Self> {
        let runtime = Handle::try_current().map_err(|err| HrmsError::Storage {
            message: format!("no tokio runtime for the Postgres store: {}", err),
        })?;
        Ok(Self { pool, runtime })
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// The employee directory over this pool.
    pub fn directory(&self) -> PgEmployeeDirectory {
        PgEmployeeDirectory {
            store: self.clone(),
        }
    }

    /// The attendance ledger over this pool.
    pub fn attendance(&self) -> PgAttendanceStore {
        PgAttendanceStore {
            store: self.clone(),
        }
    }

    /// Leave applications over this pool.
    pub fn leaves(&self) -> PgLeaveStore {
        PgLeaveStore {
            store: self.clone(),
        }
    }

    /// Payroll records over this pool.
    pub fn payroll(&self) -> PgPayrollStore {
        PgPayrollStore {
            store: self.clone(),
        }
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        tokio::task::block_in_place(|| self.runtime.block_on(future))
    }
}

fn storage(err: sqlx::Error) -> HrmsError {
    HrmsError::Storage {
        message: err.to_string(),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

/// The text stored for a unit enum variant, e.g. `half_day`.
fn to_text<T: Serialize>(value: &T) -> HrmsResult<String> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(text)) => Ok(text),
        _ => Err(HrmsError::Storage {
            message: "value does not serialise to a text column".to_string(),
        }),
    }
}

fn from_text<T: DeserializeOwned>(column: &str, text: String) -> HrmsResult<T> {
    serde_json::from_value(serde_json::Value::String(text)).map_err(|err| HrmsError::Storage {
        message: format!("unexpected {} value: {}", column, err),
    })
}

fn to_column<T, U>(column: &str, value: T) -> HrmsResult<U>
where
    U: TryFrom<T>,
{
    U::try_from(value).map_err(|_| HrmsError::Storage {
        message: format!("{} is out of range", column),
    })
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: Uuid,
    employee_id: String,
    first_name: String,
    last_name: String,
    email: String,
    department: Option<String>,
    position: Option<String>,
    salary: Option<Decimal>,
    status: String,
    manager_id: Option<String>,
    role: String,
    hire_date: NaiveDate,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = HrmsError;

    fn try_from(row: EmployeeRow) -> HrmsResult<Self> {
        Ok(Employee {
            id: row.id,
            employee_id: row.employee_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            department: row.department,
            position: row.position,
            salary: row.salary,
            status: from_text("employee status", row.status)?,
            manager_id: row.manager_id,
            role: from_text("role", row.role)?,
            hire_date: row.hire_date,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: Uuid,
    employee_id: String,
    date: NaiveDate,
    clock_in: Option<NaiveDateTime>,
    clock_out: Option<NaiveDateTime>,
    break_minutes: i32,
    total_hours: Option<Decimal>,
    status: String,
    notes: Option<String>,
    version: i64,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = HrmsError;

    fn try_from(row: AttendanceRow) -> HrmsResult<Self> {
        Ok(AttendanceRecord {
            id: row.id,
            employee_id: row.employee_id,
            date: row.date,
            clock_in: row.clock_in,
            clock_out: row.clock_out,
            break_minutes: to_column("break_minutes", row.break_minutes)?,
            total_hours: row.total_hours,
            status: from_text("attendance status", row.status)?,
            notes: row.notes,
            version: to_column("version", row.version)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LeaveRow {
    id: String,
    employee_id: String,
    leave_type: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    days_requested: i32,
    reason: String,
    status: String,
    approved_by: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    comments: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<LeaveRow> for LeaveApplication {
    type Error = HrmsError;

    fn try_from(row: LeaveRow) -> HrmsResult<Self> {
        Ok(LeaveApplication {
            id: row.id,
            employee_id: row.employee_id,
            leave_type: from_text("leave type", row.leave_type)?,
            start_date: row.start_date,
            end_date: row.end_date,
            days_requested: to_column("days_requested", row.days_requested)?,
            reason: row.reason,
            status: from_text("leave status", row.status)?,
            approved_by: row.approved_by,
            approved_at: row.approved_at,
            comments: row.comments,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PayrollRow {
    id: Uuid,
    employee_id: String,
    pay_period_start: NaiveDate,
    pay_period_end: NaiveDate,
    basic_salary: Decimal,
    allowances: Decimal,
    overtime_amount: Decimal,
    absence_deduction: Decimal,
    gross_pay: Decimal,
    tax_deduction: Decimal,
    other_deductions: Decimal,
    net_pay: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PayrollRow> for PayrollRecord {
    type Error = HrmsError;

    fn try_from(row: PayrollRow) -> HrmsResult<Self> {
        Ok(PayrollRecord {
            id: row.id,
            employee_id: row.employee_id,
            pay_period_start: row.pay_period_start,
            pay_period_end: row.pay_period_end,
            basic_salary: row.basic_salary,
            allowances: row.allowances,
            overtime_amount: row.overtime_amount,
            absence_deduction: row.absence_deduction,
            gross_pay: row.gross_pay,
            tax_deduction: row.tax_deduction,
            other_deductions: row.other_deductions,
            net_pay: row.net_pay,
            status: from_text("payroll status", row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> HrmsResult<Vec<T>>
where
    T: TryFrom<R, Error = HrmsError>,
{
    rows.into_iter().map(T::try_from).collect()
}

// ---------------------------------------------------------------------------
// Employees
// ---------------------------------------------------------------------------

/// Employees in the `employees` table.
#[derive(Debug, Clone)]
pub struct PgEmployeeDirectory {
    store: PgStore,
}

async fn assign_manager(
    pool: &PgPool,
    employee_id: &str,
    manager_id: Option<&str>,
) -> HrmsResult<Employee> {
    let mut tx = pool.begin().await.map_err(storage)?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MANAGER_LOCK_KEY)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM employees WHERE employee_id = $1)")
            .bind(employee_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(storage)?;
    if !exists {
        return Err(HrmsError::not_found("employee", employee_id));
    }

    if let Some(manager_id) = manager_id {
        let chain: Vec<(String, Option<String>)> = sqlx::query_as(
            "WITH RECURSIVE chain (employee_id, manager_id, depth) AS ( \
                 SELECT employee_id, manager_id, 1 FROM employees WHERE employee_id = $1 \
                 UNION ALL \
                 SELECT e.employee_id, e.manager_id, chain.depth + 1 \
                 FROM employees e JOIN chain ON e.employee_id = chain.manager_id \
                 WHERE chain.depth < $2 \
             ) \
             SELECT employee_id, manager_id FROM chain",
        )
        .bind(manager_id)
        .bind(MAX_REPORTING_DEPTH)
        .fetch_all(&mut *tx)
        .await
        .map_err(storage)?;
        if chain.is_empty() {
            return Err(HrmsError::not_found("employee", manager_id));
        }
        let limit = chain.len();
        let managers: HashMap<String, Option<String>> = chain.into_iter().collect();
        ensure_no_manager_cycle(employee_id, manager_id, limit, |code| {
            managers.get(code).cloned().flatten()
        })?;
    }

    let row: EmployeeRow =
        sqlx::query_as("UPDATE employees SET manager_id = $2 WHERE employee_id = $1 RETURNING *")
            .bind(employee_id)
            .bind(manager_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(storage)?;
    tx.commit().await.map_err(storage)?;
    Employee::try_from(row)
}

impl EmployeeDirectory for PgEmployeeDirectory {
    fn get(&self, employee_id: &str) -> HrmsResult<Option<Employee>> {
        let row: Option<EmployeeRow> = self
            .store
            .block_on(
                sqlx::query_as("SELECT * FROM employees WHERE employee_id = $1")
                    .bind(employee_id)
                    .fetch_optional(&self.store.pool),
            )
            .map_err(storage)?;
        row.map(Employee::try_from).transpose()
    }

    fn exists_active(&self, employee_id: &str) -> HrmsResult<bool> {
        self.store
            .block_on(
                sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM employees \
                     WHERE employee_id = $1 AND status = 'active')",
                )
                .bind(employee_id)
                .fetch_one(&self.store.pool),
            )
            .map_err(storage)
    }

    fn insert(&self, employee: Employee) -> HrmsResult<()> {
        let status = to_text(&employee.status)?;
        let role = to_text(&employee.role)?;
        let result = self.store.block_on(
            sqlx::query(
                "INSERT INTO employees (id, employee_id, first_name, last_name, email, \
                 department, position, salary, status, manager_id, role, hire_date) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            )
            .bind(employee.id)
            .bind(&employee.employee_id)
            .bind(&employee.first_name)
            .bind(&employee.last_name)
            .bind(&employee.email)
            .bind(&employee.department)
            .bind(&employee.position)
            .bind(employee.salary)
            .bind(status)
            .bind(&employee.manager_id)
            .bind(role)
            .bind(employee.hire_date)
            .execute(&self.store.pool),
        );
        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(HrmsError::Conflict {
                message: format!("employee code {} is already in use", employee.employee_id),
            }),
            Err(err) => Err(storage(err)),
        }
    }

    fn terminate(&self, employee_id: &str) -> HrmsResult<Employee> {
        let row: Option<EmployeeRow> = self
            .store
            .block_on(
                sqlx::query_as(
                    "UPDATE employees SET status = 'terminated' \
                     WHERE employee_id = $1 RETURNING *",
                )
                .bind(employee_id)
                .fetch_optional(&self.store.pool),
            )
            .map_err(storage)?;
        row.ok_or_else(|| HrmsError::not_found("employee", employee_id))
            .and_then(Employee::try_from)
    }

    fn set_manager(&self, employee_id: &str, manager_id: Option<&str>) -> HrmsResult<Employee> {
        self.store
            .block_on(assign_manager(&self.store.pool, employee_id, manager_id))
    }

    fn list(&self) -> HrmsResult<Vec<Employee>> {
        let rows: Vec<EmployeeRow> = self
            .store
            .block_on(
                sqlx::query_as("SELECT * FROM employees ORDER BY employee_id")
                    .fetch_all(&self.store.pool),
            )
            .map_err(storage)?;
        convert_all(rows)
    }
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

/// The attendance ledger in the `attendance_records` table.
#[derive(Debug, Clone)]
pub struct PgAttendanceStore {
    store: PgStore,
}

/// Attendance fields converted to their column types.
struct AttendanceColumns {
    break_minutes: i32,
    status: String,
    version: i64,
}

impl AttendanceColumns {
    fn of(record: &AttendanceRecord) -> HrmsResult<Self> {
        Ok(Self {
            break_minutes: to_column("break_minutes", record.break_minutes)?,
            status: to_text(&record.status)?,
            version: to_column("version", record.version)?,
        })
    }
}

impl AttendanceStore for PgAttendanceStore {
    fn find(&self, employee_id: &str, date: NaiveDate) -> HrmsResult<Option<AttendanceRecord>> {
        let row: Option<AttendanceRow> = self
            .store
            .block_on(
                sqlx::query_as(
                    "SELECT * FROM attendance_records WHERE employee_id = $1 AND date = $2",
                )
                .bind(employee_id)
                .bind(date)
                .fetch_optional(&self.store.pool),
            )
            .map_err(storage)?;
        row.map(AttendanceRecord::try_from).transpose()
    }

    fn find_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> HrmsResult<Vec<AttendanceRecord>> {
        let rows: Vec<AttendanceRow> = self
            .store
            .block_on(
                sqlx::query_as(
                    "SELECT * FROM attendance_records \
                     WHERE employee_id = $1 AND date BETWEEN $2 AND $3 ORDER BY date",
                )
                .bind(employee_id)
                .bind(start)
                .bind(end)
                .fetch_all(&self.store.pool),
            )
            .map_err(storage)?;
        convert_all(rows)
    }

    fn insert(&self, record: AttendanceRecord) -> HrmsResult<AttendanceRecord> {
        let columns = AttendanceColumns::of(&record)?;
        let result: Result<AttendanceRow, sqlx::Error> = self.store.block_on(
            sqlx::query_as(
                "INSERT INTO attendance_records (id, employee_id, date, clock_in, clock_out, \
                 break_minutes, total_hours, status, notes, version) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 1) RETURNING *",
            )
            .bind(record.id)
            .bind(&record.employee_id)
            .bind(record.date)
            .bind(record.clock_in)
            .bind(record.clock_out)
            .bind(columns.break_minutes)
            .bind(record.total_hours)
            .bind(columns.status)
            .bind(&record.notes)
            .fetch_one(&self.store.pool),
        );
        match result {
            Ok(row) => AttendanceRecord::try_from(row),
            Err(err) if is_unique_violation(&err) => Err(HrmsError::Conflict {
                message: format!(
                    "attendance for {} on {} already exists",
                    record.employee_id, record.date
                ),
            }),
            Err(err) => Err(storage(err)),
        }
    }

    fn update(&self, record: AttendanceRecord) -> HrmsResult<AttendanceRecord> {
        let columns = AttendanceColumns::of(&record)?;
        let row: Option<AttendanceRow> = self
            .store
            .block_on(
                sqlx::query_as(
                    "UPDATE attendance_records SET clock_in = $3, clock_out = $4, \
                     break_minutes = $5, total_hours = $6, status = $7, notes = $8, \
                     version = version + 1 \
                     WHERE employee_id = $1 AND date = $2 AND version = $9 \
                     RETURNING *",
                )
                .bind(&record.employee_id)
                .bind(record.date)
                .bind(record.clock_in)
                .bind(record.clock_out)
                .bind(columns.break_minutes)
                .bind(record.total_hours)
                .bind(columns.status)
                .bind(&record.notes)
                .bind(columns.version)
                .fetch_optional(&self.store.pool),
            )
            .map_err(storage)?;
        if let Some(row) = row {
            return AttendanceRecord::try_from(row);
        }
        match self.find(&record.employee_id, record.date)? {
            None => Err(HrmsError::not_found(
                "attendance record",
                format!("{} on {}", record.employee_id, record.date),
            )),
            Some(_) => Err(HrmsError::Conflict {
                message: format!(
                    "attendance for {} on {} was modified concurrently",
                    record.employee_id, record.date
                ),
            }),
        }
    }

    fn upsert(&self, record: AttendanceRecord) -> HrmsResult<AttendanceRecord> {
        let columns = AttendanceColumns::of(&record)?;
        let row: AttendanceRow = self
            .store
            .block_on(
                sqlx::query_as(
                    "INSERT INTO attendance_records (id, employee_id, date, clock_in, clock_out, \
                     break_minutes, total_hours, status, notes, version) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 1) \
                     ON CONFLICT (employee_id, date) DO UPDATE SET \
                     clock_in = EXCLUDED.clock_in, clock_out = EXCLUDED.clock_out, \
                     break_minutes = EXCLUDED.break_minutes, \
                     total_hours = EXCLUDED.total_hours, status = EXCLUDED.status, \
                     notes = EXCLUDED.notes, version = attendance_records.version + 1 \
                     RETURNING *",
                )
                .bind(record.id)
                .bind(&record.employee_id)
                .bind(record.date)
                .bind(record.clock_in)
                .bind(record.clock_out)
                .bind(columns.break_minutes)
                .bind(record.total_hours)
                .bind(columns.status)
                .bind(&record.notes)
                .fetch_one(&self.store.pool),
            )
            .map_err(storage)?;
        AttendanceRecord::try_from(row)
    }
}

// ---------------------------------------------------------------------------
// Leave
// ---------------------------------------------------------------------------

/// Leave applications in the `leave_applications` table.
#[derive(Debug, Clone)]
pub struct PgLeaveStore {
    store: PgStore,
}

impl LeaveStore for PgLeaveStore {
    fn insert(&self, application: LeaveApplication) -> HrmsResult<()> {
        let leave_type = to_text(&application.leave_type)?;
        let status = to_text(&application.status)?;
        let days_requested: i32 = to_column("days_requested", application.days_requested)?;
        let result = self.store.block_on(
            sqlx::query(
                "INSERT INTO leave_applications (id, employee_id, leave_type, start_date, \
                 end_date, days_requested, reason, status, approved_by, approved_at, \
                 comments, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            )
            .bind(&application.id)
            .bind(&application.employee_id)
            .bind(leave_type)
            .bind(application.start_date)
            .bind(application.end_date)
            .bind(days_requested)
            .bind(&application.reason)
            .bind(status)
            .bind(&application.approved_by)
            .bind(application.approved_at)
            .bind(&application.comments)
            .bind(application.created_at)
            .execute(&self.store.pool),
        );
        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(HrmsError::Conflict {
                message: format!("leave application {} already exists", application.id),
            }),
            Err(err) => Err(storage(err)),
        }
    }

    fn get(&self, id: &str) -> HrmsResult<Option<LeaveApplication>> {
        let row: Option<LeaveRow> = self
            .store
            .block_on(
                sqlx::query_as("SELECT * FROM leave_applications WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.store.pool),
            )
            .map_err(storage)?;
        row.map(LeaveApplication::try_from).transpose()
    }

    fn transition(
        &self,
        updated: LeaveApplication,
        expected: LeaveStatus,
    ) -> HrmsResult<TransitionOutcome<LeaveStatus>> {
        let status = to_text(&updated.status)?;
        let expected_text = to_text(&expected)?;
        let result = self
            .store
            .block_on(
                sqlx::query(
                    "UPDATE leave_applications \
                     SET status = $2, approved_by = $3, approved_at = $4, comments = $5 \
                     WHERE id = $1 AND status = $6",
                )
                .bind(&updated.id)
                .bind(status)
                .bind(&updated.approved_by)
                .bind(updated.approved_at)
                .bind(&updated.comments)
                .bind(expected_text)
                .execute(&self.store.pool),
            )
            .map_err(storage)?;
        if result.rows_affected() > 0 {
            return Ok(TransitionOutcome::Applied);
        }

        let current: Option<String> = self
            .store
            .block_on(
                sqlx::query_scalar("SELECT status FROM leave_applications WHERE id = $1")
                    .bind(&updated.id)
                    .fetch_optional(&self.store.pool),
            )
            .map_err(storage)?;
        match current {
            None => Err(HrmsError::not_found("leave application", updated.id)),
            Some(current) => Ok(TransitionOutcome::Stale {
                current: from_text("leave status", current)?,
            }),
        }
    }

    fn list_for_employee(&self, employee_id: &str) -> HrmsResult<Vec<LeaveApplication>> {
        let rows: Vec<LeaveRow> = self
            .store
            .block_on(
                sqlx::query_as(
                    "SELECT * FROM leave_applications WHERE employee_id = $1 \
                     ORDER BY created_at, id",
                )
                .bind(employee_id)
                .fetch_all(&self.store.pool),
            )
            .map_err(storage)?;
        convert_all(rows)
    }

    fn list_by_status(&self, status: LeaveStatus) -> HrmsResult<Vec<LeaveApplication>> {
        let status = to_text(&status)?;
        let rows: Vec<LeaveRow> = self
            .store
            .block_on(
                sqlx::query_as(
                    "SELECT * FROM leave_applications WHERE status = $1 ORDER BY created_at, id",
                )
                .bind(status)
                .fetch_all(&self.store.pool),
            )
            .map_err(storage)?;
        convert_all(rows)
    }

    fn count_approved_by_type(&self, employee_id: &str) -> HrmsResult<LeaveBalance> {
        let counts: Vec<(String, i64)> = self
            .store
            .block_on(
                sqlx::query_as(
                    "SELECT leave_type, COUNT(*) FROM leave_applications \
                     WHERE employee_id = $1 AND status = 'approved' GROUP BY leave_type",
                )
                .bind(employee_id)
                .fetch_all(&self.store.pool),
            )
            .map_err(storage)?;

        let mut balance: LeaveBalance = LeaveType::ALL.iter().map(|kind| (*kind, 0)).collect();
        for (leave_type, count) in counts {
            let leave_type: LeaveType = from_text("leave type", leave_type)?;
            balance.insert(leave_type, to_column("approved count", count)?);
        }
        Ok(balance)
    }
}

// ---------------------------------------------------------------------------
// Payroll
// ---------------------------------------------------------------------------

/// Payroll records in the `payroll_records` table.
#[derive(Debug, Clone)]
pub struct PgPayrollStore {
    store: PgStore,
}

impl PayrollStore for PgPayrollStore {
    fn save_draft(&self, record: PayrollRecord) -> HrmsResult<PayrollRecord> {
        // The conflict arm only fires on a draft row; anything else returns
        // no row and is reported as immutable below.
        let row: Option<PayrollRow> = self
            .store
            .block_on(
                sqlx::query_as(
                    "INSERT INTO payroll_records (id, employee_id, pay_period_start, \
                     pay_period_end, basic_salary, allowances, overtime_amount, \
                     absence_deduction, gross_pay, tax_deduction, other_deductions, net_pay, \
                     status, created_at, updated_at) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'draft', $13, $14) \
                     ON CONFLICT (employee_id, pay_period_start, pay_period_end) DO UPDATE SET \
                     basic_salary = EXCLUDED.basic_salary, allowances = EXCLUDED.allowances, \
                     overtime_amount = EXCLUDED.overtime_amount, \
                     absence_deduction = EXCLUDED.absence_deduction, \
                     gross_pay = EXCLUDED.gross_pay, tax_deduction = EXCLUDED.tax_deduction, \
                     other_deductions = EXCLUDED.other_deductions, net_pay = EXCLUDED.net_pay, \
                     updated_at = EXCLUDED.updated_at \
                     WHERE payroll_records.status = 'draft' \
                     RETURNING *",
                )
                .bind(record.id)
                .bind(&record.employee_id)
                .bind(record.pay_period_start)
                .bind(record.pay_period_end)
                .bind(record.basic_salary)
                .bind(record.allowances)
                .bind(record.overtime_amount)
                .bind(record.absence_deduction)
                .bind(record.gross_pay)
                .bind(record.tax_deduction)
                .bind(record.other_deductions)
                .bind(record.net_pay)
                .bind(record.created_at)
                .bind(record.updated_at)
                .fetch_optional(&self.store.pool),
            )
            .map_err(storage)?;
        if let Some(row) = row {
            return PayrollRecord::try_from(row);
        }

        let stored = self
            .find_for_period(&record.employee_id, &record.pay_period())?
            .ok_or_else(|| HrmsError::Storage {
                message: format!(
                    "payroll draft for {} was neither written nor found",
                    record.employee_id
                ),
            })?;
        Err(HrmsError::ImmutableRecord {
            id: stored.id.to_string(),
            status: stored.status.to_string(),
        })
    }

    fn get(&self, id: Uuid) -> HrmsResult<Option<PayrollRecord>> {
        let row: Option<PayrollRow> = self
            .store
            .block_on(
                sqlx::query_as("SELECT * FROM payroll_records WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.store.pool),
            )
            .map_err(storage)?;
        row.map(PayrollRecord::try_from).transpose()
    }

    fn find_for_period(
        &self,
        employee_id: &str,
        period: &PayPeriod,
    ) -> HrmsResult<Option<PayrollRecord>> {
        let row: Option<PayrollRow> = self
            .store
            .block_on(
                sqlx::query_as(
                    "SELECT * FROM payroll_records WHERE employee_id = $1 \
                     AND pay_period_start = $2 AND pay_period_end = $3",
                )
                .bind(employee_id)
                .bind(period.start_date)
                .bind(period.end_date)
                .fetch_optional(&self.store.pool),
            )
            .map_err(storage)?;
        row.map(PayrollRecord::try_from).transpose()
    }

    fn transition(
        &self,
        updated: PayrollRecord,
        expected: PayrollStatus,
    ) -> HrmsResult<TransitionOutcome<PayrollStatus>> {
        // Amounts are frozen once a record leaves draft; only the status moves.
        let status = to_text(&updated.status)?;
        let expected_text = to_text(&expected)?;
        let result = self
            .store
            .block_on(
                sqlx::query(
                    "UPDATE payroll_records SET status = $2, updated_at = $3 \
                     WHERE id = $1 AND status = $4",
                )
                .bind(updated.id)
                .bind(status)
                .bind(updated.updated_at)
                .bind(expected_text)
                .execute(&self.store.pool),
            )
            .map_err(storage)?;
        if result.rows_affected() > 0 {
            return Ok(TransitionOutcome::Applied);
        }

        let current: Option<String> = self
            .store
            .block_on(
                sqlx::query_scalar("SELECT status FROM payroll_records WHERE id = $1")
                    .bind(updated.id)
                    .fetch_optional(&self.store.pool),
            )
            .map_err(storage)?;
        match current {
            None => Err(HrmsError::not_found("payroll record", updated.id.to_string())),
            Some(current) => Ok(TransitionOutcome::Stale {
                current: from_text("payroll status", current)?,
            }),
        }
    }

    fn list_for_employee(&self, employee_id: &str) -> HrmsResult<Vec<PayrollRecord>> {
        let rows: Vec<PayrollRow> = self
            .store
            .block_on(
                sqlx::query_as(
                    "SELECT * FROM payroll_records WHERE employee_id = $1 \
                     ORDER BY pay_period_start DESC",
                )
                .bind(employee_id)
                .fetch_all(&self.store.pool),
            )
            .map_err(storage)?;
        convert_all(rows)
    }
}
