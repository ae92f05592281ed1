//! Ledger domain types for per-employee, per-year balance accounting.

use chrono::{DateTime, Utc};
use kadro_shared::{EmployeeId, LeaveDays};
use serde::{Deserialize, Serialize};

use crate::policy::types::LeaveType;

/// Key of one ledger: an employee's balances for one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerKey {
    /// The employee the ledger belongs to.
    pub employee_id: EmployeeId,
    /// Calendar year of the ledger.
    pub year: i32,
}

impl LedgerKey {
    /// Creates a ledger key.
    #[must_use]
    pub fn new(employee_id: EmployeeId, year: i32) -> Self {
        Self { employee_id, year }
    }
}

/// A monthly accrual period, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccrualPeriod {
    /// Calendar year.
    pub year: i32,
    /// Month, 1-12.
    pub month: u32,
}

impl AccrualPeriod {
    /// Creates an accrual period.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

/// The stored components of one leave type's balance.
///
/// `current` is never stored; it is recomputed from the components on
/// every read, so the balance equation cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeBalance {
    /// Balance granted at the start of the year.
    pub opening: LeaveDays,
    /// Days added by the periodic accrual job.
    pub accrued: LeaveDays,
    /// Days consumed by approved requests.
    pub used: LeaveDays,
    /// Net administrative corrections.
    pub adjusted: LeaveDays,
    /// Days carried in from the prior year after this ledger was created.
    pub carry_forward: LeaveDays,
    /// Days forfeited (year-end remainder, expired carry).
    pub lapsed: LeaveDays,
}

impl TypeBalance {
    /// The spendable balance derived from the stored components.
    #[must_use]
    pub fn current(&self) -> LeaveDays {
        self.opening + self.accrued + self.adjusted + self.carry_forward
            - self.used
            - self.lapsed
    }

    /// Materializes the balance with `current` included, for reporting.
    #[must_use]
    pub fn view(&self) -> TypeBalanceView {
        TypeBalanceView {
            opening: self.opening,
            accrued: self.accrued,
            used: self.used,
            adjusted: self.adjusted,
            carry_forward: self.carry_forward,
            lapsed: self.lapsed,
            current: self.current(),
        }
    }
}

/// Per-type bookkeeping that sits outside the balance equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeMarkers {
    /// Last period the accrual job applied, for idempotent re-runs.
    pub last_accrual: Option<AccrualPeriod>,
    /// Total days carried in from the prior year, for expiry tracking.
    pub carried_in: LeaveDays,
    /// Whether the carried-in days have already been expired.
    pub carry_expired: bool,
}

/// One administrative balance correction, kept for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    /// The leave type adjusted.
    pub leave_type: LeaveType,
    /// Signed day delta applied to the `adjusted` component.
    pub delta: LeaveDays,
    /// Mandatory human-readable reason.
    pub reason: String,
    /// The administrator who made the correction.
    pub actor: EmployeeId,
    /// When the correction was made.
    pub at: DateTime<Utc>,
}

/// A leave type's balance with the derived `current` materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBalanceView {
    /// Balance granted at the start of the year.
    pub opening: LeaveDays,
    /// Days added by the periodic accrual job.
    pub accrued: LeaveDays,
    /// Days consumed by approved requests.
    pub used: LeaveDays,
    /// Net administrative corrections.
    pub adjusted: LeaveDays,
    /// Days carried in from the prior year after this ledger was created.
    pub carry_forward: LeaveDays,
    /// Days forfeited (year-end remainder, expired carry).
    pub lapsed: LeaveDays,
    /// Spendable balance derived from the components.
    pub current: LeaveDays,
}

/// Point-in-time view of a whole ledger, one entry per leave type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// The employee the snapshot belongs to.
    pub employee_id: EmployeeId,
    /// Calendar year of the snapshot.
    pub year: i32,
    /// Whether the year has been closed by rollover.
    pub is_locked: bool,
    /// Per-type balances with `current` materialized.
    pub balances: crate::policy::types::PerLeaveType<TypeBalanceView>,
}
