//! The per-employee, per-year leave balance ledger.
//!
//! Every mutation either succeeds atomically or leaves the ledger
//! untouched; `current` is always derived, never stored.

use chrono::{DateTime, Utc};
use kadro_shared::{EmployeeId, LeaveDays};
use serde::{Deserialize, Serialize};

use crate::ledger::error::LedgerError;
use crate::ledger::types::{
    AccrualPeriod, AdjustmentRecord, BalanceSnapshot, TypeBalance, TypeMarkers,
};
use crate::policy::registry::PolicyRegistry;
use crate::policy::types::{LeaveType, PerLeaveType};

/// One employee's leave balances for one calendar year.
///
/// Mutation goes through the operation methods only; the stored
/// components stay non-negative where the operation demands it, and the
/// spendable balance is recomputed from them on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceLedger {
    employee_id: EmployeeId,
    year: i32,
    balances: PerLeaveType<TypeBalance>,
    markers: PerLeaveType<TypeMarkers>,
    adjustments: Vec<AdjustmentRecord>,
    is_locked: bool,
}

impl BalanceLedger {
    /// Creates a first-year ledger seeded with each active policy's
    /// default opening balance.
    #[must_use]
    pub fn opened(employee_id: EmployeeId, year: i32, registry: &PolicyRegistry) -> Self {
        let balances = PerLeaveType::from_fn(|code| {
            let policy = registry.get(code);
            TypeBalance {
                opening: if policy.is_active {
                    policy.default_balance
                } else {
                    LeaveDays::ZERO
                },
                ..TypeBalance::default()
            }
        });
        Self {
            employee_id,
            year,
            balances,
            markers: PerLeaveType::default(),
            adjustments: Vec::new(),
            is_locked: false,
        }
    }

    /// Creates a subsequent-year ledger whose opening balances are the
    /// prior year's carry-forward amounts.
    #[must_use]
    pub fn opened_from_rollover(
        employee_id: EmployeeId,
        year: i32,
        carried: &PerLeaveType<LeaveDays>,
    ) -> Self {
        let balances = PerLeaveType::from_fn(|code| TypeBalance {
            opening: *carried.get(code),
            ..TypeBalance::default()
        });
        let markers = PerLeaveType::from_fn(|code| TypeMarkers {
            carried_in: *carried.get(code),
            ..TypeMarkers::default()
        });
        Self {
            employee_id,
            year,
            balances,
            markers,
            adjustments: Vec::new(),
            is_locked: false,
        }
    }

    /// Creates an empty, all-zero ledger.
    #[must_use]
    pub fn zeroed(employee_id: EmployeeId, year: i32) -> Self {
        Self {
            employee_id,
            year,
            balances: PerLeaveType::default(),
            markers: PerLeaveType::default(),
            adjustments: Vec::new(),
            is_locked: false,
        }
    }

    /// The employee this ledger belongs to.
    #[must_use]
    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    /// The calendar year of this ledger.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Whether the year has been closed by rollover.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    /// The stored components for one leave type.
    #[must_use]
    pub fn balance(&self, code: LeaveType) -> &TypeBalance {
        self.balances.get(code)
    }

    /// The spendable balance for one leave type, derived on demand.
    #[must_use]
    pub fn current(&self, code: LeaveType) -> LeaveDays {
        self.balances.get(code).current()
    }

    /// The administrative adjustment audit log, oldest first.
    #[must_use]
    pub fn adjustments(&self) -> &[AdjustmentRecord] {
        &self.adjustments
    }

    /// The accrual/carry markers for one leave type.
    #[must_use]
    pub fn markers(&self, code: LeaveType) -> &TypeMarkers {
        self.markers.get(code)
    }

    /// Point-in-time view of every type's balance.
    #[must_use]
    pub fn snapshot(&self) -> BalanceSnapshot {
        BalanceSnapshot {
            employee_id: self.employee_id,
            year: self.year,
            is_locked: self.is_locked,
            balances: PerLeaveType::from_fn(|code| self.balances.get(code).view()),
        }
    }

    fn ensure_unlocked(&self) -> Result<(), LedgerError> {
        if self.is_locked {
            return Err(LedgerError::LedgerLocked { year: self.year });
        }
        Ok(())
    }

    /// Consumes days from a type's balance.
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::InsufficientBalance`] when the current
    /// balance cannot cover `days`, [`LedgerError::InvalidAmount`] when
    /// `days` is not positive, or [`LedgerError::LedgerLocked`].
    pub fn debit(&mut self, code: LeaveType, days: LeaveDays) -> Result<(), LedgerError> {
        self.ensure_unlocked()?;
        if !days.is_positive() {
            return Err(LedgerError::InvalidAmount { amount: days });
        }
        let available = self.current(code);
        if available < days {
            return Err(LedgerError::InsufficientBalance {
                leave_type: code,
                requested: days,
                available,
            });
        }
        self.balances.get_mut(code).used += days;
        Ok(())
    }

    /// Restores previously consumed days, flooring `used` at zero.
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::InvalidAmount`] when `days` is not
    /// positive, or [`LedgerError::LedgerLocked`].
    pub fn credit(&mut self, code: LeaveType, days: LeaveDays) -> Result<(), LedgerError> {
        self.ensure_unlocked()?;
        if !days.is_positive() {
            return Err(LedgerError::InvalidAmount { amount: days });
        }
        let balance = self.balances.get_mut(code);
        balance.used = balance.used.saturating_sub(days);
        Ok(())
    }

    /// Applies a signed administrative correction with an audit trail.
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::AdjustmentReasonRequired`] on a blank
    /// reason, [`LedgerError::InvalidAmount`] on a zero delta,
    /// [`LedgerError::AdjustmentWouldOverdraw`] when the correction would
    /// drive the balance negative, or [`LedgerError::LedgerLocked`].
    pub fn adjust(
        &mut self,
        code: LeaveType,
        delta: LeaveDays,
        reason: &str,
        actor: EmployeeId,
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        self.ensure_unlocked()?;
        if reason.trim().is_empty() {
            return Err(LedgerError::AdjustmentReasonRequired);
        }
        if delta.is_zero() {
            return Err(LedgerError::InvalidAmount { amount: delta });
        }
        let resulting = self.current(code) + delta;
        if resulting.is_negative() {
            return Err(LedgerError::AdjustmentWouldOverdraw {
                leave_type: code,
                resulting,
            });
        }
        self.balances.get_mut(code).adjusted += delta;
        self.adjustments.push(AdjustmentRecord {
            leave_type: code,
            delta,
            reason: reason.trim().to_string(),
            actor,
            at,
        });
        Ok(())
    }

    /// Applies one accrual period, capped and idempotent.
    ///
    /// Returns `Ok(true)` when the period was applied and `Ok(false)`
    /// when it was already accrued (or the rate is not positive).
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::LedgerLocked`] on a closed year.
    pub fn accrue(
        &mut self,
        code: LeaveType,
        period: AccrualPeriod,
        rate: LeaveDays,
        cap: LeaveDays,
    ) -> Result<bool, LedgerError> {
        self.ensure_unlocked()?;
        if !rate.is_positive() {
            return Ok(false);
        }
        let markers = self.markers.get_mut(code);
        if markers.last_accrual.is_some_and(|last| last >= period) {
            return Ok(false);
        }
        let balance = self.balances.get_mut(code);
        balance.accrued = (balance.accrued + rate).min(cap);
        self.markers.get_mut(code).last_accrual = Some(period);
        Ok(true)
    }

    /// Closes the year: computes each type's carry-forward, lapses the
    /// remainder, and locks the ledger.
    ///
    /// Returns the carried amount per type so the caller can deposit it
    /// into the next year's ledger.
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::LedgerLocked`] when the year is already
    /// closed; a second rollover must not lapse anything twice.
    pub fn rollover(
        &mut self,
        registry: &PolicyRegistry,
    ) -> Result<PerLeaveType<LeaveDays>, LedgerError> {
        self.ensure_unlocked()?;
        let carried = PerLeaveType::from_fn(|code| {
            let current = self.balances.get(code).current();
            let carry = registry.get(code).carry_forward.carry_from(current);
            let lapse = (current - carry).max(LeaveDays::ZERO);
            if lapse.is_positive() {
                self.balances.get_mut(code).lapsed += lapse;
            }
            carry
        });
        self.is_locked = true;
        Ok(carried)
    }

    /// Deposits prior-year carry into an already existing ledger.
    ///
    /// Used when the next year's ledger was created lazily before the
    /// rollover ran; the carry lands in the `carry_forward` component
    /// rather than rewriting `opening`.
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::LedgerLocked`] on a closed year.
    pub fn receive_carry(
        &mut self,
        carried: &PerLeaveType<LeaveDays>,
    ) -> Result<(), LedgerError> {
        self.ensure_unlocked()?;
        for code in LeaveType::ALL {
            let amount = *carried.get(code);
            if amount.is_positive() {
                self.balances.get_mut(code).carry_forward += amount;
                self.markers.get_mut(code).carried_in += amount;
            }
        }
        Ok(())
    }

    /// Lapses the unused portion of the carried-in days for one type.
    ///
    /// Carried days are treated as consumed first, so the unused portion
    /// is the carry-in minus days used so far, clamped to what the
    /// balance still holds. Returns the lapsed amount; a second call is a
    /// no-op returning zero.
    ///
    /// # Errors
    ///
    /// Fails with [`LedgerError::LedgerLocked`] on a closed year.
    pub fn expire_carry(&mut self, code: LeaveType) -> Result<LeaveDays, LedgerError> {
        self.ensure_unlocked()?;
        let markers = self.markers.get(code);
        if markers.carry_expired || !markers.carried_in.is_positive() {
            return Ok(LeaveDays::ZERO);
        }
        let balance = self.balances.get(code);
        let unused = markers.carried_in.saturating_sub(balance.used);
        let lapse = unused.min(balance.current().max(LeaveDays::ZERO));
        if lapse.is_positive() {
            self.balances.get_mut(code).lapsed += lapse;
        }
        self.markers.get_mut(code).carry_expired = true;
        Ok(lapse)
    }
}
