//! Externally triggered batch operations.
//!
//! Monthly accrual, year-end rollover, pending-request expiry, and
//! carry-forward expiry. There is no internal timer; the host invokes
//! each run with an explicit period or instant, which also makes the
//! batches deterministic under test. Writes go through the same
//! optimistic-commit contract as the online operations, one employee at
//! a time.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use tracing::{info, warn};

use kadro_core::ledger::{AccrualPeriod, BalanceLedger, LedgerError, LedgerKey};
use kadro_core::policy::{LeaveType, PerLeaveType, PolicyRegistry};
use kadro_core::workflow::WorkflowService;
use kadro_shared::{EmployeeId, LeaveDays, LeaveRequestId};

use crate::notify::{LeaveNotification, NotificationSender};
use crate::repositories::{
    ensure_ledger, ensure_ledger_for_key, EmployeeDirectory, LedgerStore, RequestStore,
};

/// Outcome counts of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Entries the run changed.
    pub processed: usize,
    /// Entries the run inspected and left untouched.
    pub skipped: usize,
    /// Entries the run could not complete.
    pub failed: usize,
}

/// Batch driver over the shared stores.
pub struct LeaveScheduler {
    registry: Arc<PolicyRegistry>,
    directory: Arc<EmployeeDirectory>,
    ledgers: Arc<LedgerStore>,
    requests: Arc<RequestStore>,
    notifier: Arc<dyn NotificationSender>,
    max_commit_retries: u32,
}

impl LeaveScheduler {
    /// Creates a scheduler over shared stores.
    #[must_use]
    pub fn new(
        registry: Arc<PolicyRegistry>,
        directory: Arc<EmployeeDirectory>,
        ledgers: Arc<LedgerStore>,
        requests: Arc<RequestStore>,
        notifier: Arc<dyn NotificationSender>,
        max_commit_retries: u32,
    ) -> Self {
        Self {
            registry,
            directory,
            ledgers,
            requests,
            notifier,
            max_commit_retries,
        }
    }

    fn commit_attempts(&self) -> u32 {
        self.max_commit_retries.saturating_add(1)
    }

    /// Grants one month of accrual to every active employee, for every
    /// active policy that accrues.
    ///
    /// Idempotent per `(employee, type, period)`: the ledger's per-type
    /// last-accrual marker makes a re-run of the same or an older period
    /// a no-op, counted as skipped.
    pub fn run_accrual(&self, period: AccrualPeriod) -> BatchSummary {
        let accruing: Vec<(LeaveType, LeaveDays, LeaveDays)> = LeaveType::ALL
            .iter()
            .map(|&code| self.registry.get(code))
            .filter(|policy| policy.is_active && policy.accrues())
            .map(|policy| (policy.code, policy.accrual_rate, policy.max_accrual))
            .collect();

        let mut summary = BatchSummary::default();
        for employee in self.directory.active() {
            match self.accrue_employee(employee.id, period, &accruing) {
                Ok(true) => summary.processed += 1,
                Ok(false) | Err(LedgerError::LedgerLocked { .. }) => summary.skipped += 1,
                Err(error) => {
                    warn!(employee_id = %employee.id, %error, "Accrual failed");
                    summary.failed += 1;
                }
            }
        }
        info!(
            year = period.year,
            month = period.month,
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            "Accrual run finished"
        );
        summary
    }

    fn accrue_employee(
        &self,
        employee_id: EmployeeId,
        period: AccrualPeriod,
        accruing: &[(LeaveType, LeaveDays, LeaveDays)],
    ) -> Result<bool, LedgerError> {
        let key = LedgerKey::new(employee_id, period.year);
        for _ in 0..self.commit_attempts() {
            let (version, mut ledger) =
                ensure_ledger(&self.ledgers, &self.registry, employee_id, period.year);
            let mut applied = false;
            for &(code, rate, cap) in accruing {
                applied |= ledger.accrue(code, period, rate, cap)?;
            }
            if !applied {
                return Ok(false);
            }
            if self.ledgers.try_commit(&key, version, ledger, || {}) {
                return Ok(true);
            }
        }
        Err(LedgerError::ConcurrencyConflict)
    }

    /// Closes every ledger of `year` and deposits each carry into the
    /// following year.
    ///
    /// Already-locked ledgers count as skipped, so a re-run lapses
    /// nothing twice.
    pub fn run_rollover(&self, year: i32) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for key in self.ledgers.keys_for_year(year) {
            match self.rollover_employee(&key) {
                Ok(true) => summary.processed += 1,
                Ok(false) => summary.skipped += 1,
                Err(error) => {
                    warn!(employee_id = %key.employee_id, year, %error, "Rollover failed");
                    summary.failed += 1;
                }
            }
        }
        info!(
            year,
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            "Rollover run finished"
        );
        summary
    }

    fn rollover_employee(&self, key: &LedgerKey) -> Result<bool, LedgerError> {
        let Some(carried) = self.close_year(key)? else {
            return Ok(false);
        };
        let next_key = LedgerKey::new(key.employee_id, key.year + 1);
        self.deposit_carry(next_key, &carried)?;
        Ok(true)
    }

    fn close_year(
        &self,
        key: &LedgerKey,
    ) -> Result<Option<PerLeaveType<LeaveDays>>, LedgerError> {
        for _ in 0..self.commit_attempts() {
            let Some((version, mut ledger)) = self.ledgers.snapshot(key) else {
                return Ok(None);
            };
            if ledger.is_locked() {
                return Ok(None);
            }
            let carried = ledger.rollover(&self.registry)?;
            if self.ledgers.try_commit(key, version, ledger, || {}) {
                return Ok(Some(carried));
            }
        }
        Err(LedgerError::ConcurrencyConflict)
    }

    fn deposit_carry(
        &self,
        key: LedgerKey,
        carried: &PerLeaveType<LeaveDays>,
    ) -> Result<(), LedgerError> {
        let opened = BalanceLedger::opened_from_rollover(key.employee_id, key.year, carried);
        if self.ledgers.insert_if_absent(key, opened) {
            return Ok(());
        }
        // The next year already exists (created lazily by an early
        // request); the carry lands in its carry_forward component.
        for _ in 0..self.commit_attempts() {
            let Some((version, mut ledger)) = self.ledgers.snapshot(&key) else {
                return Err(LedgerError::ConcurrencyConflict);
            };
            ledger.receive_carry(carried)?;
            if self.ledgers.try_commit(&key, version, ledger, || {}) {
                return Ok(());
            }
        }
        Err(LedgerError::ConcurrencyConflict)
    }

    /// Auto-cancels every Pending request whose expiry deadline has
    /// passed, emitting a notification per cancellation.
    ///
    /// Each cancellation commits through the request's ledger cell, so
    /// an approval racing the sweep settles on exactly one outcome.
    pub fn run_expiry_sweep(&self, now: DateTime<Utc>) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for request_id in self.requests.pending_expired(now) {
            match self.expire_request(request_id, now) {
                Ok(true) => summary.processed += 1,
                Ok(false) => summary.skipped += 1,
                Err(error) => {
                    warn!(request_id = %request_id, %error, "Expiry sweep failed");
                    summary.failed += 1;
                }
            }
        }
        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            "Expiry sweep finished"
        );
        summary
    }

    fn expire_request(
        &self,
        request_id: LeaveRequestId,
        now: DateTime<Utc>,
    ) -> Result<bool, LedgerError> {
        for _ in 0..self.commit_attempts() {
            let Some(request) = self.requests.get(request_id) else {
                return Ok(false);
            };
            let Some(action) = WorkflowService::expire(&request, now) else {
                return Ok(false);
            };

            let key = LedgerKey::new(request.employee_id, request.ledger_year);
            let (version, ledger) = ensure_ledger_for_key(&self.ledgers, &self.registry, key);

            let mut updated = request;
            WorkflowService::apply_expiry(&mut updated, &action);

            let committed = self
                .ledgers
                .try_commit(&key, version, ledger, || self.requests.upsert(updated.clone()));
            if committed {
                info!(
                    request_id = %updated.id,
                    employee_id = %updated.employee_id,
                    "Pending request expired"
                );
                self.notifier.send(&LeaveNotification::from_request(&updated));
                return Ok(true);
            }
        }
        Err(LedgerError::ConcurrencyConflict)
    }

    /// Lapses the unused carried-in days of every ledger in `as_of`'s
    /// year, for types whose carry has an expiry window.
    ///
    /// A type's carry expires once `as_of` has passed month
    /// `expiry_months` of the ledger year. Carried days count as
    /// consumed before same-year accruals, so only the genuinely unused
    /// portion lapses.
    pub fn run_carry_expiry(&self, as_of: NaiveDate) -> BatchSummary {
        let expiring: Vec<(LeaveType, u32)> = LeaveType::ALL
            .iter()
            .map(|&code| self.registry.get(code))
            .filter(|policy| policy.carry_forward.allowed)
            .filter_map(|policy| {
                policy.carry_forward.expiry_months.map(|m| (policy.code, m))
            })
            .collect();

        let mut summary = BatchSummary::default();
        for key in self.ledgers.keys_for_year(as_of.year()) {
            match self.expire_carry_for(&key, as_of, &expiring) {
                Ok(true) => summary.processed += 1,
                Ok(false) | Err(LedgerError::LedgerLocked { .. }) => summary.skipped += 1,
                Err(error) => {
                    warn!(employee_id = %key.employee_id, %error, "Carry expiry failed");
                    summary.failed += 1;
                }
            }
        }
        info!(
            as_of = %as_of,
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            "Carry expiry run finished"
        );
        summary
    }

    fn expire_carry_for(
        &self,
        key: &LedgerKey,
        as_of: NaiveDate,
        expiring: &[(LeaveType, u32)],
    ) -> Result<bool, LedgerError> {
        for _ in 0..self.commit_attempts() {
            let Some((version, mut ledger)) = self.ledgers.snapshot(key) else {
                return Ok(false);
            };
            let mut lapsed_any = false;
            for &(code, months) in expiring {
                let Some(cutoff) = carry_cutoff(key.year, months) else {
                    continue;
                };
                if as_of < cutoff {
                    continue;
                }
                lapsed_any |= ledger.expire_carry(code)?.is_positive();
            }
            if !lapsed_any {
                return Ok(false);
            }
            if self.ledgers.try_commit(key, version, ledger, || {}) {
                return Ok(true);
            }
        }
        Err(LedgerError::ConcurrencyConflict)
    }
}

/// First day on which the carry of `year` counts as expired: the day
/// after month `months` of that year ends.
fn carry_cutoff(year: i32, months: u32) -> Option<NaiveDate> {
    let year_offset = i32::try_from(months / 12).ok()?;
    NaiveDate::from_ymd_opt(year + year_offset, months % 12 + 1, 1)
}
