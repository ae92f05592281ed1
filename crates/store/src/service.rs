//! The leave service: every exposed operation of the module.
//!
//! Each mutating operation runs an optimistic commit loop: snapshot the
//! ledger cell, re-read the request, compute the mutation on copies,
//! and commit with a version compare-and-swap. A failed swap retries
//! from fresh state up to the configured bound, then surfaces
//! `ConcurrencyConflict`.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{info, warn};

use kadro_core::calendar;
use kadro_core::ledger::{BalanceSnapshot, LedgerError, LedgerKey};
use kadro_core::policy::{LeaveType, PolicyRegistry, PolicyService};
use kadro_core::workflow::{
    ApprovalRouter, Decision, DecisionAction, HalfDaySlot, HistoryEvent, LeaveRequest,
    RequestStatus, StageApproval, WorkflowError, WorkflowService,
};
use kadro_shared::{AppConfig, EmployeeId, LeaveDays, LeaveRequestId};

use crate::notify::{LeaveNotification, NotificationSender};
use crate::repositories::{ensure_ledger, EmployeeDirectory, LedgerStore, RequestStore};
use crate::scheduler::LeaveScheduler;

/// Input for submitting a new leave request.
#[derive(Debug, Clone)]
pub struct SubmitLeaveRequest {
    /// The requesting employee.
    pub employee_id: EmployeeId,
    /// The leave type to charge.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave, inclusive.
    pub end_date: NaiveDate,
    /// Present when requesting half a day.
    pub half_day: Option<HalfDaySlot>,
    /// The applicant's reason.
    pub reason: String,
    /// Opaque pointer to supporting documentation.
    pub documentation_ref: Option<String>,
}

/// The leave-ledger service facade.
pub struct LeaveService {
    registry: Arc<PolicyRegistry>,
    config: AppConfig,
    directory: Arc<EmployeeDirectory>,
    ledgers: Arc<LedgerStore>,
    requests: Arc<RequestStore>,
    notifier: Arc<dyn NotificationSender>,
}

impl LeaveService {
    /// Creates a service over the standard policy registry.
    #[must_use]
    pub fn new(config: AppConfig, notifier: Arc<dyn NotificationSender>) -> Self {
        Self::with_registry(PolicyRegistry::standard().clone(), config, notifier)
    }

    /// Creates a service over a custom policy registry.
    #[must_use]
    pub fn with_registry(
        registry: PolicyRegistry,
        config: AppConfig,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
            directory: Arc::new(EmployeeDirectory::new()),
            ledgers: Arc::new(LedgerStore::new()),
            requests: Arc::new(RequestStore::new()),
            notifier,
        }
    }

    /// The employee directory backing this service.
    #[must_use]
    pub fn directory(&self) -> &EmployeeDirectory {
        &self.directory
    }

    /// A scheduler sharing this service's stores.
    #[must_use]
    pub fn scheduler(&self) -> LeaveScheduler {
        LeaveScheduler::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.directory),
            Arc::clone(&self.ledgers),
            Arc::clone(&self.requests),
            Arc::clone(&self.notifier),
            self.config.store.max_commit_retries,
        )
    }

    fn commit_attempts(&self) -> u32 {
        self.config.store.max_commit_retries.saturating_add(1)
    }

    fn notify_terminal(&self, request: &LeaveRequest) {
        if request.status.is_terminal() {
            self.notifier.send(&LeaveNotification::from_request(request));
        }
    }

    /// Submits a new leave request.
    ///
    /// Validation order: directory lookup, policy eligibility, window
    /// and duration rules, overlap with live requests, then the balance
    /// check on the ledger snapshot the commit validates. Auto-workflow
    /// types debit immediately; everything else starts Pending with an
    /// expiry deadline.
    ///
    /// # Errors
    ///
    /// Any [`WorkflowError`]; nothing is persisted on failure.
    pub fn submit_request(
        &self,
        input: SubmitLeaveRequest,
    ) -> Result<LeaveRequest, WorkflowError> {
        let employee = self
            .directory
            .get(input.employee_id)
            .ok_or(WorkflowError::EmployeeNotFound(input.employee_id))?;
        if !employee.active {
            return Err(WorkflowError::EmployeeInactive(input.employee_id));
        }
        if input.reason.trim().is_empty() {
            return Err(WorkflowError::ReasonRequired);
        }

        let policy = self.registry.get_active(input.leave_type)?;
        let today = Utc::now().date_naive();
        PolicyService::validate_window(input.start_date, input.end_date)?;
        PolicyService::check_eligibility(policy, &employee, today)?;

        let total_days = calendar::total_leave_days(
            input.start_date,
            input.end_date,
            input.half_day.is_some(),
        );
        PolicyService::validate_request(
            policy,
            total_days,
            input.start_date,
            input.end_date,
            today,
            input.documentation_ref.is_some(),
        )?;

        let route = WorkflowService::initial_route(policy.approval_workflow);
        // Fail unroutable requests at submission rather than leaving a
        // Pending request nobody can ever decide.
        if route.status == RequestStatus::Pending {
            ApprovalRouter::resolve_approvers(
                route.stage,
                &employee,
                &self.directory.hr_staff(),
            )?;
        }

        let ledger_year = input.start_date.year();
        let key = LedgerKey::new(input.employee_id, ledger_year);

        for _ in 0..self.commit_attempts() {
            if let Some(other) = self.requests.find_live_overlap(
                input.employee_id,
                input.start_date,
                input.end_date,
                None,
            ) {
                return Err(WorkflowError::OverlappingRequest { other });
            }

            let (version, mut ledger) =
                ensure_ledger(&self.ledgers, &self.registry, input.employee_id, ledger_year);
            if ledger.is_locked() {
                return Err(LedgerError::LedgerLocked { year: ledger_year }.into());
            }
            let available = ledger.current(input.leave_type);
            if available < total_days {
                return Err(LedgerError::InsufficientBalance {
                    leave_type: input.leave_type,
                    requested: total_days,
                    available,
                }
                .into());
            }

            let now = Utc::now();
            let mut request = LeaveRequest {
                id: LeaveRequestId::new(),
                employee_id: input.employee_id,
                leave_type: input.leave_type,
                start_date: input.start_date,
                end_date: input.end_date,
                half_day: input.half_day,
                total_days,
                reason: input.reason.trim().to_string(),
                documentation_ref: input.documentation_ref.clone(),
                status: route.status,
                stage: route.stage,
                manager_approval: StageApproval::default(),
                hr_approval: StageApproval::default(),
                history: Vec::new(),
                expires_at: None,
                ledger_year,
                created_at: now,
                updated_at: now,
            };
            request.record_history(
                HistoryEvent::Applied,
                Some(input.employee_id),
                None,
                now,
            );

            if route.auto_debit {
                ledger.debit(input.leave_type, total_days)?;
                request.record_history(HistoryEvent::AutoApproved, None, None, now);
            } else {
                request.expires_at =
                    Some(now + chrono::Duration::days(self.config.workflow.pending_expiry_days));
            }

            let committed = self
                .ledgers
                .try_commit(&key, version, ledger, || self.requests.upsert(request.clone()));
            if committed {
                info!(
                    employee_id = %request.employee_id,
                    request_id = %request.id,
                    leave_type = %request.leave_type,
                    total_days = %request.total_days,
                    status = %request.status,
                    "Leave request submitted"
                );
                self.notify_terminal(&request);
                return Ok(request);
            }
        }

        warn!(employee_id = %input.employee_id, "Submit lost the commit race repeatedly");
        Err(LedgerError::ConcurrencyConflict.into())
    }

    /// Applies an approver's decision to a pending request.
    ///
    /// The balance is re-validated on the same snapshot the commit
    /// validates, so a concurrent approval consuming the balance forces
    /// a retry that observes the new state.
    ///
    /// # Errors
    ///
    /// Any [`WorkflowError`]; the finalizing debit and the request
    /// update land atomically or not at all.
    pub fn decide(
        &self,
        request_id: LeaveRequestId,
        actor_id: EmployeeId,
        decision: Decision,
        comments: Option<String>,
    ) -> Result<LeaveRequest, WorkflowError> {
        for _ in 0..self.commit_attempts() {
            let request = self
                .requests
                .get(request_id)
                .ok_or(WorkflowError::RequestNotFound(request_id))?;
            let employee = self
                .directory
                .get(request.employee_id)
                .ok_or(WorkflowError::EmployeeNotFound(request.employee_id))?;

            ApprovalRouter::authorize_decision(
                request.stage,
                actor_id,
                &employee,
                &self.directory.hr_staff(),
            )?;

            let workflow = self.registry.get(request.leave_type).approval_workflow;
            let action = WorkflowService::decide(
                &request,
                workflow,
                actor_id,
                decision,
                comments.clone(),
                Utc::now(),
            )?;

            let key = LedgerKey::new(request.employee_id, request.ledger_year);
            let (version, mut ledger) =
                ensure_ledger(&self.ledgers, &self.registry, request.employee_id, request.ledger_year);

            match &action {
                DecisionAction::Advance { .. } | DecisionAction::Finalize { .. } => {
                    let available = ledger.current(request.leave_type);
                    if available < request.total_days {
                        return Err(LedgerError::InsufficientBalance {
                            leave_type: request.leave_type,
                            requested: request.total_days,
                            available,
                        }
                        .into());
                    }
                }
                DecisionAction::Reject { .. } => {}
            }
            if let DecisionAction::Finalize { debit, .. } = &action {
                ledger.debit(request.leave_type, *debit)?;
            }

            let mut updated = request;
            WorkflowService::apply_decision(&mut updated, &action);

            let committed = self
                .ledgers
                .try_commit(&key, version, ledger, || self.requests.upsert(updated.clone()));
            if committed {
                info!(
                    request_id = %updated.id,
                    actor_id = %actor_id,
                    status = %updated.status,
                    stage = %updated.stage,
                    "Leave request decided"
                );
                self.notify_terminal(&updated);
                return Ok(updated);
            }
        }

        warn!(request_id = %request_id, "Decision lost the commit race repeatedly");
        Err(LedgerError::ConcurrencyConflict.into())
    }

    /// Cancels a Pending or Approved request.
    ///
    /// Cancelling an Approved request credits `total_days` back to the
    /// same type and year; cancelling a Pending request only changes
    /// status. The owner or an hr/admin actor may cancel.
    ///
    /// # Errors
    ///
    /// Any [`WorkflowError`].
    pub fn cancel(
        &self,
        request_id: LeaveRequestId,
        actor_id: EmployeeId,
        reason: &str,
    ) -> Result<LeaveRequest, WorkflowError> {
        let actor = self
            .directory
            .get(actor_id)
            .ok_or(WorkflowError::EmployeeNotFound(actor_id))?;

        for _ in 0..self.commit_attempts() {
            let request = self
                .requests
                .get(request_id)
                .ok_or(WorkflowError::RequestNotFound(request_id))?;
            ApprovalRouter::authorize_cancellation(request.employee_id, actor_id, actor.role)?;

            let action = WorkflowService::cancel(&request, actor_id, reason, Utc::now())?;

            let key = LedgerKey::new(request.employee_id, request.ledger_year);
            let (version, mut ledger) =
                ensure_ledger(&self.ledgers, &self.registry, request.employee_id, request.ledger_year);
            if let Some(refund) = action.refund {
                ledger.credit(request.leave_type, refund)?;
            }

            let mut updated = request;
            WorkflowService::apply_cancel(&mut updated, &action);

            let committed = self
                .ledgers
                .try_commit(&key, version, ledger, || self.requests.upsert(updated.clone()));
            if committed {
                info!(
                    request_id = %updated.id,
                    actor_id = %actor_id,
                    refunded = action.refund.is_some(),
                    "Leave request cancelled"
                );
                self.notify_terminal(&updated);
                return Ok(updated);
            }
        }

        warn!(request_id = %request_id, "Cancellation lost the commit race repeatedly");
        Err(LedgerError::ConcurrencyConflict.into())
    }

    /// The requesting employee retracts their own Pending request.
    ///
    /// # Errors
    ///
    /// Any [`WorkflowError`]; no ledger effect, a withdrawn request was
    /// never debited.
    pub fn withdraw(
        &self,
        request_id: LeaveRequestId,
        employee_id: EmployeeId,
    ) -> Result<LeaveRequest, WorkflowError> {
        for _ in 0..self.commit_attempts() {
            let request = self
                .requests
                .get(request_id)
                .ok_or(WorkflowError::RequestNotFound(request_id))?;
            ApprovalRouter::authorize_withdrawal(request.employee_id, employee_id)?;

            let action = WorkflowService::withdraw(&request, employee_id, Utc::now())?;

            let key = LedgerKey::new(request.employee_id, request.ledger_year);
            let (version, ledger) =
                ensure_ledger(&self.ledgers, &self.registry, request.employee_id, request.ledger_year);

            let mut updated = request;
            WorkflowService::apply_withdraw(&mut updated, &action);

            let committed = self
                .ledgers
                .try_commit(&key, version, ledger, || self.requests.upsert(updated.clone()));
            if committed {
                info!(request_id = %updated.id, "Leave request withdrawn");
                self.notify_terminal(&updated);
                return Ok(updated);
            }
        }

        warn!(request_id = %request_id, "Withdrawal lost the commit race repeatedly");
        Err(LedgerError::ConcurrencyConflict.into())
    }

    /// The employee's balance snapshot for a year, creating the ledger
    /// lazily on first access.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::EmployeeNotFound`] for an unknown employee.
    pub fn get_balance(
        &self,
        employee_id: EmployeeId,
        year: i32,
    ) -> Result<BalanceSnapshot, WorkflowError> {
        self.directory
            .get(employee_id)
            .ok_or(WorkflowError::EmployeeNotFound(employee_id))?;
        let (_, ledger) = ensure_ledger(&self.ledgers, &self.registry, employee_id, year);
        Ok(ledger.snapshot())
    }

    /// Applies an administrative correction to the current year's
    /// balance, with a mandatory reason and an audit record.
    ///
    /// # Errors
    ///
    /// Any [`WorkflowError`]; only hr/admin actors are authorized.
    pub fn adjust_balance(
        &self,
        employee_id: EmployeeId,
        leave_type: LeaveType,
        delta: LeaveDays,
        reason: &str,
        actor_id: EmployeeId,
    ) -> Result<BalanceSnapshot, WorkflowError> {
        let actor = self
            .directory
            .get(actor_id)
            .ok_or(WorkflowError::EmployeeNotFound(actor_id))?;
        ApprovalRouter::authorize_adjustment(actor_id, actor.role)?;
        self.directory
            .get(employee_id)
            .ok_or(WorkflowError::EmployeeNotFound(employee_id))?;

        let year = Utc::now().year();
        let key = LedgerKey::new(employee_id, year);

        for _ in 0..self.commit_attempts() {
            let (version, mut ledger) =
                ensure_ledger(&self.ledgers, &self.registry, employee_id, year);
            ledger.adjust(leave_type, delta, reason, actor_id, Utc::now())?;

            if self.ledgers.try_commit(&key, version, ledger.clone(), || {}) {
                info!(
                    employee_id = %employee_id,
                    leave_type = %leave_type,
                    delta = %delta,
                    actor_id = %actor_id,
                    "Balance adjusted"
                );
                return Ok(ledger.snapshot());
            }
        }

        warn!(employee_id = %employee_id, "Adjustment lost the commit race repeatedly");
        Err(LedgerError::ConcurrencyConflict.into())
    }

    /// Approved leave days of one type falling inside `[from, to]`,
    /// for payroll consumption.
    ///
    /// Full-day requests contribute their working days clipped to the
    /// range; half-day requests contribute 0.5 when their date falls
    /// inside it.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::EmployeeNotFound`] for an unknown employee.
    pub fn approved_leave_days(
        &self,
        employee_id: EmployeeId,
        leave_type: LeaveType,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<LeaveDays, WorkflowError> {
        self.directory
            .get(employee_id)
            .ok_or(WorkflowError::EmployeeNotFound(employee_id))?;

        let total = self
            .requests
            .by_employee(employee_id)
            .iter()
            .filter(|r| r.status == RequestStatus::Approved && r.leave_type == leave_type)
            .map(|r| {
                if r.half_day.is_some() {
                    if r.start_date >= from && r.start_date <= to {
                        LeaveDays::HALF
                    } else {
                        LeaveDays::ZERO
                    }
                } else {
                    LeaveDays::whole(calendar::working_days_within(
                        r.start_date,
                        r.end_date,
                        from,
                        to,
                    ))
                }
            })
            .sum();
        Ok(total)
    }

    /// Every request of an employee, newest first.
    #[must_use]
    pub fn list_requests(&self, employee_id: EmployeeId) -> Vec<LeaveRequest> {
        self.requests.by_employee(employee_id)
    }

    /// Pending requests the actor is currently allowed to decide.
    #[must_use]
    pub fn pending_for_approver(&self, actor_id: EmployeeId) -> Vec<LeaveRequest> {
        let hr_staff = self.directory.hr_staff();
        self.requests
            .pending()
            .into_iter()
            .filter(|request| {
                self.directory
                    .get(request.employee_id)
                    .and_then(|owner| {
                        ApprovalRouter::resolve_approvers(request.stage, &owner, &hr_staff).ok()
                    })
                    .is_some_and(|resolved| resolved.contains(&actor_id))
            })
            .collect()
    }
}
