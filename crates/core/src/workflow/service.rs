//! Workflow state machine for leave requests.
//!
//! All functions are stateless: they inspect a request and return the
//! state change to apply, so callers control persistence and atomicity.
//! The ledger effect of an action (debit on finalize, credit on
//! cancel-from-approved) is carried on the action and executed by the
//! caller inside its commit boundary.

use chrono::{DateTime, Utc};
use kadro_shared::EmployeeId;

use crate::policy::types::ApprovalWorkflow;
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{
    ApprovalStage, CancelAction, Decision, DecisionAction, ExpireAction, HistoryEvent,
    InitialRoute, LeaveRequest, RequestStatus, StageApprovalStatus, WithdrawAction,
};

/// Stateless service for request state transitions.
pub struct WorkflowService;

impl WorkflowService {
    /// Where a freshly submitted request starts for a given workflow.
    #[must_use]
    pub fn initial_route(workflow: ApprovalWorkflow) -> InitialRoute {
        match workflow {
            ApprovalWorkflow::Auto => InitialRoute {
                status: RequestStatus::Approved,
                stage: ApprovalStage::Completed,
                auto_debit: true,
            },
            ApprovalWorkflow::Manager | ApprovalWorkflow::Both => InitialRoute {
                status: RequestStatus::Pending,
                stage: ApprovalStage::Manager,
                auto_debit: false,
            },
            ApprovalWorkflow::Hr => InitialRoute {
                status: RequestStatus::Pending,
                stage: ApprovalStage::Hr,
                auto_debit: false,
            },
        }
    }

    /// The stage that follows an approval, or `None` when the approval
    /// finalizes the request.
    ///
    /// Only the Manager stage of a Both workflow has a successor.
    #[must_use]
    pub fn next_stage_after_approval(
        workflow: ApprovalWorkflow,
        stage: ApprovalStage,
    ) -> Option<ApprovalStage> {
        match (workflow, stage) {
            (ApprovalWorkflow::Both, ApprovalStage::Manager) => Some(ApprovalStage::Hr),
            _ => None,
        }
    }

    /// Computes the state change for an approver's decision.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::InvalidTransition`] when the request is
    /// not Pending. Authorization against the stage's resolved approvers
    /// is the router's concern and must run before this.
    pub fn decide(
        request: &LeaveRequest,
        workflow: ApprovalWorkflow,
        actor: EmployeeId,
        decision: Decision,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<DecisionAction, WorkflowError> {
        if request.status != RequestStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                from: request.status,
                to: match decision {
                    Decision::Approve => RequestStatus::Approved,
                    Decision::Reject => RequestStatus::Rejected,
                },
            });
        }

        match decision {
            Decision::Reject => Ok(DecisionAction::Reject {
                stage: request.stage,
                rejected_by: actor,
                rejected_at: now,
                comments,
            }),
            Decision::Approve => {
                match Self::next_stage_after_approval(workflow, request.stage) {
                    Some(next_stage) => Ok(DecisionAction::Advance {
                        stage: request.stage,
                        next_stage,
                        approved_by: actor,
                        approved_at: now,
                        comments,
                    }),
                    None => Ok(DecisionAction::Finalize {
                        stage: request.stage,
                        debit: request.total_days,
                        approved_by: actor,
                        approved_at: now,
                        comments,
                    }),
                }
            }
        }
    }

    /// Applies a decision action to the request record.
    pub fn apply_decision(request: &mut LeaveRequest, action: &DecisionAction) {
        match action {
            DecisionAction::Advance {
                stage,
                next_stage,
                approved_by,
                approved_at,
                comments,
            } => {
                if let Some(sub) = request.stage_approval_mut(*stage) {
                    sub.record(
                        StageApprovalStatus::Approved,
                        *approved_by,
                        comments.clone(),
                        *approved_at,
                    );
                }
                request.stage = *next_stage;
                request.record_history(
                    HistoryEvent::StageApproved { stage: *stage },
                    Some(*approved_by),
                    comments.clone(),
                    *approved_at,
                );
            }
            DecisionAction::Finalize {
                stage,
                approved_by,
                approved_at,
                comments,
                ..
            } => {
                if let Some(sub) = request.stage_approval_mut(*stage) {
                    sub.record(
                        StageApprovalStatus::Approved,
                        *approved_by,
                        comments.clone(),
                        *approved_at,
                    );
                }
                request.status = RequestStatus::Approved;
                request.stage = ApprovalStage::Completed;
                request.expires_at = None;
                request.record_history(
                    HistoryEvent::StageApproved { stage: *stage },
                    Some(*approved_by),
                    comments.clone(),
                    *approved_at,
                );
            }
            DecisionAction::Reject {
                stage,
                rejected_by,
                rejected_at,
                comments,
            } => {
                if let Some(sub) = request.stage_approval_mut(*stage) {
                    sub.record(
                        StageApprovalStatus::Rejected,
                        *rejected_by,
                        comments.clone(),
                        *rejected_at,
                    );
                }
                request.status = RequestStatus::Rejected;
                request.stage = ApprovalStage::Completed;
                request.expires_at = None;
                request.record_history(
                    HistoryEvent::StageRejected { stage: *stage },
                    Some(*rejected_by),
                    comments.clone(),
                    *rejected_at,
                );
            }
        }
    }

    /// Computes the state change for a cancellation.
    ///
    /// Pending requests cancel without any ledger effect; Approved
    /// requests refund their debit. Ownership/role checks are the
    /// router's concern.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::CancellationReasonRequired`] on a blank
    /// reason, or [`WorkflowError::InvalidTransition`] from any status
    /// other than Pending or Approved.
    pub fn cancel(
        request: &LeaveRequest,
        actor: EmployeeId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<CancelAction, WorkflowError> {
        if reason.trim().is_empty() {
            return Err(WorkflowError::CancellationReasonRequired);
        }
        let refund = match request.status {
            RequestStatus::Pending => None,
            RequestStatus::Approved => Some(request.total_days),
            from => {
                return Err(WorkflowError::InvalidTransition {
                    from,
                    to: RequestStatus::Cancelled,
                });
            }
        };
        Ok(CancelAction {
            refund,
            cancelled_by: actor,
            cancelled_at: now,
            reason: reason.trim().to_string(),
        })
    }

    /// Applies a cancellation action to the request record.
    pub fn apply_cancel(request: &mut LeaveRequest, action: &CancelAction) {
        request.status = RequestStatus::Cancelled;
        request.stage = ApprovalStage::Completed;
        request.expires_at = None;
        request.record_history(
            HistoryEvent::Cancelled,
            Some(action.cancelled_by),
            Some(action.reason.clone()),
            action.cancelled_at,
        );
    }

    /// Computes the state change for the owner retracting a request.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::InvalidTransition`] unless the request
    /// is Pending; a withdrawn request has never been debited.
    pub fn withdraw(
        request: &LeaveRequest,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<WithdrawAction, WorkflowError> {
        if request.status != RequestStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                from: request.status,
                to: RequestStatus::Withdrawn,
            });
        }
        Ok(WithdrawAction {
            withdrawn_by: actor,
            withdrawn_at: now,
        })
    }

    /// Applies a withdrawal action to the request record.
    pub fn apply_withdraw(request: &mut LeaveRequest, action: &WithdrawAction) {
        request.status = RequestStatus::Withdrawn;
        request.stage = ApprovalStage::Completed;
        request.expires_at = None;
        request.record_history(
            HistoryEvent::Withdrawn,
            Some(action.withdrawn_by),
            None,
            action.withdrawn_at,
        );
    }

    /// Whether the expiry sweep should cancel this request now.
    #[must_use]
    pub fn expire(request: &LeaveRequest, now: DateTime<Utc>) -> Option<ExpireAction> {
        if request.status == RequestStatus::Pending
            && request.expires_at.is_some_and(|deadline| deadline <= now)
        {
            return Some(ExpireAction { expired_at: now });
        }
        None
    }

    /// Applies an expiry action: Cancelled, with a system history entry.
    pub fn apply_expiry(request: &mut LeaveRequest, action: &ExpireAction) {
        request.status = RequestStatus::Cancelled;
        request.stage = ApprovalStage::Completed;
        request.expires_at = None;
        request.record_history(HistoryEvent::Expired, None, None, action.expired_at);
    }

    /// The full transition table of the request state machine.
    #[must_use]
    pub fn is_valid_transition(from: RequestStatus, to: RequestStatus) -> bool {
        matches!(
            (from, to),
            (RequestStatus::Draft, RequestStatus::Pending)
                | (
                    RequestStatus::Pending,
                    RequestStatus::Approved
                        | RequestStatus::Rejected
                        | RequestStatus::Cancelled
                        | RequestStatus::Withdrawn
                )
                | (RequestStatus::Approved, RequestStatus::Cancelled)
        )
    }
}
