//! Workflow domain types for leave requests.
//!
//! A request moves Draft → Pending → {Approved | Rejected}, with
//! Cancelled reachable from Pending and Approved, and Withdrawn from
//! Pending. Approved, Rejected, Cancelled, and Withdrawn are terminal;
//! Approved → Cancelled is the one permitted post-terminal transition.

use chrono::{DateTime, NaiveDate, Utc};
use kadro_shared::{EmployeeId, LeaveDays, LeaveRequestId};
use serde::{Deserialize, Serialize};

use crate::policy::types::LeaveType;

/// Status of a leave request in the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Request is being drafted; never persisted by submission.
    Draft,
    /// Submitted and waiting on an approval stage.
    Pending,
    /// Fully approved; the ledger has been debited.
    Approved,
    /// Rejected at some stage; the ledger was never touched.
    Rejected,
    /// Cancelled by the employee, an administrator, or expiry.
    Cancelled,
    /// Retracted by the requesting employee while still Pending.
    Withdrawn,
}

impl RequestStatus {
    /// Returns true for states that permit no further decisions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Approved | Self::Rejected | Self::Cancelled | Self::Withdrawn
        )
    }

    /// Returns true for states that occupy the employee's calendar
    /// (used for overlap detection).
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    /// Returns the string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Withdrawn => "withdrawn",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The approval stage a request currently sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStage {
    /// Waiting on the employee's reporting manager.
    Manager,
    /// Waiting on an HR approver.
    Hr,
    /// No further stage; the request reached a terminal status.
    Completed,
}

impl ApprovalStage {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Hr => "hr",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for ApprovalStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decision an approver submits for a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Approve the request at the current stage.
    Approve,
    /// Reject the request; terminal at any stage.
    Reject,
}

/// Which half of the day a half-day request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfDaySlot {
    /// Morning half.
    FirstHalf,
    /// Afternoon half.
    SecondHalf,
}

/// Outcome recorded for a single approval stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageApprovalStatus {
    /// The stage has not decided yet.
    Pending,
    /// The stage approved.
    Approved,
    /// The stage rejected.
    Rejected,
}

/// One stage's approval sub-record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageApproval {
    /// The stage's outcome so far.
    pub status: StageApprovalStatus,
    /// Who decided, once decided.
    pub approver: Option<EmployeeId>,
    /// Approver comments, if any.
    pub comments: Option<String>,
    /// When the stage was decided.
    pub decided_at: Option<DateTime<Utc>>,
}

impl Default for StageApproval {
    fn default() -> Self {
        Self {
            status: StageApprovalStatus::Pending,
            approver: None,
            comments: None,
            decided_at: None,
        }
    }
}

impl StageApproval {
    /// Stamps the stage as decided.
    pub fn record(
        &mut self,
        status: StageApprovalStatus,
        approver: EmployeeId,
        comments: Option<String>,
        at: DateTime<Utc>,
    ) {
        self.status = status;
        self.approver = Some(approver);
        self.comments = comments;
        self.decided_at = Some(at);
    }
}

/// A typed event in a request's history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryEvent {
    /// The request was submitted.
    Applied,
    /// The request was approved without human review.
    AutoApproved,
    /// A stage approved the request.
    StageApproved {
        /// The stage that approved.
        stage: ApprovalStage,
    },
    /// A stage rejected the request.
    StageRejected {
        /// The stage that rejected.
        stage: ApprovalStage,
    },
    /// The request was cancelled.
    Cancelled,
    /// The request was withdrawn by its owner.
    Withdrawn,
    /// The pending request passed its expiry deadline.
    Expired,
}

/// One append-only history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// What happened.
    pub event: HistoryEvent,
    /// Who caused it; `None` for system transitions such as expiry.
    pub actor: Option<EmployeeId>,
    /// Free-text comment attached to the event.
    pub comment: Option<String>,
    /// When it happened.
    pub at: DateTime<Utc>,
}

/// A leave request and its full approval state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique request id.
    pub id: LeaveRequestId,
    /// The requesting employee.
    pub employee_id: EmployeeId,
    /// The leave type being requested.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave, inclusive.
    pub end_date: NaiveDate,
    /// Present when the request covers half a day.
    pub half_day: Option<HalfDaySlot>,
    /// Chargeable duration; exactly 0.5 for half-day requests.
    pub total_days: LeaveDays,
    /// The applicant's reason.
    pub reason: String,
    /// Opaque pointer to supporting documentation, when provided.
    pub documentation_ref: Option<String>,
    /// Current workflow status.
    pub status: RequestStatus,
    /// Current approval stage.
    pub stage: ApprovalStage,
    /// Manager stage sub-record.
    pub manager_approval: StageApproval,
    /// HR stage sub-record.
    pub hr_approval: StageApproval,
    /// Append-only history, oldest first.
    pub history: Vec<HistoryEntry>,
    /// Auto-cancellation deadline while Pending.
    pub expires_at: Option<DateTime<Utc>>,
    /// The ledger year charged; the start date's calendar year.
    pub ledger_year: i32,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Whether this request's window intersects `[start, end]`.
    #[must_use]
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    /// Whether the request occupies the employee's calendar.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    /// Appends a history entry and bumps `updated_at`.
    pub fn record_history(
        &mut self,
        event: HistoryEvent,
        actor: Option<EmployeeId>,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) {
        self.history.push(HistoryEntry {
            event,
            actor,
            comment,
            at,
        });
        self.updated_at = at;
    }

    /// The sub-record for a decidable stage; `None` for Completed.
    pub fn stage_approval_mut(&mut self, stage: ApprovalStage) -> Option<&mut StageApproval> {
        match stage {
            ApprovalStage::Manager => Some(&mut self.manager_approval),
            ApprovalStage::Hr => Some(&mut self.hr_approval),
            ApprovalStage::Completed => None,
        }
    }
}

/// Where a freshly submitted request starts, derived from the policy's
/// approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialRoute {
    /// Status the request is created with.
    pub status: RequestStatus,
    /// Stage the request is created at.
    pub stage: ApprovalStage,
    /// Whether submission debits the ledger immediately (Auto workflow).
    pub auto_debit: bool,
}

/// The state change a decision produces, computed before any mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionAction {
    /// A non-final approval: move to the next stage, no ledger effect.
    Advance {
        /// The stage that approved.
        stage: ApprovalStage,
        /// The stage the request moves to.
        next_stage: ApprovalStage,
        /// Who approved.
        approved_by: EmployeeId,
        /// When.
        approved_at: DateTime<Utc>,
        /// Approver comments.
        comments: Option<String>,
    },
    /// The finalizing approval: debit the ledger and complete.
    Finalize {
        /// The stage that approved.
        stage: ApprovalStage,
        /// Days to debit, exactly once.
        debit: LeaveDays,
        /// Who approved.
        approved_by: EmployeeId,
        /// When.
        approved_at: DateTime<Utc>,
        /// Approver comments.
        comments: Option<String>,
    },
    /// A rejection: terminal at any stage, never touches the ledger.
    Reject {
        /// The stage that rejected.
        stage: ApprovalStage,
        /// Who rejected.
        rejected_by: EmployeeId,
        /// When.
        rejected_at: DateTime<Utc>,
        /// Approver comments.
        comments: Option<String>,
    },
}

impl DecisionAction {
    /// The request status this action produces.
    #[must_use]
    pub fn new_status(&self) -> RequestStatus {
        match self {
            Self::Advance { .. } => RequestStatus::Pending,
            Self::Finalize { .. } => RequestStatus::Approved,
            Self::Reject { .. } => RequestStatus::Rejected,
        }
    }

    /// Whether this action debits the ledger.
    #[must_use]
    pub fn debits(&self) -> bool {
        matches!(self, Self::Finalize { .. })
    }
}

/// The state change a cancellation produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelAction {
    /// Days to credit back; `Some` only when cancelling an Approved
    /// request.
    pub refund: Option<LeaveDays>,
    /// Who cancelled.
    pub cancelled_by: EmployeeId,
    /// When.
    pub cancelled_at: DateTime<Utc>,
    /// The mandatory cancellation reason.
    pub reason: String,
}

/// The state change a withdrawal produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawAction {
    /// The owner who withdrew.
    pub withdrawn_by: EmployeeId,
    /// When.
    pub withdrawn_at: DateTime<Utc>,
}

/// The state change the expiry sweep produces for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpireAction {
    /// When the sweep ran.
    pub expired_at: DateTime<Utc>,
}
