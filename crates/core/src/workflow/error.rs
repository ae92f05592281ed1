//! Error types for workflow operations.

use kadro_shared::{EmployeeId, LeaveRequestId};
use thiserror::Error;

use crate::ledger::error::LedgerError;
use crate::policy::error::PolicyError;
use crate::workflow::types::{ApprovalStage, RequestStatus};

/// Errors produced by request workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// The request's status does not permit the attempted transition.
    #[error("invalid state transition from {from} to {to}")]
    InvalidTransition {
        /// Status the request was in.
        from: RequestStatus,
        /// Status the operation tried to reach.
        to: RequestStatus,
    },

    /// The actor is not among the resolved approvers, or lacks the role
    /// the operation demands.
    #[error("actor {actor} is not authorized for this operation")]
    NotAuthorized {
        /// The actor that was refused.
        actor: EmployeeId,
    },

    /// The employee has no reporting manager to route the request to.
    #[error("employee {employee_id} has no reporting manager assigned")]
    ManagerNotAssigned {
        /// The employee missing a manager.
        employee_id: EmployeeId,
    },

    /// No approver could be resolved for the stage.
    #[error("no approvers available for stage {stage}")]
    NoApproversAvailable {
        /// The stage that could not be routed.
        stage: ApprovalStage,
    },

    /// The request id does not exist.
    #[error("leave request {0} not found")]
    RequestNotFound(LeaveRequestId),

    /// The employee id does not exist in the directory.
    #[error("employee {0} not found")]
    EmployeeNotFound(EmployeeId),

    /// The employee exists but is not active.
    #[error("employee {0} is not active")]
    EmployeeInactive(EmployeeId),

    /// The window collides with another live request of the employee.
    #[error("window overlaps live request {other}")]
    OverlappingRequest {
        /// The conflicting request.
        other: LeaveRequestId,
    },

    /// A request was submitted without a reason.
    #[error("a reason is required")]
    ReasonRequired,

    /// A cancellation was submitted without a reason.
    #[error("a cancellation reason is required")]
    CancellationReasonRequired,

    /// A policy rule rejected the request.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// A ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl WorkflowError {
    /// HTTP-style status code for API mapping.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. }
            | Self::ReasonRequired
            | Self::CancellationReasonRequired => 400,
            Self::NotAuthorized { .. } => 403,
            Self::RequestNotFound(_) | Self::EmployeeNotFound(_) => 404,
            Self::OverlappingRequest { .. } => 409,
            Self::ManagerNotAssigned { .. }
            | Self::NoApproversAvailable { .. }
            | Self::EmployeeInactive(_) => 422,
            Self::Policy(e) => e.status_code(),
            Self::Ledger(e) => e.status_code(),
        }
    }

    /// Machine-readable error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_STATE_TRANSITION",
            Self::NotAuthorized { .. } => "NOT_AUTHORIZED",
            Self::ManagerNotAssigned { .. } => "MANAGER_NOT_ASSIGNED",
            Self::NoApproversAvailable { .. } => "NO_APPROVERS_AVAILABLE",
            Self::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            Self::EmployeeNotFound(_) => "EMPLOYEE_NOT_FOUND",
            Self::EmployeeInactive(_) => "EMPLOYEE_INACTIVE",
            Self::OverlappingRequest { .. } => "OVERLAPPING_REQUEST",
            Self::ReasonRequired => "REASON_REQUIRED",
            Self::CancellationReasonRequired => "CANCELLATION_REASON_REQUIRED",
            Self::Policy(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
        }
    }

    /// Whether the caller may safely retry the whole operation.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Ledger(e) if e.is_retryable())
    }
}
