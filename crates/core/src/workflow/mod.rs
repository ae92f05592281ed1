//! Leave request approval workflow.
//!
//! This module implements the request side of leave management:
//! - The request record and its append-only history
//! - The state machine (submit routing, decisions, cancellation,
//!   withdrawal, expiry)
//! - Stage routing and authorization
//! - Error types for workflow operations

pub mod error;
pub mod router;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use router::ApprovalRouter;
pub use service::WorkflowService;
pub use types::{
    ApprovalStage, CancelAction, Decision, DecisionAction, ExpireAction, HalfDaySlot,
    HistoryEntry, HistoryEvent, InitialRoute, LeaveRequest, RequestStatus, StageApproval,
    StageApprovalStatus, WithdrawAction,
};
