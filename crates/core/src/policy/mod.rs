//! Leave type policies and request validation.
//!
//! This module implements the policy side of leave management:
//! - Leave type codes and the fixed per-type record
//! - Per-type policy configuration (accrual, carry-forward, eligibility)
//! - The standard policy registry
//! - Eligibility and request validation
//! - Error types for policy violations

pub mod error;
pub mod registry;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::PolicyError;
pub use registry::PolicyRegistry;
pub use types::{
    ApprovalWorkflow, BlackoutPeriod, CarryForwardRule, GenderApplicability, LeaveType,
    LeaveTypePolicy, PerLeaveType,
};
pub use validation::PolicyService;
