//! Policy error types for eligibility and request validation.

use kadro_shared::LeaveDays;
use thiserror::Error;

use crate::policy::types::LeaveType;

/// Errors raised by policy lookup, eligibility, and request validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The request window is inverted.
    #[error("Invalid date range: {start} to {end}")]
    InvalidDateRange {
        /// Requested start date.
        start: chrono::NaiveDate,
        /// Requested end date.
        end: chrono::NaiveDate,
    },

    /// The policy exists but is not currently offered.
    #[error("Leave type {0} is not active")]
    PolicyInactive(LeaveType),

    /// The leave type does not apply to the employee's gender.
    #[error("Leave type {0} is not applicable to this employee")]
    GenderNotApplicable(LeaveType),

    /// The employee has not served long enough for this leave type.
    #[error("Requires {required_months} months of service, employee has {actual_months}")]
    InsufficientService {
        /// Months of service the policy requires.
        required_months: u32,
        /// Months the employee has completed.
        actual_months: u32,
    },

    /// The employee is on probation and the type excludes probationers.
    #[error("Leave type {0} is not available during probation")]
    ProbationNotEligible(LeaveType),

    /// Requested duration is under the policy minimum.
    #[error("Duration {requested} is below the minimum of {minimum} days")]
    DurationBelowMinimum {
        /// Policy minimum duration.
        minimum: LeaveDays,
        /// Requested duration.
        requested: LeaveDays,
    },

    /// Requested duration is over the policy maximum.
    #[error("Duration {requested} exceeds the maximum of {maximum} days")]
    DurationExceedsMaximum {
        /// Policy maximum duration.
        maximum: LeaveDays,
        /// Requested duration.
        requested: LeaveDays,
    },

    /// The request was filed with less notice than the policy requires.
    #[error("Requires {required_days} days notice, got {actual_days}")]
    InsufficientNotice {
        /// Notice days the policy requires.
        required_days: i64,
        /// Notice days actually given.
        actual_days: i64,
    },

    /// The request window touches a blackout period.
    #[error("Request overlaps blackout period '{period}'")]
    BlackoutOverlap {
        /// Name of the blackout period hit.
        period: String,
    },

    /// The policy demands documentation and none was referenced.
    #[error("Leave type {0} requires supporting documentation")]
    DocumentationRequired(LeaveType),
}

impl PolicyError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange { .. } => 400,
            Self::PolicyInactive(_)
            | Self::GenderNotApplicable(_)
            | Self::InsufficientService { .. }
            | Self::ProbationNotEligible(_)
            | Self::DurationBelowMinimum { .. }
            | Self::DurationExceedsMaximum { .. }
            | Self::InsufficientNotice { .. }
            | Self::BlackoutOverlap { .. }
            | Self::DocumentationRequired(_) => 422,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::PolicyInactive(_) => "POLICY_INACTIVE",
            Self::GenderNotApplicable(_) => "GENDER_NOT_APPLICABLE",
            Self::InsufficientService { .. } => "INSUFFICIENT_SERVICE",
            Self::ProbationNotEligible(_) => "PROBATION_NOT_ELIGIBLE",
            Self::DurationBelowMinimum { .. } => "DURATION_BELOW_MINIMUM",
            Self::DurationExceedsMaximum { .. } => "DURATION_EXCEEDS_MAXIMUM",
            Self::InsufficientNotice { .. } => "INSUFFICIENT_NOTICE",
            Self::BlackoutOverlap { .. } => "BLACKOUT_OVERLAP",
            Self::DocumentationRequired(_) => "DOCUMENTATION_REQUIRED",
        }
    }
}
