//! Error types for ledger operations.

use kadro_shared::LeaveDays;
use thiserror::Error;

use crate::policy::types::LeaveType;

/// Errors produced by balance ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A debit was attempted for more days than the current balance holds.
    #[error("insufficient {leave_type} balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// The leave type that was short.
        leave_type: LeaveType,
        /// Days the operation tried to consume.
        requested: LeaveDays,
        /// Spendable days at the time of the attempt.
        available: LeaveDays,
    },

    /// A mutation was attempted on a year already closed by rollover.
    #[error("ledger for year {year} is locked")]
    LedgerLocked {
        /// The closed year.
        year: i32,
    },

    /// A debit, credit, or adjustment carried a non-usable amount.
    #[error("invalid amount {amount}: must be a positive number of days")]
    InvalidAmount {
        /// The offending amount.
        amount: LeaveDays,
    },

    /// An administrative adjustment was submitted without a reason.
    #[error("adjustment reason is required")]
    AdjustmentReasonRequired,

    /// An adjustment would leave the balance negative.
    #[error("adjustment would overdraw {leave_type}: resulting balance {resulting}")]
    AdjustmentWouldOverdraw {
        /// The leave type being adjusted.
        leave_type: LeaveType,
        /// The balance the adjustment would have produced.
        resulting: LeaveDays,
    },

    /// Optimistic commit lost the race too many times in a row.
    #[error("concurrent ledger modification, retries exhausted")]
    ConcurrencyConflict,
}

impl LedgerError {
    /// HTTP-style status code for API mapping.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount { .. } | Self::AdjustmentReasonRequired => 400,
            Self::ConcurrencyConflict => 409,
            Self::InsufficientBalance { .. }
            | Self::LedgerLocked { .. }
            | Self::AdjustmentWouldOverdraw { .. } => 422,
        }
    }

    /// Machine-readable error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::LedgerLocked { .. } => "LEDGER_LOCKED",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::AdjustmentReasonRequired => "ADJUSTMENT_REASON_REQUIRED",
            Self::AdjustmentWouldOverdraw { .. } => "ADJUSTMENT_WOULD_OVERDRAW",
            Self::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
        }
    }

    /// Whether the caller may safely retry the whole operation.
    ///
    /// Only commit races are retryable; every other variant reports a
    /// business rule that a retry would hit again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict)
    }
}
