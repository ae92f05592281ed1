//! Per-employee, per-year leave balance accounting.
//!
//! This module implements the balance ledger:
//! - Stored balance components with a derived spendable balance
//! - Debit/credit from request finalization and cancellation
//! - Administrative adjustments with an audit log
//! - Capped, idempotent periodic accrual
//! - Year-end rollover with carry-forward and lapse
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod types;

#[cfg(test)]
mod balance_props;

pub use balance::BalanceLedger;
pub use error::LedgerError;
pub use types::{
    AccrualPeriod, AdjustmentRecord, BalanceSnapshot, LedgerKey, TypeBalance, TypeBalanceView,
    TypeMarkers,
};
