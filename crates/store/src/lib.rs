//! In-process store and service layer for the Kadro leave ledger.
//!
//! Wires the pure core onto thread-safe `dashmap` repositories and
//! exposes the leave operations behind a small facade:
//!
//! - `service` - The [`LeaveService`] facade: submission, decisions,
//!   cancellation, withdrawal, balances, adjustments, payroll reads
//! - `scheduler` - Batch runs: accrual, rollover, expiry sweeps
//! - `repositories` - Versioned ledger cells, requests, the directory
//! - `notify` - Terminal-transition notification boundary

pub mod notify;
pub mod repositories;
pub mod scheduler;
pub mod service;

pub use notify::{LeaveNotification, NotificationSender, RecordingNotifier, TracingNotifier};
pub use scheduler::{BatchSummary, LeaveScheduler};
pub use service::{LeaveService, SubmitLeaveRequest};
