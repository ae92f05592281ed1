//! Thread-safe in-process repositories.

pub mod employee;
pub mod ledger;
pub mod request;

pub use employee::EmployeeDirectory;
pub use ledger::{ensure_ledger, ensure_ledger_for_key, LedgerStore};
pub use request::RequestStore;
