//! Core leave-ledger business logic for Kadro.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `policy` - Leave type policies, eligibility, and request validation
//! - `ledger` - Per-employee/per-year balance accounting
//! - `workflow` - Request state machine and approval routing
//! - `employee` - Directory contract consumed by the workflow
//! - `calendar` - Working-day arithmetic

pub mod calendar;
pub mod employee;
pub mod ledger;
pub mod policy;
pub mod workflow;
