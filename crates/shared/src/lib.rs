//! Shared types and configuration for Kadro.
//!
//! This crate provides common types used across all other crates:
//! - Leave-day amounts with half-day precision
//! - Typed IDs for type-safe entity references
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
pub use types::{EmployeeId, InvalidLeaveDays, LeaveDays, LeaveRequestId};
