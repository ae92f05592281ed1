//! Common types used across the application.

pub mod days;
pub mod id;

pub use days::{InvalidLeaveDays, LeaveDays};
pub use id::*;
