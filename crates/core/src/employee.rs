//! Employee directory contract consumed by the leave workflow.
//!
//! The directory itself is an external collaborator; this module defines
//! the read-only profile shape the workflow needs: gender for policy
//! applicability, the reporting manager for approval routing, the joining
//! date for service-month rules, and the role for HR authorization.

use chrono::NaiveDate;
use kadro_shared::EmployeeId;
use serde::{Deserialize, Serialize};

use crate::calendar;

/// Employee gender as recorded in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Any other or undisclosed gender.
    Other,
}

/// Role an employee holds, as reported by the role source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeRole {
    /// Regular employee with no approval privileges.
    Employee,
    /// Line manager; approves Manager-stage requests of direct reports.
    Manager,
    /// HR staff; approves HR-stage requests and may adjust balances.
    Hr,
    /// Administrator; same privileges as HR.
    Admin,
}

impl EmployeeRole {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Hr => "hr",
            Self::Admin => "admin",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "employee" => Some(Self::Employee),
            "manager" => Some(Self::Manager),
            "hr" => Some(Self::Hr),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns true if the role may act at the HR approval stage.
    #[must_use]
    pub fn is_hr(&self) -> bool {
        matches!(self, Self::Hr | Self::Admin)
    }

    /// Returns true if the role may apply administrative balance adjustments.
    #[must_use]
    pub fn can_adjust_balances(&self) -> bool {
        matches!(self, Self::Hr | Self::Admin)
    }
}

impl std::fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only employee profile from the directory collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    /// The employee's identifier.
    pub id: EmployeeId,
    /// Gender, for policy applicability rules.
    pub gender: Gender,
    /// The employee's reporting manager, if one is assigned.
    pub reporting_manager: Option<EmployeeId>,
    /// Date the employee joined; service months derive from this.
    pub joining_date: NaiveDate,
    /// Whether the employee is still on probation.
    pub on_probation: bool,
    /// Role held by the employee.
    pub role: EmployeeRole,
    /// Whether the employee is currently active.
    pub active: bool,
}

impl EmployeeProfile {
    /// Completed months of service as of the given date.
    ///
    /// A month counts only once its day-of-month anniversary has passed;
    /// dates before the joining date yield zero.
    #[must_use]
    pub fn service_months(&self, as_of: NaiveDate) -> u32 {
        calendar::whole_months_between(self.joining_date, as_of)
    }
}
