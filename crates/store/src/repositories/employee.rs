//! Thread-safe employee directory.
//!
//! The workflow consumes directory profiles for eligibility, routing,
//! and role checks; population is a collaborator concern (an import
//! job, an HR sync), so the store only offers lookups.

use dashmap::DashMap;
use kadro_core::employee::EmployeeProfile;
use kadro_shared::EmployeeId;

/// Thread-safe directory of employee profiles.
#[derive(Default)]
pub struct EmployeeDirectory {
    employees: DashMap<EmployeeId, EmployeeProfile>,
}

impl EmployeeDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a profile.
    pub fn upsert(&self, profile: EmployeeProfile) {
        self.employees.insert(profile.id, profile);
    }

    /// Clones out a profile by id.
    #[must_use]
    pub fn get(&self, id: EmployeeId) -> Option<EmployeeProfile> {
        self.employees.get(&id).map(|p| p.clone())
    }

    /// Every active employee.
    #[must_use]
    pub fn active(&self) -> Vec<EmployeeProfile> {
        self.employees
            .iter()
            .filter(|p| p.active)
            .map(|p| p.clone())
            .collect()
    }

    /// Ids of every active hr/admin employee, the HR approval pool.
    #[must_use]
    pub fn hr_staff(&self) -> Vec<EmployeeId> {
        self.employees
            .iter()
            .filter(|p| p.active && p.role.is_hr())
            .map(|p| p.id)
            .collect()
    }
}
