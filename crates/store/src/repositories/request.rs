//! Thread-safe store of leave requests.
//!
//! Reads clone records out; writes go through `upsert`, which callers
//! invoke from inside a ledger commit critical section so request and
//! ledger state change together.

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use kadro_core::workflow::{LeaveRequest, RequestStatus};
use kadro_shared::{EmployeeId, LeaveRequestId};

/// Thread-safe store of leave requests keyed by id.
#[derive(Default)]
pub struct RequestStore {
    requests: DashMap<LeaveRequestId, LeaveRequest>,
}

impl RequestStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clones out a request by id.
    #[must_use]
    pub fn get(&self, id: LeaveRequestId) -> Option<LeaveRequest> {
        self.requests.get(&id).map(|r| r.clone())
    }

    /// Inserts or replaces a request.
    pub fn upsert(&self, request: LeaveRequest) {
        self.requests.insert(request.id, request);
    }

    /// Every request of an employee, newest first.
    #[must_use]
    pub fn by_employee(&self, employee_id: EmployeeId) -> Vec<LeaveRequest> {
        let mut found: Vec<LeaveRequest> = self
            .requests
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .map(|r| r.clone())
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }

    /// The first live (Pending or Approved) request of the employee
    /// whose window intersects `[start, end]`, excluding `exclude`.
    #[must_use]
    pub fn find_live_overlap(
        &self,
        employee_id: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<LeaveRequestId>,
    ) -> Option<LeaveRequestId> {
        self.requests
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .filter(|r| exclude != Some(r.id))
            .filter(|r| r.is_live())
            .find(|r| r.overlaps(start, end))
            .map(|r| r.id)
    }

    /// Every Pending request, oldest first.
    #[must_use]
    pub fn pending(&self) -> Vec<LeaveRequest> {
        let mut found: Vec<LeaveRequest> = self
            .requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .map(|r| r.clone())
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        found
    }

    /// Ids of Pending requests whose expiry deadline has passed.
    #[must_use]
    pub fn pending_expired(&self, now: DateTime<Utc>) -> Vec<LeaveRequestId> {
        self.requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .filter(|r| r.expires_at.is_some_and(|deadline| deadline <= now))
            .map(|r| r.id)
            .collect()
    }
}
