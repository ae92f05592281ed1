//! Notification boundary for terminal request transitions.
//!
//! Delivery (email, chat, webhooks) is an outer-layer concern; the
//! service fires events and never waits on or fails with them.

use std::sync::Mutex;

use kadro_core::workflow::{LeaveRequest, RequestStatus};
use kadro_shared::{EmployeeId, LeaveRequestId};
use serde::Serialize;

/// Event emitted when a request reaches a terminal status.
#[derive(Debug, Clone, Serialize)]
pub struct LeaveNotification {
    /// The employee whose request changed.
    pub employee_id: EmployeeId,
    /// The request that changed.
    pub request_id: LeaveRequestId,
    /// The terminal status reached.
    pub status: RequestStatus,
    /// The comment attached to the final transition, if any.
    pub comments: Option<String>,
}

impl LeaveNotification {
    /// Builds the event from a request that just went terminal.
    #[must_use]
    pub fn from_request(request: &LeaveRequest) -> Self {
        Self {
            employee_id: request.employee_id,
            request_id: request.id,
            status: request.status,
            comments: request.history.last().and_then(|entry| entry.comment.clone()),
        }
    }
}

/// Fire-and-forget sink for terminal transition events.
pub trait NotificationSender: Send + Sync {
    /// Delivers one event; implementations must not block the caller.
    fn send(&self, event: &LeaveNotification);
}

/// Sender that logs each event as a structured tracing record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationSender for TracingNotifier {
    fn send(&self, event: &LeaveNotification) {
        let payload = serde_json::to_string(event).unwrap_or_default();
        tracing::info!(
            employee_id = %event.employee_id,
            request_id = %event.request_id,
            status = %event.status,
            payload,
            "Leave notification"
        );
    }
}

/// Sender that records events for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<LeaveNotification>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<LeaveNotification> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl NotificationSender for RecordingNotifier {
    fn send(&self, event: &LeaveNotification) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
