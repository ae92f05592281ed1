//! Property-based tests for the request state machine.

use chrono::{DateTime, NaiveDate, Utc};
use kadro_shared::{EmployeeId, LeaveDays, LeaveRequestId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::policy::types::{ApprovalWorkflow, LeaveType};
use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{
    ApprovalStage, Decision, DecisionAction, LeaveRequest, RequestStatus, StageApproval,
};

fn arb_status() -> impl Strategy<Value = RequestStatus> {
    prop_oneof![
        Just(RequestStatus::Draft),
        Just(RequestStatus::Pending),
        Just(RequestStatus::Approved),
        Just(RequestStatus::Rejected),
        Just(RequestStatus::Cancelled),
        Just(RequestStatus::Withdrawn),
    ]
}

fn arb_decidable_stage() -> impl Strategy<Value = ApprovalStage> {
    prop_oneof![Just(ApprovalStage::Manager), Just(ApprovalStage::Hr)]
}

fn arb_workflow() -> impl Strategy<Value = ApprovalWorkflow> {
    prop_oneof![
        Just(ApprovalWorkflow::Auto),
        Just(ApprovalWorkflow::Manager),
        Just(ApprovalWorkflow::Hr),
        Just(ApprovalWorkflow::Both),
    ]
}

fn arb_total_days() -> impl Strategy<Value = LeaveDays> {
    (1i64..=20).prop_map(|halves| LeaveDays::new(Decimal::new(halves * 5, 1)).unwrap())
}

fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-03-01T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn request(status: RequestStatus, stage: ApprovalStage, total_days: LeaveDays) -> LeaveRequest {
    LeaveRequest {
        id: LeaveRequestId::new(),
        employee_id: EmployeeId::new(),
        leave_type: LeaveType::Casual,
        start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        half_day: None,
        total_days,
        reason: "generated".to_string(),
        documentation_ref: None,
        status,
        stage,
        manager_approval: StageApproval::default(),
        hr_approval: StageApproval::default(),
        history: Vec::new(),
        expires_at: Some(fixed_now() + chrono::Duration::days(7)),
        ledger_year: 2025,
        created_at: fixed_now(),
        updated_at: fixed_now(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Decision guards
    // =========================================================================

    /// Any decision on a non-Pending request is an invalid transition.
    #[test]
    fn prop_decide_requires_pending(
        status in arb_status(),
        stage in arb_decidable_stage(),
        workflow in arb_workflow(),
        approve in any::<bool>(),
    ) {
        prop_assume!(status != RequestStatus::Pending);
        let decision = if approve { Decision::Approve } else { Decision::Reject };
        let result = WorkflowService::decide(
            &request(status, stage, LeaveDays::ONE),
            workflow,
            EmployeeId::new(),
            decision,
            None,
            fixed_now(),
        );
        let is_invalid_transition = matches!(
            result,
            Err(WorkflowError::InvalidTransition { from, .. }) if from == status
        );
        prop_assert!(is_invalid_transition);
    }

    /// Only the Manager stage of a Both workflow advances; every other
    /// approval finalizes and debits exactly the request's total days.
    #[test]
    fn prop_single_finalizing_approval(
        stage in arb_decidable_stage(),
        workflow in arb_workflow(),
        total_days in arb_total_days(),
    ) {
        let req = request(RequestStatus::Pending, stage, total_days);
        let action = WorkflowService::decide(
            &req,
            workflow,
            EmployeeId::new(),
            Decision::Approve,
            None,
            fixed_now(),
        )
        .unwrap();

        if workflow == ApprovalWorkflow::Both && stage == ApprovalStage::Manager {
            let advances_to_hr = matches!(
                action,
                DecisionAction::Advance { next_stage: ApprovalStage::Hr, .. }
            );
            prop_assert!(advances_to_hr);
            prop_assert!(!action.debits());
        } else {
            prop_assert!(action.debits());
            if let DecisionAction::Finalize { debit, .. } = &action {
                prop_assert_eq!(*debit, total_days);
            }
        }
    }

    /// A rejection never carries a ledger effect, whatever the stage.
    #[test]
    fn prop_reject_never_debits(
        stage in arb_decidable_stage(),
        workflow in arb_workflow(),
        total_days in arb_total_days(),
    ) {
        let req = request(RequestStatus::Pending, stage, total_days);
        let action = WorkflowService::decide(
            &req,
            workflow,
            EmployeeId::new(),
            Decision::Reject,
            Some("no".to_string()),
            fixed_now(),
        )
        .unwrap();
        prop_assert!(!action.debits());
        prop_assert_eq!(action.new_status(), RequestStatus::Rejected);
    }

    // =========================================================================
    // Applying actions
    // =========================================================================

    /// Applying any decision appends exactly one history entry and moves
    /// the record to the action's status.
    #[test]
    fn prop_apply_decision_is_consistent(
        stage in arb_decidable_stage(),
        workflow in arb_workflow(),
        approve in any::<bool>(),
    ) {
        let decision = if approve { Decision::Approve } else { Decision::Reject };
        let req = request(RequestStatus::Pending, stage, LeaveDays::ONE);
        let action = WorkflowService::decide(
            &req,
            workflow,
            EmployeeId::new(),
            decision,
            None,
            fixed_now(),
        )
        .unwrap();

        let mut applied = req.clone();
        WorkflowService::apply_decision(&mut applied, &action);
        prop_assert_eq!(applied.status, action.new_status());
        prop_assert_eq!(applied.history.len(), req.history.len() + 1);
        if applied.status.is_terminal() {
            prop_assert_eq!(applied.stage, ApprovalStage::Completed);
            prop_assert_eq!(applied.expires_at, None);
        }
    }

    // =========================================================================
    // Transition table
    // =========================================================================

    /// Terminal statuses admit no outgoing transition except
    /// Approved → Cancelled.
    #[test]
    fn prop_terminal_states_stay_terminal(from in arb_status(), to in arb_status()) {
        prop_assume!(from.is_terminal());
        let allowed = from == RequestStatus::Approved && to == RequestStatus::Cancelled;
        prop_assert_eq!(WorkflowService::is_valid_transition(from, to), allowed);
    }
}
