//! Concurrent access tests for the leave service.
//!
//! These tests verify the optimistic-commit contract under real thread
//! interleavings:
//!
//! - a finalizing approval debits exactly once no matter how many racing
//!   approvers attempt it
//! - concurrent auto-debiting submissions never overdraw a balance
//! - an adjustment storm preserves the balance equation
//! - an approval racing a cancellation settles on one state with the
//!   ledger intact

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use rust_decimal_macros::dec;

use kadro_core::employee::{EmployeeProfile, EmployeeRole, Gender};
use kadro_core::ledger::LedgerError;
use kadro_core::policy::{LeaveType, PerLeaveType, PolicyRegistry};
use kadro_core::workflow::{Decision, RequestStatus, WorkflowError};
use kadro_shared::config::{StoreConfig, WorkflowConfig};
use kadro_shared::{AppConfig, EmployeeId, LeaveDays};
use kadro_store::{LeaveService, NotificationSender, RecordingNotifier, SubmitLeaveRequest};

fn days(d: rust_decimal::Decimal) -> LeaveDays {
    LeaveDays::new(d).unwrap()
}

fn test_registry() -> PolicyRegistry {
    let mut policies =
        PerLeaveType::from_fn(|code| PolicyRegistry::standard().get(code).clone());
    policies.casual.min_notice_days = 0;
    policies.earned.min_notice_days = 0;
    policies.unpaid.min_notice_days = 0;
    PolicyRegistry::new(policies)
}

/// The retry bound caps how many commit losses a writer survives; tests
/// that provoke many interleaved commits raise it so no writer can
/// exhaust it, which makes the expected outcome exact.
fn service_with_retries(max_commit_retries: u32) -> LeaveService {
    let config = AppConfig {
        workflow: WorkflowConfig::default(),
        store: StoreConfig { max_commit_retries },
    };
    LeaveService::with_registry(
        test_registry(),
        config,
        Arc::new(RecordingNotifier::new()) as Arc<dyn NotificationSender>,
    )
}

fn seed_employee(
    service: &LeaveService,
    role: EmployeeRole,
    reporting_manager: Option<EmployeeId>,
) -> EmployeeId {
    let profile = EmployeeProfile {
        id: EmployeeId::new(),
        gender: Gender::Other,
        reporting_manager,
        joining_date: Utc::now().date_naive() - Duration::days(3 * 365),
        on_probation: false,
        role,
        active: true,
    };
    let id = profile.id;
    service.directory().upsert(profile);
    id
}

fn mid_year_monday() -> NaiveDate {
    let mut day = NaiveDate::from_ymd_opt(Utc::now().year(), 6, 1).unwrap();
    while day.weekday() != Weekday::Mon {
        day = day.succ_opt().unwrap();
    }
    day
}

// ============================================================================
// Test: Racing approvals of one request debit exactly once
// ============================================================================
#[test]
fn test_concurrent_approvals_debit_exactly_once() {
    let service = service_with_retries(5);
    let manager = seed_employee(&service, EmployeeRole::Manager, None);
    let employee = seed_employee(&service, EmployeeRole::Employee, Some(manager));

    let monday = mid_year_monday();
    let request = service
        .submit_request(SubmitLeaveRequest {
            employee_id: employee,
            leave_type: LeaveType::Casual,
            start_date: monday,
            end_date: monday + Duration::days(2),
            half_day: None,
            reason: "planned time off".to_string(),
            documentation_ref: None,
        })
        .unwrap();

    let threads = 4;
    let barrier = Barrier::new(threads);
    let results: Vec<Result<RequestStatus, WorkflowError>> = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    service
                        .decide(request.id, manager, Decision::Approve, None)
                        .map(|r| r.status)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one approval may finalize");
    for failure in results.iter().filter(|r| r.is_err()) {
        assert!(
            matches!(failure, Err(WorkflowError::InvalidTransition { .. })),
            "losers must observe the terminal state, got {failure:?}"
        );
    }

    let balance = service.get_balance(employee, request.ledger_year).unwrap();
    assert_eq!(balance.balances.casual.used, days(dec!(3)), "debited once");
    assert_eq!(balance.balances.casual.current, days(dec!(9)));
    assert_eq!(
        service.list_requests(employee)[0].status,
        RequestStatus::Approved
    );
}

// ============================================================================
// Test: Concurrent auto-debiting submissions never overdraw
// ============================================================================
#[test]
fn test_concurrent_sick_submissions_never_overdraw() {
    // At most 6 commits ever bump the ledger cell, so 16 retries cannot
    // be exhausted and the outcome is exact.
    let service = service_with_retries(16);
    let employee = seed_employee(&service, EmployeeRole::Employee, None);

    // Eight distinct Monday-Tuesday windows of 2 working days each
    // against a SICK balance of 12: exactly six can fit.
    let base = mid_year_monday();
    let threads = 8;
    let barrier = Barrier::new(threads);
    let results: Vec<Result<LeaveDays, WorkflowError>> = thread::scope(|s| {
        let service = &service;
        let barrier = &barrier;
        let handles: Vec<_> = (0..threads)
            .map(|week| {
                let start = base + Duration::days(7 * i64::try_from(week).unwrap());
                s.spawn(move || {
                    barrier.wait();
                    service
                        .submit_request(SubmitLeaveRequest {
                            employee_id: employee,
                            leave_type: LeaveType::Sick,
                            start_date: start,
                            end_date: start + Duration::days(1),
                            half_day: None,
                            reason: "unwell".to_string(),
                            documentation_ref: None,
                        })
                        .map(|r| r.total_days)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 6, "six 2-day windows exhaust a balance of 12");
    for failure in results.iter().filter(|r| r.is_err()) {
        assert!(
            matches!(
                failure,
                Err(WorkflowError::Ledger(LedgerError::InsufficientBalance { .. }))
            ),
            "late submissions must fail on balance, got {failure:?}"
        );
    }

    let year = base.year();
    let balance = service.get_balance(employee, year).unwrap();
    assert_eq!(balance.balances.sick.used, days(dec!(12)));
    assert_eq!(balance.balances.sick.current, LeaveDays::ZERO);
    assert!(!balance.balances.sick.current.is_negative());
}

// ============================================================================
// Test: An adjustment storm preserves the balance equation
// ============================================================================
#[test]
fn test_concurrent_adjustments_preserve_equation() {
    // 40 total commits; 64 retries make exhaustion impossible.
    let service = service_with_retries(64);
    let hr = seed_employee(&service, EmployeeRole::Hr, None);
    let employee = seed_employee(&service, EmployeeRole::Employee, None);

    let threads = 4;
    let per_thread = 10;
    let barrier = Barrier::new(threads);
    thread::scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                barrier.wait();
                for _ in 0..per_thread {
                    service
                        .adjust_balance(
                            employee,
                            LeaveType::Casual,
                            LeaveDays::HALF,
                            "audit backfill",
                            hr,
                        )
                        .unwrap();
                }
            });
        }
    });

    let year = Utc::now().year();
    let balance = service.get_balance(employee, year).unwrap();
    let casual = balance.balances.casual;
    // 40 adjustments of +0.5 on top of the default 12.
    assert_eq!(casual.adjusted, days(dec!(20)));
    assert_eq!(casual.current, days(dec!(32)));
    assert_eq!(
        casual.current,
        casual.opening + casual.accrued + casual.adjusted + casual.carry_forward
            - casual.used
            - casual.lapsed,
        "the balance equation must hold after the storm"
    );
}

// ============================================================================
// Test: Approval racing cancellation settles on one state, ledger intact
// ============================================================================
#[test]
fn test_approve_cancel_race_settles_cleanly() {
    let service = service_with_retries(5);
    let manager = seed_employee(&service, EmployeeRole::Manager, None);
    let employee = seed_employee(&service, EmployeeRole::Employee, Some(manager));

    let monday = mid_year_monday();
    let request = service
        .submit_request(SubmitLeaveRequest {
            employee_id: employee,
            leave_type: LeaveType::Casual,
            start_date: monday,
            end_date: monday + Duration::days(2),
            half_day: None,
            reason: "planned time off".to_string(),
            documentation_ref: None,
        })
        .unwrap();

    let barrier = Barrier::new(2);
    let (approve_result, cancel_result) = thread::scope(|s| {
        let approve = s.spawn(|| {
            barrier.wait();
            service.decide(request.id, manager, Decision::Approve, None)
        });
        let cancel = s.spawn(|| {
            barrier.wait();
            service.cancel(request.id, employee, "plans changed")
        });
        (approve.join().unwrap(), cancel.join().unwrap())
    });

    // The cancellation always lands: either directly on the pending
    // request, or on the approved one with a refund.
    assert!(cancel_result.is_ok(), "cancellation must settle: {cancel_result:?}");
    if let Err(err) = &approve_result {
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    let final_state = service.list_requests(employee).remove(0);
    assert_eq!(final_state.status, RequestStatus::Cancelled);

    let balance = service.get_balance(employee, request.ledger_year).unwrap();
    assert_eq!(
        balance.balances.casual.current,
        days(dec!(12)),
        "any debit must have been refunded"
    );
    assert_eq!(balance.balances.casual.used, LeaveDays::ZERO);
}
