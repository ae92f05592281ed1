//! Property-based tests for policy eligibility and request validation.

use chrono::{Days, NaiveDate};
use kadro_shared::{EmployeeId, LeaveDays};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::employee::{EmployeeProfile, EmployeeRole, Gender};
use crate::policy::error::PolicyError;
use crate::policy::registry::PolicyRegistry;
use crate::policy::types::LeaveType;
use crate::policy::validation::PolicyService;

/// Strategy for dates safely inside the calendar (no leap-day edge).
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2024i32..2028, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Strategy for half-day-grid durations between 0.5 and 30.0 days.
fn arb_duration() -> impl Strategy<Value = LeaveDays> {
    (1i64..=60).prop_map(|halves| LeaveDays::new(Decimal::new(halves * 5, 1)).unwrap())
}

fn arb_gender() -> impl Strategy<Value = Gender> {
    prop_oneof![Just(Gender::Male), Just(Gender::Female), Just(Gender::Other)]
}

fn arb_leave_type() -> impl Strategy<Value = LeaveType> {
    proptest::sample::select(LeaveType::ALL.to_vec())
}

fn employee(gender: Gender, joining: NaiveDate, on_probation: bool) -> EmployeeProfile {
    EmployeeProfile {
        id: EmployeeId::new(),
        gender,
        reporting_manager: Some(EmployeeId::new()),
        joining_date: joining,
        on_probation,
        role: EmployeeRole::Employee,
        active: true,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Window validation
    // =========================================================================

    /// An inverted window is always rejected, any other ordering accepted.
    #[test]
    fn prop_window_rejects_only_inverted(start in arb_date(), end in arb_date()) {
        let result = PolicyService::validate_window(start, end);
        if start > end {
            prop_assert_eq!(result, Err(PolicyError::InvalidDateRange { start, end }));
        } else {
            prop_assert!(result.is_ok());
        }
    }

    // =========================================================================
    // Duration bounds
    // =========================================================================

    /// A duration outside [min_duration, max_duration] never validates.
    #[test]
    fn prop_duration_outside_bounds_rejected(
        code in arb_leave_type(),
        duration in arb_duration(),
        start in arb_date(),
    ) {
        let policy = PolicyRegistry::standard().get(code);
        let end = start
            .checked_add_days(Days::new(60))
            .unwrap();
        // Generous notice so the duration check is the one under test.
        let today = start.checked_sub_days(Days::new(365)).unwrap();

        let result = PolicyService::validate_request(
            policy, duration, start, end, today, true,
        );
        if duration < policy.min_duration {
            prop_assert_eq!(
                result,
                Err(PolicyError::DurationBelowMinimum {
                    minimum: policy.min_duration,
                    requested: duration,
                })
            );
        } else if duration > policy.max_duration {
            prop_assert_eq!(
                result,
                Err(PolicyError::DurationExceedsMaximum {
                    maximum: policy.max_duration,
                    requested: duration,
                })
            );
        } else {
            prop_assert!(result.is_ok(), "unexpected rejection: {:?}", result);
        }
    }

    // =========================================================================
    // Notice period
    // =========================================================================

    /// Zero-notice policies never fail the notice check, even backdated.
    #[test]
    fn prop_zero_notice_never_rejects_backdated(
        lead_days in 0u64..30,
        start in arb_date(),
    ) {
        let policy = PolicyRegistry::standard().get(LeaveType::Sick);
        prop_assume!(policy.has_zero_notice());
        // Today is after the leave started.
        let today = start.checked_add_days(Days::new(lead_days)).unwrap();

        let result = PolicyService::validate_request(
            policy,
            LeaveDays::ONE,
            start,
            start,
            today,
            false,
        );
        prop_assert_ne!(
            result,
            Err(PolicyError::InsufficientNotice {
                required_days: policy.min_notice_days,
                actual_days: (start - today).num_days(),
            })
        );
    }

    /// Positive-notice policies reject any request with less lead time.
    #[test]
    fn prop_short_notice_rejected(lead_days in 0i64..7, start in arb_date()) {
        let policy = PolicyRegistry::standard().get(LeaveType::Earned);
        prop_assume!(lead_days < policy.min_notice_days);
        let today = start
            .checked_sub_days(Days::new(lead_days.unsigned_abs()))
            .unwrap();

        let result = PolicyService::validate_request(
            policy,
            LeaveDays::whole(2),
            start,
            start.checked_add_days(Days::new(1)).unwrap(),
            today,
            false,
        );
        prop_assert_eq!(
            result,
            Err(PolicyError::InsufficientNotice {
                required_days: policy.min_notice_days,
                actual_days: lead_days,
            })
        );
    }

    // =========================================================================
    // Eligibility ordering
    // =========================================================================

    /// Gender applicability is evaluated before service and probation, so a
    /// gender mismatch wins no matter what the rest of the profile says.
    #[test]
    fn prop_gender_failure_wins(
        on_probation in any::<bool>(),
        joining in arb_date(),
        as_of in arb_date(),
    ) {
        let policy = PolicyRegistry::standard().get(LeaveType::Maternity);
        let emp = employee(Gender::Male, joining, on_probation);
        prop_assert_eq!(
            PolicyService::check_eligibility(policy, &emp, as_of),
            Err(PolicyError::GenderNotApplicable(LeaveType::Maternity))
        );
    }

    /// An eligible profile passes every standard policy's eligibility gate.
    #[test]
    fn prop_veteran_employee_always_eligible(
        code in arb_leave_type(),
        gender in arb_gender(),
    ) {
        let policy = PolicyRegistry::standard().get(code);
        prop_assume!(policy.applicable_for.applies(gender));
        // Five years of service, off probation: clears every gate.
        let emp = employee(gender, NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(), false);
        prop_assert!(
            PolicyService::check_eligibility(
                policy,
                &emp,
                NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
            )
            .is_ok()
        );
    }
}
