//! Property-based tests for the balance ledger.

use chrono::{DateTime, Utc};
use kadro_shared::{EmployeeId, LeaveDays};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::ledger::balance::BalanceLedger;
use crate::ledger::types::AccrualPeriod;
use crate::policy::registry::PolicyRegistry;
use crate::policy::types::LeaveType;

/// One randomly chosen ledger mutation.
#[derive(Debug, Clone)]
enum LedgerOp {
    Debit(LeaveType, LeaveDays),
    Credit(LeaveType, LeaveDays),
    Adjust(LeaveType, LeaveDays),
    Accrue(LeaveType, AccrualPeriod),
}

/// Strategy for half-day-grid amounts between 0.5 and 10.0.
fn arb_amount() -> impl Strategy<Value = LeaveDays> {
    (1i64..=20).prop_map(|halves| LeaveDays::new(Decimal::new(halves * 5, 1)).unwrap())
}

/// Signed grid amounts between -10.0 and 10.0, excluding zero.
fn arb_signed_amount() -> impl Strategy<Value = LeaveDays> {
    (1i64..=20, any::<bool>()).prop_map(|(halves, negative)| {
        let halves = if negative { -halves } else { halves };
        LeaveDays::new(Decimal::new(halves * 5, 1)).unwrap()
    })
}

fn arb_leave_type() -> impl Strategy<Value = LeaveType> {
    proptest::sample::select(LeaveType::ALL.to_vec())
}

fn arb_period() -> impl Strategy<Value = AccrualPeriod> {
    (1u32..=12).prop_map(|month| AccrualPeriod::new(2025, month))
}

fn arb_op() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        (arb_leave_type(), arb_amount()).prop_map(|(t, d)| LedgerOp::Debit(t, d)),
        (arb_leave_type(), arb_amount()).prop_map(|(t, d)| LedgerOp::Credit(t, d)),
        (arb_leave_type(), arb_signed_amount()).prop_map(|(t, d)| LedgerOp::Adjust(t, d)),
        (arb_leave_type(), arb_period()).prop_map(|(t, p)| LedgerOp::Accrue(t, p)),
    ]
}

fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-15T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Applies an op, discarding business rule rejections.
fn apply(ledger: &mut BalanceLedger, op: &LedgerOp, actor: EmployeeId) {
    match op {
        LedgerOp::Debit(code, days) => {
            let _ = ledger.debit(*code, *days);
        }
        LedgerOp::Credit(code, days) => {
            let _ = ledger.credit(*code, *days);
        }
        LedgerOp::Adjust(code, delta) => {
            let _ = ledger.adjust(*code, *delta, "randomized correction", actor, fixed_now());
        }
        LedgerOp::Accrue(code, period) => {
            let policy = PolicyRegistry::standard().get(*code);
            let _ = ledger.accrue(*code, *period, policy.accrual_rate, policy.max_accrual);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Balance equation and sign rules under arbitrary operation sequences
    // =========================================================================

    /// After any sequence of operations, every type's current balance is
    /// non-negative and the stored components reproduce it exactly.
    #[test]
    fn prop_balance_never_negative(ops in proptest::collection::vec(arb_op(), 1..40)) {
        let actor = EmployeeId::new();
        let mut ledger =
            BalanceLedger::opened(EmployeeId::new(), 2025, PolicyRegistry::standard());

        for op in &ops {
            apply(&mut ledger, op, actor);
        }

        for code in LeaveType::ALL {
            let b = ledger.balance(code);
            prop_assert!(!ledger.current(code).is_negative(), "negative {code}");
            prop_assert!(!b.used.is_negative());
            prop_assert!(!b.lapsed.is_negative());
            prop_assert_eq!(
                ledger.current(code),
                b.opening + b.accrued + b.adjusted + b.carry_forward - b.used - b.lapsed
            );
        }
    }

    /// Replaying the identical accrual period any number of times adds
    /// exactly one period's worth.
    #[test]
    fn prop_accrual_replay_is_idempotent(replays in 1usize..6, month in 1u32..=12) {
        let registry = PolicyRegistry::standard();
        let policy = registry.get(LeaveType::Earned);
        let mut ledger = BalanceLedger::opened(EmployeeId::new(), 2025, registry);

        let period = AccrualPeriod::new(2025, month);
        let mut applied_count = 0u32;
        for _ in 0..replays {
            if ledger
                .accrue(LeaveType::Earned, period, policy.accrual_rate, policy.max_accrual)
                .unwrap()
            {
                applied_count += 1;
            }
        }

        prop_assert_eq!(applied_count, 1);
        prop_assert_eq!(
            ledger.balance(LeaveType::Earned).accrued,
            policy.accrual_rate
        );
    }

    /// The accrued component never exceeds the policy cap, no matter how
    /// many periods run.
    #[test]
    fn prop_accrued_never_exceeds_cap(periods in 1u32..36) {
        let registry = PolicyRegistry::standard();
        let policy = registry.get(LeaveType::Earned);
        let mut ledger = BalanceLedger::opened(EmployeeId::new(), 2025, registry);

        for i in 0..periods {
            let period = AccrualPeriod::new(2025 + i32::try_from(i / 12).unwrap_or(0), i % 12 + 1);
            let applied = ledger
                .accrue(LeaveType::Earned, period, policy.accrual_rate, policy.max_accrual)
                .unwrap();
            prop_assert!(applied, "strictly increasing periods must all apply");
        }

        prop_assert!(ledger.balance(LeaveType::Earned).accrued <= policy.max_accrual);
        if periods >= 20 {
            // 1.5 per period reaches the 30.0 cap at the 20th period.
            prop_assert_eq!(ledger.balance(LeaveType::Earned).accrued, policy.max_accrual);
        }
    }

    // =========================================================================
    // Rollover
    // =========================================================================

    /// Carry-forward never exceeds the cap or the percentage of current,
    /// the remainder lapses, and the source year locks.
    #[test]
    fn prop_rollover_bounds_carry(halves in 0i64..=120) {
        let registry = PolicyRegistry::standard();
        let starting = LeaveDays::new(Decimal::new(halves * 5, 1)).unwrap();
        let mut ledger = BalanceLedger::opened(EmployeeId::new(), 2025, registry);
        if starting.is_positive() {
            ledger
                .adjust(
                    LeaveType::Earned,
                    starting,
                    "seed for rollover",
                    EmployeeId::new(),
                    fixed_now(),
                )
                .unwrap();
        }
        let before = ledger.current(LeaveType::Earned);

        let carried = ledger.rollover(registry).unwrap();
        let carry = *carried.get(LeaveType::Earned);
        let rule = &registry.get(LeaveType::Earned).carry_forward;

        prop_assert!(carry <= rule.max_days);
        prop_assert!(carry <= before.percent_of(rule.percentage).max(LeaveDays::ZERO));
        prop_assert!(!carry.is_negative());
        prop_assert!(ledger.is_locked());

        // Source year keeps exactly the carried amount; the rest lapsed.
        prop_assert_eq!(ledger.current(LeaveType::Earned), carry);
    }
}
