//! The leave type policy registry and its standard seed.

use kadro_shared::LeaveDays;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;

use crate::policy::error::PolicyError;
use crate::policy::types::{
    ApprovalWorkflow, CarryForwardRule, GenderApplicability, LeaveType, LeaveTypePolicy,
    PerLeaveType,
};

/// Holds the policy for every leave type.
///
/// The registry is fixed-shape: a policy always exists for each type, and
/// the only lookup failure mode is an inactive policy.
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    policies: PerLeaveType<LeaveTypePolicy>,
}

static STANDARD: Lazy<PolicyRegistry> = Lazy::new(PolicyRegistry::build_standard);

impl PolicyRegistry {
    /// Creates a registry from a full per-type policy record.
    #[must_use]
    pub fn new(policies: PerLeaveType<LeaveTypePolicy>) -> Self {
        Self { policies }
    }

    /// The standard policy set shipped with the system.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Returns the policy for a leave type.
    #[must_use]
    pub fn get(&self, code: LeaveType) -> &LeaveTypePolicy {
        self.policies.get(code)
    }

    /// Returns the policy for a leave type, failing if it is inactive.
    pub fn get_active(&self, code: LeaveType) -> Result<&LeaveTypePolicy, PolicyError> {
        let policy = self.policies.get(code);
        if policy.is_active {
            Ok(policy)
        } else {
            Err(PolicyError::PolicyInactive(code))
        }
    }

    /// Iterates over the currently offered policies.
    pub fn list_active(&self) -> impl Iterator<Item = &LeaveTypePolicy> {
        self.policies
            .iter()
            .map(|(_, policy)| policy)
            .filter(|policy| policy.is_active)
    }

    fn build_standard() -> Self {
        Self::new(PerLeaveType {
            casual: LeaveTypePolicy {
                code: LeaveType::Casual,
                name: "Casual Leave".to_string(),
                is_paid: true,
                requires_approval: true,
                approval_workflow: ApprovalWorkflow::Manager,
                accrual_rate: LeaveDays::ONE,
                max_accrual: LeaveDays::whole(12),
                default_balance: LeaveDays::whole(12),
                carry_forward: CarryForwardRule::none(),
                min_duration: LeaveDays::HALF,
                max_duration: LeaveDays::whole(30),
                min_notice_days: 2,
                applicable_for: GenderApplicability::All,
                min_service_months: 0,
                probation_eligible: true,
                requires_documentation: false,
                blackout_periods: Vec::new(),
                is_active: true,
            },
            sick: LeaveTypePolicy {
                code: LeaveType::Sick,
                name: "Sick Leave".to_string(),
                is_paid: true,
                requires_approval: false,
                approval_workflow: ApprovalWorkflow::Auto,
                accrual_rate: LeaveDays::ONE,
                max_accrual: LeaveDays::whole(12),
                default_balance: LeaveDays::whole(12),
                carry_forward: CarryForwardRule::none(),
                min_duration: LeaveDays::HALF,
                max_duration: LeaveDays::whole(10),
                min_notice_days: 0,
                applicable_for: GenderApplicability::All,
                min_service_months: 0,
                probation_eligible: true,
                requires_documentation: false,
                blackout_periods: Vec::new(),
                is_active: true,
            },
            earned: LeaveTypePolicy {
                code: LeaveType::Earned,
                name: "Earned Leave".to_string(),
                is_paid: true,
                requires_approval: true,
                approval_workflow: ApprovalWorkflow::Both,
                accrual_rate: LeaveDays::ONE + LeaveDays::HALF,
                max_accrual: LeaveDays::whole(30),
                default_balance: LeaveDays::ZERO,
                carry_forward: CarryForwardRule {
                    allowed: true,
                    max_days: LeaveDays::whole(30),
                    expiry_months: Some(3),
                    percentage: Decimal::from(80),
                },
                min_duration: LeaveDays::ONE,
                max_duration: LeaveDays::whole(30),
                min_notice_days: 7,
                applicable_for: GenderApplicability::All,
                min_service_months: 12,
                probation_eligible: false,
                requires_documentation: false,
                blackout_periods: Vec::new(),
                is_active: true,
            },
            maternity: LeaveTypePolicy {
                code: LeaveType::Maternity,
                name: "Maternity Leave".to_string(),
                is_paid: true,
                requires_approval: true,
                approval_workflow: ApprovalWorkflow::Hr,
                accrual_rate: LeaveDays::ZERO,
                max_accrual: LeaveDays::ZERO,
                default_balance: LeaveDays::whole(182),
                carry_forward: CarryForwardRule::none(),
                min_duration: LeaveDays::whole(7),
                max_duration: LeaveDays::whole(182),
                min_notice_days: 30,
                applicable_for: GenderApplicability::Female,
                min_service_months: 6,
                probation_eligible: false,
                requires_documentation: true,
                blackout_periods: Vec::new(),
                is_active: true,
            },
            paternity: LeaveTypePolicy {
                code: LeaveType::Paternity,
                name: "Paternity Leave".to_string(),
                is_paid: true,
                requires_approval: true,
                approval_workflow: ApprovalWorkflow::Hr,
                accrual_rate: LeaveDays::ZERO,
                max_accrual: LeaveDays::ZERO,
                default_balance: LeaveDays::whole(15),
                carry_forward: CarryForwardRule::none(),
                min_duration: LeaveDays::ONE,
                max_duration: LeaveDays::whole(15),
                min_notice_days: 15,
                applicable_for: GenderApplicability::Male,
                min_service_months: 6,
                probation_eligible: false,
                requires_documentation: true,
                blackout_periods: Vec::new(),
                is_active: true,
            },
            unpaid: LeaveTypePolicy {
                code: LeaveType::Unpaid,
                name: "Unpaid Leave".to_string(),
                is_paid: false,
                requires_approval: true,
                approval_workflow: ApprovalWorkflow::Both,
                accrual_rate: LeaveDays::ZERO,
                max_accrual: LeaveDays::ZERO,
                default_balance: LeaveDays::whole(30),
                carry_forward: CarryForwardRule::none(),
                min_duration: LeaveDays::HALF,
                max_duration: LeaveDays::whole(30),
                min_notice_days: 3,
                applicable_for: GenderApplicability::All,
                min_service_months: 0,
                probation_eligible: true,
                requires_documentation: false,
                blackout_periods: Vec::new(),
                is_active: true,
            },
        })
    }
}
