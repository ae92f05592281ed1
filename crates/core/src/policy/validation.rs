//! Eligibility and request validation against a leave type policy.
//!
//! All checks are pure: callers resolve the policy and employee profile,
//! compute the chargeable duration, and pass them in.

use chrono::NaiveDate;
use kadro_shared::LeaveDays;

use crate::employee::EmployeeProfile;
use crate::policy::error::PolicyError;
use crate::policy::types::LeaveTypePolicy;

/// Stateless policy validation service.
pub struct PolicyService;

impl PolicyService {
    /// Checks whether an employee may use a leave type at all.
    ///
    /// Evaluates gender applicability, minimum service months, and
    /// probation eligibility in that order, returning the first failure.
    pub fn check_eligibility(
        policy: &LeaveTypePolicy,
        employee: &EmployeeProfile,
        as_of: NaiveDate,
    ) -> Result<(), PolicyError> {
        if !policy.applicable_for.applies(employee.gender) {
            return Err(PolicyError::GenderNotApplicable(policy.code));
        }

        let actual_months = employee.service_months(as_of);
        if actual_months < policy.min_service_months {
            return Err(PolicyError::InsufficientService {
                required_months: policy.min_service_months,
                actual_months,
            });
        }

        if employee.on_probation && !policy.probation_eligible {
            return Err(PolicyError::ProbationNotEligible(policy.code));
        }

        Ok(())
    }

    /// Validates that the request window is not inverted.
    pub fn validate_window(start: NaiveDate, end: NaiveDate) -> Result<(), PolicyError> {
        if start > end {
            return Err(PolicyError::InvalidDateRange { start, end });
        }
        Ok(())
    }

    /// Validates a request against the policy's duration, notice,
    /// blackout, and documentation rules.
    ///
    /// `total_days` is the chargeable duration already computed from the
    /// window. The notice check is skipped for zero-notice policies,
    /// which also permits backdated requests for them.
    pub fn validate_request(
        policy: &LeaveTypePolicy,
        total_days: LeaveDays,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
        has_documentation: bool,
    ) -> Result<(), PolicyError> {
        if total_days < policy.min_duration {
            return Err(PolicyError::DurationBelowMinimum {
                minimum: policy.min_duration,
                requested: total_days,
            });
        }
        if total_days > policy.max_duration {
            return Err(PolicyError::DurationExceedsMaximum {
                maximum: policy.max_duration,
                requested: total_days,
            });
        }

        if policy.min_notice_days > 0 {
            let actual_days = (start - today).num_days();
            if actual_days < policy.min_notice_days {
                return Err(PolicyError::InsufficientNotice {
                    required_days: policy.min_notice_days,
                    actual_days,
                });
            }
        }

        for blackout in &policy.blackout_periods {
            if blackout.overlaps(start, end) {
                return Err(PolicyError::BlackoutOverlap {
                    period: blackout.name.clone(),
                });
            }
        }

        if policy.requires_documentation && !has_documentation {
            return Err(PolicyError::DocumentationRequired(policy.code));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::{EmployeeRole, Gender};
    use crate::policy::registry::PolicyRegistry;
    use crate::policy::types::{BlackoutPeriod, LeaveType};
    use kadro_shared::EmployeeId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
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

    #[test]
    fn test_eligibility_gender_checked_first() {
        let maternity = PolicyRegistry::standard().get(LeaveType::Maternity);
        // Male employee who also lacks service months: the gender failure
        // must win because it is evaluated first.
        let emp = employee(Gender::Male, date(2025, 1, 1), true);
        assert_eq!(
            PolicyService::check_eligibility(maternity, &emp, date(2025, 2, 1)),
            Err(PolicyError::GenderNotApplicable(LeaveType::Maternity))
        );
    }

    #[test]
    fn test_eligibility_service_months() {
        let maternity = PolicyRegistry::standard().get(LeaveType::Maternity);
        let emp = employee(Gender::Female, date(2025, 1, 1), false);
        assert_eq!(
            PolicyService::check_eligibility(maternity, &emp, date(2025, 4, 1)),
            Err(PolicyError::InsufficientService {
                required_months: 6,
                actual_months: 3,
            })
        );
        assert!(
            PolicyService::check_eligibility(maternity, &emp, date(2025, 8, 1)).is_ok()
        );
    }

    #[test]
    fn test_eligibility_probation() {
        let earned = PolicyRegistry::standard().get(LeaveType::Earned);
        let emp = employee(Gender::Other, date(2023, 1, 1), true);
        assert_eq!(
            PolicyService::check_eligibility(earned, &emp, date(2025, 1, 1)),
            Err(PolicyError::ProbationNotEligible(LeaveType::Earned))
        );
    }

    #[test]
    fn test_window_validation() {
        assert!(PolicyService::validate_window(date(2025, 3, 1), date(2025, 3, 1)).is_ok());
        assert_eq!(
            PolicyService::validate_window(date(2025, 3, 2), date(2025, 3, 1)),
            Err(PolicyError::InvalidDateRange {
                start: date(2025, 3, 2),
                end: date(2025, 3, 1),
            })
        );
    }

    #[test]
    fn test_duration_bounds() {
        let casual = PolicyRegistry::standard().get(LeaveType::Casual);
        let today = date(2025, 3, 1);

        let too_small = PolicyService::validate_request(
            casual,
            LeaveDays::ZERO,
            date(2025, 3, 10),
            date(2025, 3, 10),
            today,
            false,
        );
        assert!(matches!(
            too_small,
            Err(PolicyError::DurationBelowMinimum { .. })
        ));

        let too_big = PolicyService::validate_request(
            casual,
            LeaveDays::whole(31),
            date(2025, 3, 10),
            date(2025, 4, 25),
            today,
            false,
        );
        assert!(matches!(
            too_big,
            Err(PolicyError::DurationExceedsMaximum { .. })
        ));
    }

    #[test]
    fn test_notice_period_enforced() {
        let earned = PolicyRegistry::standard().get(LeaveType::Earned);
        let today = date(2025, 3, 3);

        let result = PolicyService::validate_request(
            earned,
            LeaveDays::whole(2),
            date(2025, 3, 5),
            date(2025, 3, 6),
            today,
            false,
        );
        assert_eq!(
            result,
            Err(PolicyError::InsufficientNotice {
                required_days: 7,
                actual_days: 2,
            })
        );

        assert!(
            PolicyService::validate_request(
                earned,
                LeaveDays::whole(2),
                date(2025, 3, 10),
                date(2025, 3, 11),
                today,
                false,
            )
            .is_ok()
        );
    }

    #[test]
    fn test_zero_notice_allows_backdating() {
        let sick = PolicyRegistry::standard().get(LeaveType::Sick);
        // Reported two days after the absence started.
        let result = PolicyService::validate_request(
            sick,
            LeaveDays::whole(2),
            date(2025, 3, 3),
            date(2025, 3, 4),
            date(2025, 3, 5),
            false,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_blackout_rejection() {
        let mut casual = PolicyRegistry::standard().get(LeaveType::Casual).clone();
        casual.blackout_periods.push(BlackoutPeriod {
            name: "year-end close".to_string(),
            start_month: 12,
            start_day: 24,
            end_month: 12,
            end_day: 31,
        });

        let result = PolicyService::validate_request(
            &casual,
            LeaveDays::whole(2),
            date(2025, 12, 29),
            date(2025, 12, 30),
            date(2025, 12, 1),
            false,
        );
        assert_eq!(
            result,
            Err(PolicyError::BlackoutOverlap {
                period: "year-end close".to_string(),
            })
        );
    }

    #[test]
    fn test_documentation_required() {
        let maternity = PolicyRegistry::standard().get(LeaveType::Maternity);
        let today = date(2025, 1, 1);

        let missing = PolicyService::validate_request(
            maternity,
            LeaveDays::whole(84),
            date(2025, 3, 3),
            date(2025, 6, 27),
            today,
            false,
        );
        assert_eq!(
            missing,
            Err(PolicyError::DocumentationRequired(LeaveType::Maternity))
        );

        assert!(
            PolicyService::validate_request(
                maternity,
                LeaveDays::whole(84),
                date(2025, 3, 3),
                date(2025, 6, 27),
                today,
                true,
            )
            .is_ok()
        );
    }
}
