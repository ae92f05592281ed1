//! Leave type policy domain types.
//!
//! Policies are keyed by the closed [`LeaveType`] set rather than free
//! strings, so every per-type table in the system is a fixed-shape record
//! with compile-time exhaustiveness.

use chrono::{Datelike, NaiveDate};
use kadro_shared::LeaveDays;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::employee::Gender;

/// The closed set of leave categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LeaveType {
    /// Short-notice personal leave.
    Casual,
    /// Sickness absence; zero notice, auto-approved.
    Sick,
    /// Earned (privilege) leave accrued through service.
    Earned,
    /// Maternity leave.
    Maternity,
    /// Paternity leave.
    Paternity,
    /// Unpaid leave.
    Unpaid,
}

impl LeaveType {
    /// Every leave type, in a stable order.
    pub const ALL: [Self; 6] = [
        Self::Casual,
        Self::Sick,
        Self::Earned,
        Self::Maternity,
        Self::Paternity,
        Self::Unpaid,
    ];

    /// Returns the uppercase code for this type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Casual => "CASUAL",
            Self::Sick => "SICK",
            Self::Earned => "EARNED",
            Self::Maternity => "MATERNITY",
            Self::Paternity => "PATERNITY",
            Self::Unpaid => "UNPAID",
        }
    }
}

impl std::fmt::Display for LeaveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LeaveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CASUAL" => Ok(Self::Casual),
            "SICK" => Ok(Self::Sick),
            "EARNED" => Ok(Self::Earned),
            "MATERNITY" => Ok(Self::Maternity),
            "PATERNITY" => Ok(Self::Paternity),
            "UNPAID" => Ok(Self::Unpaid),
            _ => Err(format!("Unknown leave type: {s}")),
        }
    }
}

/// A record holding one value per leave type.
///
/// Replaces the dynamic string-keyed maps of older HR schemas: adding a
/// leave type extends this struct and the compiler finds every site that
/// must handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PerLeaveType<T> {
    /// Value for casual leave.
    pub casual: T,
    /// Value for sick leave.
    pub sick: T,
    /// Value for earned leave.
    pub earned: T,
    /// Value for maternity leave.
    pub maternity: T,
    /// Value for paternity leave.
    pub paternity: T,
    /// Value for unpaid leave.
    pub unpaid: T,
}

impl<T> PerLeaveType<T> {
    /// Builds a record by evaluating `f` for every leave type.
    pub fn from_fn(mut f: impl FnMut(LeaveType) -> T) -> Self {
        Self {
            casual: f(LeaveType::Casual),
            sick: f(LeaveType::Sick),
            earned: f(LeaveType::Earned),
            maternity: f(LeaveType::Maternity),
            paternity: f(LeaveType::Paternity),
            unpaid: f(LeaveType::Unpaid),
        }
    }

    /// Returns the value for a leave type.
    #[must_use]
    pub fn get(&self, code: LeaveType) -> &T {
        match code {
            LeaveType::Casual => &self.casual,
            LeaveType::Sick => &self.sick,
            LeaveType::Earned => &self.earned,
            LeaveType::Maternity => &self.maternity,
            LeaveType::Paternity => &self.paternity,
            LeaveType::Unpaid => &self.unpaid,
        }
    }

    /// Returns a mutable reference to the value for a leave type.
    pub fn get_mut(&mut self, code: LeaveType) -> &mut T {
        match code {
            LeaveType::Casual => &mut self.casual,
            LeaveType::Sick => &mut self.sick,
            LeaveType::Earned => &mut self.earned,
            LeaveType::Maternity => &mut self.maternity,
            LeaveType::Paternity => &mut self.paternity,
            LeaveType::Unpaid => &mut self.unpaid,
        }
    }

    /// Iterates over `(type, value)` pairs in stable order.
    pub fn iter(&self) -> impl Iterator<Item = (LeaveType, &T)> {
        LeaveType::ALL.iter().map(move |code| (*code, self.get(*code)))
    }
}

/// Which genders a leave type applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderApplicability {
    /// Applies to every employee.
    All,
    /// Applies to male employees only.
    Male,
    /// Applies to female employees only.
    Female,
}

impl GenderApplicability {
    /// Returns true if the rule admits the given gender.
    #[must_use]
    pub fn applies(&self, gender: Gender) -> bool {
        match self {
            Self::All => true,
            Self::Male => gender == Gender::Male,
            Self::Female => gender == Gender::Female,
        }
    }
}

/// Approval routing for a leave type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalWorkflow {
    /// No approval; the request is debited and approved at submission.
    Auto,
    /// Single approval by the reporting manager.
    Manager,
    /// Single approval by HR.
    Hr,
    /// Manager approval first, then HR finalizes.
    Both,
}

impl ApprovalWorkflow {
    /// Returns the string representation of the workflow.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manager => "manager",
            Self::Hr => "hr",
            Self::Both => "both",
        }
    }

    /// Parses a workflow from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "manager" => Some(Self::Manager),
            "hr" => Some(Self::Hr),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApprovalWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Carry-forward rule applied at year-end rollover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryForwardRule {
    /// Whether unused balance may roll into the next year.
    pub allowed: bool,
    /// Hard cap on carried days.
    pub max_days: LeaveDays,
    /// Months into the new year after which carried days lapse.
    pub expiry_months: Option<u32>,
    /// Percentage of the remaining balance that carries.
    pub percentage: Decimal,
}

impl CarryForwardRule {
    /// A rule that carries nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            allowed: false,
            max_days: LeaveDays::ZERO,
            expiry_months: None,
            percentage: Decimal::ZERO,
        }
    }

    /// Computes the days carried from a year-end balance.
    ///
    /// `min(current × percentage/100, max_days)`, floored to the half-day
    /// grid; a non-positive balance carries nothing.
    #[must_use]
    pub fn carry_from(&self, current: LeaveDays) -> LeaveDays {
        if !self.allowed || !current.is_positive() {
            return LeaveDays::ZERO;
        }
        current.percent_of(self.percentage).min(self.max_days)
    }
}

/// A recurring blackout window during which a leave type cannot be taken.
///
/// Stored as month/day bounds and projected onto the request's year(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutPeriod {
    /// Human-readable label, e.g. "year-end close".
    pub name: String,
    /// First month of the window (1-12).
    pub start_month: u32,
    /// First day of the window.
    pub start_day: u32,
    /// Last month of the window (1-12).
    pub end_month: u32,
    /// Last day of the window.
    pub end_day: u32,
}

impl BlackoutPeriod {
    /// Projects the window onto a calendar year.
    ///
    /// Returns `None` if the month/day bounds do not exist in that year
    /// or the window is inverted.
    #[must_use]
    pub fn range_for_year(&self, year: i32) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(year, self.start_month, self.start_day)?;
        let end = NaiveDate::from_ymd_opt(year, self.end_month, self.end_day)?;
        (start <= end).then_some((start, end))
    }

    /// Returns true if the request window touches this blackout in any
    /// year the request spans.
    #[must_use]
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        for year in [start.year(), end.year()] {
            if let Some((bs, be)) = self.range_for_year(year)
                && bs <= end
                && start <= be
            {
                return true;
            }
        }
        false
    }
}

/// Policy configuration for one leave type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveTypePolicy {
    /// The leave type this policy governs.
    pub code: LeaveType,
    /// Display name.
    pub name: String,
    /// Whether days under this type are paid.
    pub is_paid: bool,
    /// Whether requests need any approval at all.
    pub requires_approval: bool,
    /// How approvals route.
    pub approval_workflow: ApprovalWorkflow,
    /// Days accrued per month.
    pub accrual_rate: LeaveDays,
    /// Cap on the accrued component.
    pub max_accrual: LeaveDays,
    /// Opening grant for an employee's first-ever ledger year.
    pub default_balance: LeaveDays,
    /// Year-end carry-forward rule.
    pub carry_forward: CarryForwardRule,
    /// Minimum chargeable duration per request.
    pub min_duration: LeaveDays,
    /// Maximum chargeable duration per request.
    pub max_duration: LeaveDays,
    /// Days of advance notice required; zero disables the notice check
    /// (and thereby permits backdated requests).
    pub min_notice_days: i64,
    /// Gender applicability.
    pub applicable_for: GenderApplicability,
    /// Months of service required before the type is available.
    pub min_service_months: u32,
    /// Whether employees on probation may use the type.
    pub probation_eligible: bool,
    /// Whether a documentation reference must accompany the request.
    pub requires_documentation: bool,
    /// Recurring windows during which the type cannot be taken.
    pub blackout_periods: Vec<BlackoutPeriod>,
    /// Whether the policy is currently offered.
    pub is_active: bool,
}

impl LeaveTypePolicy {
    /// Returns true if the type requires no advance notice.
    #[must_use]
    pub fn has_zero_notice(&self) -> bool {
        self.min_notice_days == 0
    }

    /// Returns true if the type accrues monthly.
    #[must_use]
    pub fn accrues(&self) -> bool {
        self.accrual_rate.is_positive()
    }
}
