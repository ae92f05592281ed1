//! Working-day calendar arithmetic.
//!
//! Weekends (Saturday and Sunday) are non-working. Public-holiday
//! exclusion belongs to an external holiday-calendar collaborator and is
//! deliberately not modeled here.

use chrono::{Datelike, NaiveDate, Weekday};
use kadro_shared::LeaveDays;

/// Returns true if the date falls on a working day (Mon-Fri).
#[must_use]
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts working days in the inclusive window `[start, end]`.
///
/// Returns 0 when `start > end`.
#[must_use]
pub fn working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if start > end {
        return 0;
    }
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_working_day(*d))
        .fold(0, |acc, _| acc + 1)
}

/// Computes the chargeable duration of a leave window.
///
/// Half-day requests are exactly 0.5 regardless of the date span;
/// full-day requests count working days in the window.
#[must_use]
pub fn total_leave_days(start: NaiveDate, end: NaiveDate, is_half_day: bool) -> LeaveDays {
    if is_half_day {
        LeaveDays::HALF
    } else {
        LeaveDays::whole(working_days(start, end))
    }
}

/// Counts working days of `[start, end]` that fall inside `[from, to]`.
#[must_use]
pub fn working_days_within(
    start: NaiveDate,
    end: NaiveDate,
    from: NaiveDate,
    to: NaiveDate,
) -> u32 {
    working_days(start.max(from), end.min(to))
}

/// Completed whole months between two dates.
///
/// A month counts only once its day-of-month anniversary has passed;
/// `to < from` yields zero.
#[must_use]
pub fn whole_months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to < from {
        return 0;
    }
    let mut months =
        i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month());
    if to.day() < from.day() {
        months -= 1;
    }
    u32::try_from(months.max(0)).unwrap_or(0)
}
