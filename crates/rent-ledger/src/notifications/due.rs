use crate::calendar::{days_in_month, BillingPeriod, CalendarError, EthiopianDate};
use crate::ledger::domain::Tenancy;

/// A billing period's due date together with the signed day distance from
/// "today". Negative distance means the due date has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueDate {
    pub due: EthiopianDate,
    pub day_distance: i64,
}

/// Due date for the period "today" falls in.
pub fn due_date_for(tenancy: &Tenancy, today: &EthiopianDate) -> Result<DueDate, CalendarError> {
    due_for_period(tenancy, today.period(), today)
}

/// Due date for an arbitrary billing period.
///
/// The tenancy's due day is clamped to the period's month length: a due day
/// of 30 inside the five-day thirteenth month lands on day 5, it does not
/// roll into the next month. The distance is a difference of absolute day
/// ordinals, so an obligation left over from a previous month reports the
/// true number of elapsed days rather than a same-month remainder.
pub fn due_for_period(
    tenancy: &Tenancy,
    period: BillingPeriod,
    today: &EthiopianDate,
) -> Result<DueDate, CalendarError> {
    let length = days_in_month(period.year, period.month_index)?;
    let day = tenancy.due_day.min(length);
    let due = EthiopianDate::new(period.year, period.month_index, day)?;

    Ok(DueDate {
        due,
        day_distance: due.day_number() - today.day_number(),
    })
}
