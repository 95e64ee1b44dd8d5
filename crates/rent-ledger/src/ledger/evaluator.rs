use crate::calendar::{BillingPeriod, EthiopianDate, MONTHS_PER_YEAR};

use super::domain::{PaymentRecord, RentCellStatus, Tenancy};

/// Compute the status of one rent cell for a room.
///
/// `tenancy` is the tenancy covering (or nearest to) the queried period,
/// `None` when the room was never let. `payments` are the room's recorded
/// toggles; the lookup key is the (year, month) pair.
pub fn evaluate(
    tenancy: Option<&Tenancy>,
    payments: &[PaymentRecord],
    period: BillingPeriod,
    today: &EthiopianDate,
) -> RentCellStatus {
    let Some(tenancy) = tenancy else {
        return RentCellStatus::NotApplicable;
    };

    if !tenancy.occupies(period) {
        return RentCellStatus::Vacant;
    }

    let record = payments
        .iter()
        .find(|payment| payment.period() == period);

    if let Some(record) = record {
        if record.is_paid {
            return RentCellStatus::Paid;
        }
    }

    // Absent and present-but-unpaid promote to overdue identically: the
    // month is past, or it is the current month and the due day has gone by.
    let ordinal = period.ordinal();
    let today_ordinal = today.period().ordinal();
    if ordinal < today_ordinal {
        RentCellStatus::Overdue
    } else if ordinal == today_ordinal && today.day() > tenancy.due_day {
        RentCellStatus::Overdue
    } else {
        RentCellStatus::Unpaid
    }
}

/// Evaluate all thirteen cells of one calendar year for a room, in month
/// order. Backs the ledger row the dashboard renders.
pub fn year_row(
    tenancy: Option<&Tenancy>,
    payments: &[PaymentRecord],
    year: i32,
    today: &EthiopianDate,
) -> Vec<RentCellStatus> {
    (0..MONTHS_PER_YEAR)
        .map(|month_index| {
            evaluate(tenancy, payments, BillingPeriod { year, month_index }, today)
        })
        .collect()
}

/// Whether the given period is settled.
pub fn is_paid(
    tenancy: Option<&Tenancy>,
    payments: &[PaymentRecord],
    period: BillingPeriod,
    today: &EthiopianDate,
) -> bool {
    evaluate(tenancy, payments, period, today) == RentCellStatus::Paid
}
