use crate::infra::{InMemoryRecipientDirectory, InMemoryRoomStore, LoggingGateway};
use chrono::{Local, NaiveDate};
use clap::Args;
use rent_ledger::calendar::{BillingPeriod, CalendarError, EthiopianDate};
use rent_ledger::config::AppConfig;
use rent_ledger::error::AppError;
use rent_ledger::ledger::{OwnerId, PaymentRecord, Room, RoomId, RoomSnapshot, Tenancy, TenancyId};
use rent_ledger::notifications::templates::format_date;
use rent_ledger::notifications::{
    DispatchError, DispatchOutcome, Language, NotificationDispatcher, RecipientHandle,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ScanArgs {
    /// Evaluate the ledger as of this Gregorian date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_scan(args: ScanArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let eth_today = EthiopianDate::from_gregorian(today);

    let snapshots = seed_snapshots(config.notifications.rent_amount, eth_today)
        .map_err(DispatchError::from)?;
    let store = Arc::new(InMemoryRoomStore::new(snapshots));
    let directory = Arc::new(seed_directory());
    let gateway = Arc::new(LoggingGateway::default());
    let dispatcher = NotificationDispatcher::new(store, directory, gateway.clone());

    let result = dispatcher.run_at(today)?;

    println!("Rent notification scan");
    println!(
        "- as of {} / {}",
        today,
        format_date(&eth_today, Language::En)
    );
    println!("- {} sent | {} failed", result.sent, result.failed);
    for detail in &result.details {
        println!(
            "  - {} ({}): {} -> {}",
            detail.room,
            detail.renter,
            detail.kind.label(),
            outcome_label(detail.outcome)
        );
    }

    let deliveries = gateway.sent();
    if !deliveries.is_empty() {
        println!("\nDelivered messages:");
        for (recipient, text) in deliveries {
            println!("--- to {} ---", recipient.0);
            println!("{text}");
        }
    }

    Ok(())
}

fn outcome_label(outcome: DispatchOutcome) -> &'static str {
    match outcome {
        DispatchOutcome::Sent => "sent",
        DispatchOutcome::Failed => "failed",
        DispatchOutcome::AlreadyNotified => "already notified",
        DispatchOutcome::NoRecipient => "no recipient registered",
    }
}

/// Demo landlords: one English-speaking, one Amharic-speaking.
pub(crate) fn seed_directory() -> InMemoryRecipientDirectory {
    let mut directory = InMemoryRecipientDirectory::default();
    directory.register(
        OwnerId("landlord-aster".to_string()),
        RecipientHandle("chat-1001".to_string()),
        Language::En,
    );
    directory.register(
        OwnerId("landlord-saba".to_string()),
        RecipientHandle("chat-1002".to_string()),
        Language::Am,
    );
    directory
}

/// Seed rooms positioned around `today` so a scan exercises every
/// notification kind: one rent due in two days, one due today, one overdue
/// from the previous month, one settled, one vacant, one moving in tomorrow.
pub(crate) fn seed_snapshots(
    rent_amount: u32,
    today: EthiopianDate,
) -> Result<Vec<RoomSnapshot>, CalendarError> {
    let current = today.period();
    let last_year = today.year() - 1;
    let aster = OwnerId("landlord-aster".to_string());
    let saba = OwnerId("landlord-saba".to_string());

    let due_in_two = (today.day() + 2).min(30);
    let reminder = tenancy(
        "tenancy-101",
        "room-101",
        "Abebe Bekele",
        EthiopianDate::new(last_year, 0, due_in_two)?,
    );
    let reminder_payments = paid_between("room-101", reminder.move_in.period(), current);

    let due_today = tenancy(
        "tenancy-102",
        "room-102",
        "Sara Tesfaye",
        EthiopianDate::new(last_year, 1, today.day())?,
    );
    let due_today_payments = paid_between("room-102", due_today.move_in.period(), current);

    // Settled through two months ago; the previous month is still owed.
    let overdue = tenancy(
        "tenancy-103",
        "room-103",
        "Dawit Haile",
        EthiopianDate::new(last_year, 2, 10)?,
    );
    let overdue_payments = paid_between("room-103", overdue.move_in.period(), previous(current));

    let settled = tenancy(
        "tenancy-104",
        "room-104",
        "Hanna Girma",
        EthiopianDate::new(last_year, 3, 5)?,
    );
    let settled_payments = paid_between("room-104", settled.move_in.period(), current.next());

    let arriving = tenancy("tenancy-106", "room-106", "Yonas Tadesse", today.next_day());

    Ok(vec![
        snapshot("room-101", "ROOM 101", &aster, rent_amount, Some(reminder), reminder_payments),
        snapshot("room-102", "ROOM 102", &aster, rent_amount, Some(due_today), due_today_payments),
        snapshot("room-103", "ROOM 103", &saba, rent_amount, Some(overdue), overdue_payments),
        snapshot("room-104", "ROOM 104", &aster, rent_amount, Some(settled), settled_payments),
        snapshot("room-105", "ROOM 105", &aster, rent_amount, None, Vec::new()),
        snapshot("room-106", "ROOM 106", &saba, rent_amount, Some(arriving), Vec::new()),
    ])
}

fn tenancy(id: &str, room_id: &str, renter: &str, move_in: EthiopianDate) -> Tenancy {
    Tenancy::starting(
        TenancyId(id.to_string()),
        RoomId(room_id.to_string()),
        renter,
        move_in,
    )
}

fn snapshot(
    room_id: &str,
    name: &str,
    owner: &OwnerId,
    rent_amount: u32,
    tenancy: Option<Tenancy>,
    payments: Vec<PaymentRecord>,
) -> RoomSnapshot {
    RoomSnapshot {
        room: Room {
            id: RoomId(room_id.to_string()),
            name: name.to_string(),
            owner_id: owner.clone(),
            monthly_rent: rent_amount,
        },
        tenancy,
        payments,
    }
}

fn previous(period: BillingPeriod) -> BillingPeriod {
    if period.month_index == 0 {
        BillingPeriod {
            year: period.year - 1,
            month_index: 12,
        }
    } else {
        BillingPeriod {
            year: period.year,
            month_index: period.month_index - 1,
        }
    }
}

/// Paid records for every period in `[from, until)`.
fn paid_between(room_id: &str, from: BillingPeriod, until: BillingPeriod) -> Vec<PaymentRecord> {
    let mut records = Vec::new();
    let mut period = from;
    while period.ordinal() < until.ordinal() {
        records.push(PaymentRecord {
            room_id: RoomId(room_id.to_string()),
            year: period.year,
            month_index: period.month_index,
            is_paid: true,
        });
        period = period.next();
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use rent_ledger::notifications::NotificationKind;

    fn fixed_today() -> EthiopianDate {
        EthiopianDate::new(2017, 1, 10).expect("valid date")
    }

    #[test]
    fn seeds_cover_every_recurring_notification_kind() {
        let today = fixed_today();
        let store = Arc::new(InMemoryRoomStore::new(
            seed_snapshots(5000, today).expect("seeds build"),
        ));
        let directory = Arc::new(seed_directory());
        let gateway = Arc::new(LoggingGateway::default());
        let dispatcher = NotificationDispatcher::new(store, directory, gateway.clone());

        let result = dispatcher
            .run_at(today.to_gregorian())
            .expect("scan completes");

        assert_eq!(result.sent, 4);
        assert_eq!(result.failed, 0);

        let kinds: Vec<NotificationKind> = result.details.iter().map(|d| d.kind).collect();
        assert!(kinds.contains(&NotificationKind::DueSoon));
        assert!(kinds.contains(&NotificationKind::DueToday));
        assert!(kinds.contains(&NotificationKind::Overdue));
        assert!(kinds.contains(&NotificationKind::MoveInTomorrow));

        // The vacant room and the settled room stay silent.
        assert!(!result.details.iter().any(|d| d.room == "ROOM 104"));
        assert!(!result.details.iter().any(|d| d.room == "ROOM 105"));
    }

    #[test]
    fn amharic_landlord_receives_localized_text() {
        let today = fixed_today();
        let store = Arc::new(InMemoryRoomStore::new(
            seed_snapshots(5000, today).expect("seeds build"),
        ));
        let directory = Arc::new(seed_directory());
        let gateway = Arc::new(LoggingGateway::default());
        let dispatcher = NotificationDispatcher::new(store, directory, gateway.clone());

        dispatcher
            .run_at(today.to_gregorian())
            .expect("scan completes");

        let amharic: Vec<String> = gateway
            .sent()
            .into_iter()
            .filter(|(recipient, _)| recipient.0 == "chat-1002")
            .map(|(_, text)| text)
            .collect();
        assert!(!amharic.is_empty());
        assert!(amharic.iter().any(|text| text.contains("ያለፈበት")));
    }
}
