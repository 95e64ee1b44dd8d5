use std::sync::{Arc, Mutex};

use rent_ledger::calendar::EthiopianDate;
use rent_ledger::ledger::{
    OwnerId, PaymentRecord, Room, RoomId, RoomSnapshot, RoomStore, StoreError, Tenancy, TenancyId,
};
use rent_ledger::notifications::templates::format_date;
use rent_ledger::notifications::{
    DispatchError, DispatchOutcome, GatewayError, Language, MessageGateway,
    NotificationDispatcher, NotificationKind, RecipientDirectory, RecipientHandle,
};

#[derive(Default)]
struct MemoryStore {
    snapshots: Mutex<Vec<RoomSnapshot>>,
}

impl MemoryStore {
    fn new(snapshots: Vec<RoomSnapshot>) -> Self {
        Self {
            snapshots: Mutex::new(snapshots),
        }
    }

    fn replace(&self, snapshots: Vec<RoomSnapshot>) {
        *self.snapshots.lock().expect("store mutex poisoned") = snapshots;
    }
}

impl RoomStore for MemoryStore {
    fn list_rooms(&self) -> Result<Vec<RoomSnapshot>, StoreError> {
        Ok(self.snapshots.lock().expect("store mutex poisoned").clone())
    }
}

struct FailingStore;

impl RoomStore for FailingStore {
    fn list_rooms(&self) -> Result<Vec<RoomSnapshot>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

struct Directory;

impl RecipientDirectory for Directory {
    fn resolve(&self, owner: &OwnerId) -> Option<RecipientHandle> {
        Some(RecipientHandle(format!("chat-{}", owner.0)))
    }

    fn language_of(&self, _recipient: &RecipientHandle) -> Language {
        Language::En
    }
}

struct EmptyDirectory;

impl RecipientDirectory for EmptyDirectory {
    fn resolve(&self, _owner: &OwnerId) -> Option<RecipientHandle> {
        None
    }

    fn language_of(&self, _recipient: &RecipientHandle) -> Language {
        Language::En
    }
}

#[derive(Default)]
struct RecordingGateway {
    sent: Mutex<Vec<String>>,
    failures_remaining: Mutex<u32>,
}

impl RecordingGateway {
    fn failing(times: u32) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failures_remaining: Mutex::new(times),
        }
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().expect("gateway mutex poisoned").clone()
    }
}

impl MessageGateway for RecordingGateway {
    fn send(&self, _recipient: &RecipientHandle, text: &str) -> Result<(), GatewayError> {
        let mut failures = self
            .failures_remaining
            .lock()
            .expect("gateway mutex poisoned");
        if *failures > 0 {
            *failures -= 1;
            return Err(GatewayError::Transport("connection reset".to_string()));
        }
        self.sent
            .lock()
            .expect("gateway mutex poisoned")
            .push(text.to_string());
        Ok(())
    }
}

fn eth(year: i32, month_index: u8, day: u8) -> EthiopianDate {
    EthiopianDate::new(year, month_index, day).expect("valid date")
}

fn tenancy(move_in: EthiopianDate) -> Tenancy {
    Tenancy::starting(
        TenancyId("tenancy-1".to_string()),
        RoomId("room-1".to_string()),
        "Alex Johnson",
        move_in,
    )
}

fn paid_months(year: i32, months: std::ops::Range<u8>) -> Vec<PaymentRecord> {
    months
        .map(|month_index| PaymentRecord {
            room_id: RoomId("room-1".to_string()),
            year,
            month_index,
            is_paid: true,
        })
        .collect()
}

fn snapshot(tenancy: Option<Tenancy>, payments: Vec<PaymentRecord>) -> RoomSnapshot {
    RoomSnapshot {
        room: Room {
            id: RoomId("room-1".to_string()),
            name: "ROOM 1".to_string(),
            owner_id: OwnerId("landlord-1".to_string()),
            monthly_rent: 5000,
        },
        tenancy,
        payments,
    }
}

fn engine(
    snapshots: Vec<RoomSnapshot>,
) -> (
    NotificationDispatcher<MemoryStore, Directory, RecordingGateway>,
    Arc<MemoryStore>,
    Arc<RecordingGateway>,
) {
    let store = Arc::new(MemoryStore::new(snapshots));
    let gateway = Arc::new(RecordingGateway::default());
    let dispatcher = NotificationDispatcher::new(store.clone(), Arc::new(Directory), gateway.clone());
    (dispatcher, store, gateway)
}

#[test]
fn rent_due_on_the_move_in_day_notifies_due_today() {
    let occupant = tenancy(eth(2016, 2, 15));
    let (dispatcher, _, gateway) = engine(vec![snapshot(
        Some(occupant),
        paid_months(2016, 2..6),
    )]);

    let result = dispatcher
        .run_at(eth(2016, 6, 15).to_gregorian())
        .expect("scan completes");

    assert_eq!(result.sent, 1);
    assert_eq!(result.details[0].kind, NotificationKind::DueToday);
    assert!(gateway.sent()[0].contains("RENT DUE TODAY"));
}

#[test]
fn two_days_ahead_of_the_due_day_notifies_due_soon() {
    let occupant = tenancy(eth(2016, 2, 10));
    let (dispatcher, _, gateway) = engine(vec![snapshot(
        Some(occupant),
        paid_months(2016, 2..6),
    )]);

    let result = dispatcher
        .run_at(eth(2016, 6, 8).to_gregorian())
        .expect("scan completes");

    assert_eq!(result.sent, 1);
    assert_eq!(result.details[0].kind, NotificationKind::DueSoon);
    assert!(gateway.sent()[0].contains("(2 days)"));
}

#[test]
fn unpaid_previous_month_reports_true_elapsed_days() {
    // Settled through month 4; month 5 was never paid.
    let occupant = tenancy(eth(2016, 2, 10));
    let (dispatcher, _, gateway) = engine(vec![snapshot(
        Some(occupant),
        paid_months(2016, 2..5),
    )]);

    let result = dispatcher
        .run_at(eth(2016, 6, 20).to_gregorian())
        .expect("scan completes");

    assert_eq!(result.sent, 1);
    assert_eq!(result.details[0].kind, NotificationKind::Overdue);
    // Hamle-style day subtraction would claim 10 days; the real gap from
    // the month-5 due day is forty.
    assert!(gateway.sent()[0].contains("Overdue by: 40 days"));
}

#[test]
fn overdue_inside_the_current_month_counts_from_the_due_day() {
    let occupant = tenancy(eth(2016, 2, 10));
    let (dispatcher, _, gateway) = engine(vec![snapshot(
        Some(occupant),
        paid_months(2016, 2..6),
    )]);

    let result = dispatcher
        .run_at(eth(2016, 6, 20).to_gregorian())
        .expect("scan completes");

    assert_eq!(result.sent, 1);
    assert_eq!(result.details[0].kind, NotificationKind::Overdue);
    assert!(gateway.sent()[0].contains("Overdue by: 10 days"));
}

#[test]
fn never_let_room_generates_nothing() {
    let (dispatcher, _, gateway) = engine(vec![snapshot(None, Vec::new())]);

    let result = dispatcher
        .run_at(eth(2016, 6, 15).to_gregorian())
        .expect("scan completes");

    assert_eq!(result.sent, 0);
    assert!(result.details.is_empty());
    assert!(gateway.sent().is_empty());
}

#[test]
fn settled_month_suppresses_due_and_overdue_kinds() {
    let occupant = tenancy(eth(2016, 2, 10));
    let (dispatcher, _, gateway) = engine(vec![snapshot(
        Some(occupant),
        paid_months(2016, 2..7),
    )]);

    let result = dispatcher
        .run_at(eth(2016, 6, 20).to_gregorian())
        .expect("scan completes");

    assert_eq!(result.sent, 0);
    assert!(result.details.is_empty());
    assert!(gateway.sent().is_empty());
}

#[test]
fn move_in_reminders_fire_on_the_day_and_the_eve() {
    let arriving = tenancy(eth(2016, 6, 20));
    let move_in_line = format_date(&arriving.move_in, Language::En);
    let (dispatcher, _, gateway) = engine(vec![snapshot(Some(arriving.clone()), Vec::new())]);

    let eve = dispatcher
        .run_at(eth(2016, 6, 19).to_gregorian())
        .expect("scan completes");
    assert_eq!(eve.details[0].kind, NotificationKind::MoveInTomorrow);
    // The reminder names the move-in date, not the rent due date.
    assert!(gateway.sent()[0].contains(&move_in_line));

    let (dispatcher, _, gateway) = engine(vec![snapshot(
        Some(arriving),
        // A settled first month does not mute the move-in greeting.
        paid_months(2016, 6..7),
    )]);
    let day = dispatcher
        .run_at(eth(2016, 6, 20).to_gregorian())
        .expect("scan completes");
    assert_eq!(day.details[0].kind, NotificationKind::MoveInToday);
    assert!(gateway.sent()[0].contains(&move_in_line));
}

#[test]
fn eve_reminder_across_the_year_boundary_names_the_move_in_month() {
    // Moving in on Meskerem 1; the eve falls in the old year's Pagume.
    let arriving = tenancy(eth(2017, 0, 1));
    let (dispatcher, _, gateway) = engine(vec![snapshot(Some(arriving), Vec::new())]);

    let result = dispatcher
        .run_at(eth(2016, 12, 5).to_gregorian())
        .expect("scan completes");

    assert_eq!(result.details[0].kind, NotificationKind::MoveInTomorrow);
    let text = &gateway.sent()[0];
    assert!(text.contains("Meskerem 1, 2017"));
    assert!(!text.contains("Pagume"));
}

#[test]
fn second_scan_in_the_same_period_does_not_resend() {
    let occupant = tenancy(eth(2016, 2, 10));
    let (dispatcher, store, gateway) = engine(vec![snapshot(
        Some(occupant.clone()),
        paid_months(2016, 2..6),
    )]);

    let first = dispatcher
        .run_at(eth(2016, 6, 8).to_gregorian())
        .expect("scan completes");
    assert_eq!(first.sent, 1);

    let second = dispatcher
        .run_at(eth(2016, 6, 8).to_gregorian())
        .expect("scan completes");
    assert_eq!(second.sent, 0);
    assert_eq!(second.details[0].outcome, DispatchOutcome::AlreadyNotified);
    assert_eq!(gateway.sent().len(), 1);

    // Once the ledger is settled and the period rolls over, the next
    // cycle notifies again.
    store.replace(vec![snapshot(Some(occupant), paid_months(2016, 2..7))]);
    let next_cycle = dispatcher
        .run_at(eth(2016, 7, 8).to_gregorian())
        .expect("scan completes");
    assert_eq!(next_cycle.sent, 1);
    assert_eq!(next_cycle.details[0].kind, NotificationKind::DueSoon);
}

#[test]
fn failed_send_is_retried_on_the_next_scan() {
    let occupant = tenancy(eth(2016, 2, 10));
    let store = Arc::new(MemoryStore::new(vec![snapshot(
        Some(occupant),
        paid_months(2016, 2..6),
    )]));
    let gateway = Arc::new(RecordingGateway::failing(1));
    let dispatcher =
        NotificationDispatcher::new(store, Arc::new(Directory), gateway.clone());

    let first = dispatcher
        .run_at(eth(2016, 6, 8).to_gregorian())
        .expect("scan completes");
    assert_eq!(first.failed, 1);
    assert_eq!(first.sent, 0);
    assert_eq!(first.details[0].outcome, DispatchOutcome::Failed);

    let second = dispatcher
        .run_at(eth(2016, 6, 8).to_gregorian())
        .expect("scan completes");
    assert_eq!(second.sent, 1);
    assert_eq!(gateway.sent().len(), 1);
}

#[test]
fn unregistered_landlord_is_a_skip_not_a_failure() {
    let occupant = tenancy(eth(2016, 2, 10));
    let store = Arc::new(MemoryStore::new(vec![snapshot(
        Some(occupant),
        paid_months(2016, 2..6),
    )]));
    let gateway = Arc::new(RecordingGateway::default());
    let dispatcher =
        NotificationDispatcher::new(store, Arc::new(EmptyDirectory), gateway.clone());

    let result = dispatcher
        .run_at(eth(2016, 6, 8).to_gregorian())
        .expect("scan completes");

    assert_eq!(result.sent, 0);
    assert_eq!(result.failed, 0);
    assert_eq!(result.details[0].outcome, DispatchOutcome::NoRecipient);
    assert!(gateway.sent().is_empty());
}

#[test]
fn unavailable_store_aborts_the_whole_run() {
    let dispatcher = NotificationDispatcher::new(
        Arc::new(FailingStore),
        Arc::new(Directory),
        Arc::new(RecordingGateway::default()),
    );

    let outcome = dispatcher.run_at(eth(2016, 6, 8).to_gregorian());
    assert!(matches!(outcome, Err(DispatchError::Store(_))));
}

#[test]
fn toggle_time_confirmation_always_sends() {
    let occupant = tenancy(eth(2016, 2, 10));
    let (dispatcher, _, gateway) = engine(vec![snapshot(
        Some(occupant),
        paid_months(2016, 2..7),
    )]);
    let today = eth(2016, 6, 20).to_gregorian();
    let period = eth(2016, 6, 1).period();

    let detail = dispatcher
        .confirm_payment_at("room-1", period, today)
        .expect("confirmation sends");
    assert_eq!(detail.kind, NotificationKind::Paid);
    assert!(gateway.sent()[0].contains("PAYMENT RECEIVED"));
    // The confirmation is stamped with the day the toggle landed.
    assert!(gateway.sent()[0].contains(&format_date(&eth(2016, 6, 20), Language::En)));

    // An explicit toggle is never deduplicated.
    dispatcher
        .confirm_payment_at("room-1", period, today)
        .expect("confirmation sends");
    assert_eq!(gateway.sent().len(), 2);
}

#[test]
fn confirmation_for_an_unknown_room_is_an_error() {
    let (dispatcher, _, _) = engine(vec![snapshot(None, Vec::new())]);
    let today = eth(2016, 6, 20).to_gregorian();
    let period = eth(2016, 6, 1).period();

    assert!(matches!(
        dispatcher.confirm_payment_at("room-9", period, today),
        Err(DispatchError::RoomNotFound(_))
    ));
    assert!(matches!(
        dispatcher.confirm_payment_at("room-1", period, today),
        Err(DispatchError::NoTenancy(_))
    ));
}
