use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use crate::calendar::{BillingPeriod, CalendarError, EthiopianDate};
use crate::ledger::domain::{RentCellStatus, Room, Tenancy};
use crate::ledger::evaluator;
use crate::ledger::store::{RoomSnapshot, RoomStore, StoreError};

use super::dedup::{NotifiedKey, NotifiedLedger};
use super::due;
use super::gateway::{GatewayError, MessageGateway, RecipientDirectory};
use super::policy::{self, NotificationKind};
use super::templates::{self, MessageContext};

/// What happened to one tenancy during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    Sent,
    Failed,
    AlreadyNotified,
    NoRecipient,
}

/// One line of the aggregate result.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchDetail {
    pub room: String,
    pub renter: String,
    pub kind: NotificationKind,
    pub outcome: DispatchOutcome,
}

/// Aggregate outcome of one dispatcher invocation. Never persisted; it is
/// the sole observable result of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchResult {
    pub sent: u32,
    pub failed: u32,
    pub details: Vec<DispatchDetail>,
}

impl DispatchResult {
    fn record(&mut self, detail: DispatchDetail) {
        match detail.outcome {
            DispatchOutcome::Sent => self.sent += 1,
            DispatchOutcome::Failed => self.failed += 1,
            DispatchOutcome::AlreadyNotified | DispatchOutcome::NoRecipient => {}
        }
        self.details.push(detail);
    }
}

/// Error raised by dispatcher entry points.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("room {0} not found")]
    RoomNotFound(String),
    #[error("room {0} has no tenancy")]
    NoTenancy(String),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Scans every room with a tenancy, decides what (if anything) the
/// landlord is owed today, renders it in their language, and sends it.
///
/// Per-tenancy failures are isolated: a bad date or an unreachable gateway
/// affects only that tenancy's line in the result. Only a failure to list
/// rooms aborts a run.
pub struct NotificationDispatcher<S, D, G> {
    store: Arc<S>,
    directory: Arc<D>,
    gateway: Arc<G>,
    notified: NotifiedLedger,
}

impl<S, D, G> NotificationDispatcher<S, D, G>
where
    S: RoomStore,
    D: RecipientDirectory,
    G: MessageGateway,
{
    pub fn new(store: Arc<S>, directory: Arc<D>, gateway: Arc<G>) -> Self {
        Self {
            store,
            directory,
            gateway,
            notified: NotifiedLedger::new(),
        }
    }

    /// Run one pass against the host clock.
    pub fn run(&self) -> Result<DispatchResult, DispatchError> {
        self.run_at(Local::now().date_naive())
    }

    /// Run one pass as of the given Gregorian day.
    pub fn run_at(&self, today: NaiveDate) -> Result<DispatchResult, DispatchError> {
        let rooms = self.store.list_rooms()?;
        let today = EthiopianDate::from_gregorian(today);
        let tomorrow = today.next_day();

        let mut result = DispatchResult::default();
        for snapshot in &rooms {
            let Some(tenancy) = snapshot.tenancy.as_ref() else {
                continue;
            };

            match self.evaluate_tenancy(snapshot, tenancy, today, tomorrow) {
                Ok(Some(detail)) => result.record(detail),
                Ok(None) => {}
                Err(err) => {
                    warn!(
                        room = %snapshot.room.name,
                        error = %err,
                        "skipping tenancy with invalid calendar data"
                    );
                }
            }
        }

        info!(
            sent = result.sent,
            failed = result.failed,
            rooms = rooms.len(),
            "notification pass finished"
        );
        Ok(result)
    }

    fn evaluate_tenancy(
        &self,
        snapshot: &RoomSnapshot,
        tenancy: &Tenancy,
        today: EthiopianDate,
        tomorrow: EthiopianDate,
    ) -> Result<Option<DispatchDetail>, CalendarError> {
        let is_move_in_today = tenancy.move_in == today;
        let is_move_in_tomorrow = tenancy.move_in == tomorrow;
        let current = today.period();

        // Outside the occupancy window only the move-in kinds can fire.
        let occupied = tenancy.occupies(current) && tenancy.move_in <= today;
        if !occupied && !is_move_in_today && !is_move_in_tomorrow {
            return Ok(None);
        }

        let anchor = if occupied {
            self.billing_anchor(snapshot, tenancy, current, &today)
        } else {
            current
        };
        let due = due::due_for_period(tenancy, anchor, &today)?;
        let is_paid_this_month =
            evaluator::is_paid(Some(tenancy), &snapshot.payments, current, &today);

        let Some(decision) = policy::decide(
            due.day_distance,
            is_paid_this_month,
            is_move_in_today,
            is_move_in_tomorrow,
        ) else {
            return Ok(None);
        };

        // Move-in reminders belong to the move-in month and render the
        // move-in date; due reminders belong to the billing period they
        // chase and render its due date.
        let (key_period, message_date) = match decision.kind {
            NotificationKind::MoveInToday | NotificationKind::MoveInTomorrow => {
                (tenancy.move_in.period(), tenancy.move_in)
            }
            _ => (anchor, due.due),
        };

        Ok(Some(self.dispatch(
            &snapshot.room,
            tenancy,
            decision.kind,
            decision.day_distance,
            message_date,
            current,
            key_period,
        )))
    }

    /// The oldest period since move-in still waiting on payment. When the
    /// ledger is clean the current period is the anchor, so an overdue
    /// distance always measures real elapsed days even across month and
    /// year boundaries.
    fn billing_anchor(
        &self,
        snapshot: &RoomSnapshot,
        tenancy: &Tenancy,
        current: BillingPeriod,
        today: &EthiopianDate,
    ) -> BillingPeriod {
        let mut period = tenancy.move_in.period();
        while period.ordinal() < current.ordinal() {
            let status = evaluator::evaluate(Some(tenancy), &snapshot.payments, period, today);
            if matches!(status, RentCellStatus::Unpaid | RentCellStatus::Overdue) {
                return period;
            }
            period = period.next();
        }
        current
    }

    #[allow(clippy::too_many_arguments)]
    fn dispatch(
        &self,
        room: &Room,
        tenancy: &Tenancy,
        kind: NotificationKind,
        day_distance: i64,
        date: EthiopianDate,
        current: BillingPeriod,
        key_period: BillingPeriod,
    ) -> DispatchDetail {
        let mut detail = DispatchDetail {
            room: room.name.clone(),
            renter: tenancy.renter_name.clone(),
            kind,
            outcome: DispatchOutcome::Sent,
        };

        let Some(recipient) = self.directory.resolve(&room.owner_id) else {
            detail.outcome = DispatchOutcome::NoRecipient;
            return detail;
        };

        let key = NotifiedKey {
            tenancy_id: tenancy.id.clone(),
            period: key_period,
            kind,
        };
        if !self.notified.mark_if_new(current, key.clone()) {
            detail.outcome = DispatchOutcome::AlreadyNotified;
            return detail;
        }

        let language = self.directory.language_of(&recipient);
        let text = templates::render(
            kind,
            day_distance,
            &MessageContext {
                room_name: &room.name,
                renter_name: &tenancy.renter_name,
                amount: room.monthly_rent,
                date,
                language,
            },
        );

        if let Err(err) = self.gateway.send(&recipient, &text) {
            warn!(room = %room.name, error = %err, "notification send failed");
            // Give the key back so the next tick can retry the send.
            self.notified.release(&key);
            detail.outcome = DispatchOutcome::Failed;
        }

        detail
    }

    /// Send the paid confirmation for a period, synchronously, at the
    /// moment the landlord toggles the cell. Not part of the recurring
    /// scan and never deduplicated: an explicit toggle always confirms.
    pub fn confirm_payment(
        &self,
        room_id: &str,
        period: BillingPeriod,
    ) -> Result<DispatchDetail, DispatchError> {
        self.confirm_payment_at(room_id, period, Local::now().date_naive())
    }

    pub fn confirm_payment_at(
        &self,
        room_id: &str,
        period: BillingPeriod,
        today: NaiveDate,
    ) -> Result<DispatchDetail, DispatchError> {
        let rooms = self.store.list_rooms()?;
        let snapshot = rooms
            .iter()
            .find(|snapshot| snapshot.room.id.0 == room_id)
            .ok_or_else(|| DispatchError::RoomNotFound(room_id.to_string()))?;
        let tenancy = snapshot
            .tenancy
            .as_ref()
            .ok_or_else(|| DispatchError::NoTenancy(room_id.to_string()))?;

        let today = EthiopianDate::from_gregorian(today);

        let mut detail = DispatchDetail {
            room: snapshot.room.name.clone(),
            renter: tenancy.renter_name.clone(),
            kind: NotificationKind::Paid,
            outcome: DispatchOutcome::Sent,
        };

        let Some(recipient) = self.directory.resolve(&snapshot.room.owner_id) else {
            detail.outcome = DispatchOutcome::NoRecipient;
            return Ok(detail);
        };

        info!(
            room = %snapshot.room.name,
            year = period.year,
            month_index = period.month_index,
            "sending payment confirmation"
        );

        let language = self.directory.language_of(&recipient);
        let text = templates::render(
            NotificationKind::Paid,
            0,
            &MessageContext {
                room_name: &snapshot.room.name,
                renter_name: &tenancy.renter_name,
                amount: snapshot.room.monthly_rent,
                // The confirmation stamps the day the toggle was recorded.
                date: today,
                language,
            },
        );

        self.gateway.send(&recipient, &text)?;
        Ok(detail)
    }

    /// Evaluate the thirteen rent cells of one year for a room, as of the
    /// given day. Backs the ledger HTTP endpoint.
    pub fn ledger_year(
        &self,
        room_id: &str,
        year: i32,
        today: NaiveDate,
    ) -> Result<Vec<RentCellStatus>, DispatchError> {
        let rooms = self.store.list_rooms()?;
        let snapshot = rooms
            .iter()
            .find(|snapshot| snapshot.room.id.0 == room_id)
            .ok_or_else(|| DispatchError::RoomNotFound(room_id.to_string()))?;

        let today = EthiopianDate::from_gregorian(today);
        Ok(evaluator::year_row(
            snapshot.tenancy.as_ref(),
            &snapshot.payments,
            year,
            &today,
        ))
    }
}
