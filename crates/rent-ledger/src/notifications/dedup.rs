use std::collections::HashSet;
use std::sync::Mutex;

use crate::calendar::BillingPeriod;
use crate::ledger::domain::TenancyId;

use super::policy::NotificationKind;

/// Key under which a dispatched notification is remembered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotifiedKey {
    pub tenancy_id: TenancyId,
    pub period: BillingPeriod,
    pub kind: NotificationKind,
}

/// Remembers which (tenancy, period, kind) notifications already went out,
/// so repeated scans inside the reminder window do not re-send.
///
/// Consult-and-set happens under one lock. Entries for periods older than
/// the current one are dropped when the period rolls over; move-in keys may
/// reference the following period and survive the sweep.
#[derive(Debug, Default)]
pub struct NotifiedLedger {
    inner: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    current: Option<i64>,
    sent: HashSet<NotifiedKey>,
}

impl NotifiedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the key if it is new, returning whether the caller should
    /// proceed with the send. Rolls expired entries out when `current`
    /// advances.
    pub fn mark_if_new(&self, current: BillingPeriod, key: NotifiedKey) -> bool {
        let mut state = self.inner.lock().expect("notified ledger mutex poisoned");

        let ordinal = current.ordinal();
        if state.current != Some(ordinal) {
            state.sent.retain(|entry| entry.period.ordinal() >= ordinal);
            state.current = Some(ordinal);
        }

        state.sent.insert(key)
    }

    /// Forget a key so the next scan may retry, used when a send fails
    /// after the key was claimed.
    pub fn release(&self, key: &NotifiedKey) {
        let mut state = self.inner.lock().expect("notified ledger mutex poisoned");
        state.sent.remove(key);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("notified ledger mutex poisoned")
            .sent
            .len()
    }
}
