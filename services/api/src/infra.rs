use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use rent_ledger::ledger::{OwnerId, RoomSnapshot, RoomStore, StoreError};
use rent_ledger::notifications::{
    GatewayError, Language, MessageGateway, RecipientDirectory, RecipientHandle,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Room snapshots held in memory. The real persistence backend lives
/// outside this service; the engine only ever reads.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRoomStore {
    snapshots: Arc<Mutex<Vec<RoomSnapshot>>>,
}

impl InMemoryRoomStore {
    pub(crate) fn new(snapshots: Vec<RoomSnapshot>) -> Self {
        Self {
            snapshots: Arc::new(Mutex::new(snapshots)),
        }
    }
}

impl RoomStore for InMemoryRoomStore {
    fn list_rooms(&self) -> Result<Vec<RoomSnapshot>, StoreError> {
        Ok(self
            .snapshots
            .lock()
            .expect("room store mutex poisoned")
            .clone())
    }
}

/// Explicit owner-to-handle registrations with per-handle language
/// preferences. Registration itself happens outside this subsystem.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRecipientDirectory {
    handles: HashMap<OwnerId, RecipientHandle>,
    languages: HashMap<RecipientHandle, Language>,
}

impl InMemoryRecipientDirectory {
    pub(crate) fn register(
        &mut self,
        owner: OwnerId,
        handle: RecipientHandle,
        language: Language,
    ) {
        self.languages.insert(handle.clone(), language);
        self.handles.insert(owner, handle);
    }
}

impl RecipientDirectory for InMemoryRecipientDirectory {
    fn resolve(&self, owner: &OwnerId) -> Option<RecipientHandle> {
        self.handles.get(owner).cloned()
    }

    fn language_of(&self, recipient: &RecipientHandle) -> Language {
        self.languages
            .get(recipient)
            .copied()
            .unwrap_or(Language::En)
    }
}

/// Gateway stand-in that logs each rendered message instead of calling a
/// real transport, keeping every send so the scan command can replay them.
#[derive(Default, Clone)]
pub(crate) struct LoggingGateway {
    sent: Arc<Mutex<Vec<(RecipientHandle, String)>>>,
}

impl LoggingGateway {
    pub(crate) fn sent(&self) -> Vec<(RecipientHandle, String)> {
        self.sent.lock().expect("gateway mutex poisoned").clone()
    }
}

impl MessageGateway for LoggingGateway {
    fn send(&self, recipient: &RecipientHandle, text: &str) -> Result<(), GatewayError> {
        tracing::info!(recipient = %recipient.0, "delivering notification");
        self.sent
            .lock()
            .expect("gateway mutex poisoned")
            .push((recipient.clone(), text.to_string()));
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
