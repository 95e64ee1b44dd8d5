use serde::{Deserialize, Serialize};

use super::domain::{PaymentRecord, Room, Tenancy};

/// Everything the scan needs to know about one room in a single read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room: Room,
    pub tenancy: Option<Tenancy>,
    pub payments: Vec<PaymentRecord>,
}

/// Read-only view of the persistence collaborator. The engine never writes
/// ledger state; landlord toggles arrive through whatever owns the store.
pub trait RoomStore: Send + Sync {
    fn list_rooms(&self) -> Result<Vec<RoomSnapshot>, StoreError>;
}

/// Failure to list rooms aborts the whole run; the next tick retries.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("room store unavailable: {0}")]
    Unavailable(String),
}
