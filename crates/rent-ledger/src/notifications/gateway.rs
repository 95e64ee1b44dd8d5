use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ledger::domain::OwnerId;

use super::templates::Language;

/// Opaque handle the messaging gateway delivers to (a chat id, a phone
/// number — whatever the transport uses).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipientHandle(pub String);

/// Lookup of a landlord's registered recipient handle and language
/// preference. Registration and opt-in live outside this subsystem.
pub trait RecipientDirectory: Send + Sync {
    fn resolve(&self, owner: &OwnerId) -> Option<RecipientHandle>;
    fn language_of(&self, recipient: &RecipientHandle) -> Language;
}

/// Outbound message transport. Implementations must bound each call — one
/// unreachable gateway cannot be allowed to stall a whole scan — and report
/// an exceeded bound as [`GatewayError::Timeout`].
pub trait MessageGateway: Send + Sync {
    fn send(&self, recipient: &RecipientHandle, text: &str) -> Result<(), GatewayError>;
}

/// Transport failure for a single send. Counted as failed; the scan
/// continues with the remaining tenancies.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway transport failed: {0}")]
    Transport(String),
    #[error("gateway call timed out after {0:?}")]
    Timeout(Duration),
}
