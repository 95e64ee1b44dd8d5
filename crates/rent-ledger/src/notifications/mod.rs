//! Due-date scanning, notification policy, rendering, and dispatch.

pub(crate) mod dedup;
pub mod dispatcher;
pub mod due;
pub mod gateway;
pub mod policy;
pub mod router;
pub mod scheduler;
pub mod templates;

pub use dispatcher::{
    DispatchDetail, DispatchError, DispatchOutcome, DispatchResult, NotificationDispatcher,
};
pub use due::{due_date_for, due_for_period, DueDate};
pub use gateway::{GatewayError, MessageGateway, RecipientDirectory, RecipientHandle};
pub use policy::{decide, NotificationDecision, NotificationKind, DUE_SOON_WINDOW_DAYS};
pub use router::{engine_router, EngineState};
pub use scheduler::Scheduler;
pub use templates::Language;
