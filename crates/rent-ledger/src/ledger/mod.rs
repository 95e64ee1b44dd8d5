pub mod domain;
pub mod evaluator;
pub mod store;

pub use domain::{OwnerId, PaymentRecord, RentCellStatus, Room, RoomId, Tenancy, TenancyId};
pub use store::{RoomSnapshot, RoomStore, StoreError};
