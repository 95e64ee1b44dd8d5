use serde::{Deserialize, Serialize};

use crate::calendar::{BillingPeriod, EthiopianDate};

/// Identifier wrapper for rooms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub String);

/// Identifier wrapper for tenancies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenancyId(pub String);

/// Identifier wrapper for the landlord owning a room.
///
/// Rooms map to their owner explicitly; recipient resolution never falls
/// back to "whichever recipient happens to be connected".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

/// A rentable unit with its owner and the fixed monthly amount in ETB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub owner_id: OwnerId,
    pub monthly_rent: u32,
}

/// Occupancy record linking a renter to a room for a bounded interval.
///
/// `due_day` is fixed at move-in and drives every subsequent month's due
/// date; it never changes mid-tenancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenancy {
    pub id: TenancyId,
    pub room_id: RoomId,
    pub renter_name: String,
    pub move_in: EthiopianDate,
    pub move_out: Option<EthiopianDate>,
    pub due_day: u8,
}

impl Tenancy {
    /// Create a tenancy whose due day derives from the move-in day.
    pub fn starting(
        id: TenancyId,
        room_id: RoomId,
        renter_name: impl Into<String>,
        move_in: EthiopianDate,
    ) -> Self {
        Self {
            id,
            room_id,
            renter_name: renter_name.into(),
            move_in,
            move_out: None,
            due_day: move_in.day(),
        }
    }

    /// Whether the tenancy occupies the given billing period. The move-out
    /// month itself no longer counts as occupied.
    pub fn occupies(&self, period: BillingPeriod) -> bool {
        let ordinal = period.ordinal();
        if ordinal < self.move_in.period().ordinal() {
            return false;
        }
        match self.move_out {
            Some(out) => ordinal < out.period().ordinal(),
            None => true,
        }
    }
}

/// One landlord-recorded payment toggle per (room, year, month). The engine
/// only ever reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub room_id: RoomId,
    pub year: i32,
    pub month_index: u8,
    pub is_paid: bool,
}

impl PaymentRecord {
    pub fn period(&self) -> BillingPeriod {
        BillingPeriod {
            year: self.year,
            month_index: self.month_index,
        }
    }
}

/// Derived status of one rent cell. Computed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentCellStatus {
    Paid,
    Unpaid,
    Overdue,
    Vacant,
    NotApplicable,
}

impl RentCellStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Unpaid => "Unpaid",
            Self::Overdue => "Overdue",
            Self::Vacant => "Vacant",
            Self::NotApplicable => "N/A",
        }
    }
}
