use serde::{Deserialize, Serialize};

/// How many days ahead of the due date reminders start.
pub const DUE_SOON_WINDOW_DAYS: i64 = 3;

/// The kinds of message the engine can owe a landlord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    MoveInTomorrow,
    MoveInToday,
    DueSoon,
    DueToday,
    Overdue,
    Paid,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::MoveInTomorrow => "Move-in tomorrow",
            Self::MoveInToday => "Move-in today",
            Self::DueSoon => "Due soon",
            Self::DueToday => "Due today",
            Self::Overdue => "Overdue",
            Self::Paid => "Paid",
        }
    }
}

/// Zero-or-one decision produced per tenancy per evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDecision {
    pub kind: NotificationKind,
    pub day_distance: i64,
}

/// Decide whether a notification is owed today.
///
/// Pure function of its inputs. Move-in proximity outranks payment state;
/// a settled month suppresses the due/overdue kinds entirely (paid
/// confirmations are sent at toggle time, not by the recurring scan); a
/// distance beyond the reminder window produces nothing.
pub fn decide(
    day_distance: i64,
    is_paid_this_month: bool,
    is_move_in_today: bool,
    is_move_in_tomorrow: bool,
) -> Option<NotificationDecision> {
    if is_move_in_today {
        return Some(NotificationDecision {
            kind: NotificationKind::MoveInToday,
            day_distance,
        });
    }
    if is_move_in_tomorrow {
        return Some(NotificationDecision {
            kind: NotificationKind::MoveInTomorrow,
            day_distance,
        });
    }
    if is_paid_this_month {
        return None;
    }

    let kind = if day_distance == 0 {
        NotificationKind::DueToday
    } else if day_distance > 0 && day_distance <= DUE_SOON_WINDOW_DAYS {
        NotificationKind::DueSoon
    } else if day_distance < 0 {
        NotificationKind::Overdue
    } else {
        return None;
    };

    Some(NotificationDecision { kind, day_distance })
}
