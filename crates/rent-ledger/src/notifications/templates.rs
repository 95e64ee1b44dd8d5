use serde::{Deserialize, Serialize};

use crate::calendar::EthiopianDate;

use super::policy::NotificationKind;

/// Message language, matching the landlord's dashboard preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Am,
}

const MONTHS_EN: [&str; 13] = [
    "Meskerem", "Tikimt", "Hidar", "Tahsas", "Tir", "Yekatit", "Megabit", "Miyazia", "Ginbot",
    "Sene", "Hamle", "Nehase", "Pagume",
];

const MONTHS_AM: [&str; 13] = [
    "መስከረም", "ጥቅምት", "ኅዳር", "ታኅሣሥ", "ጥር", "የካቲት", "መጋቢት", "ሚያዝያ", "ግንቦት", "ሰኔ", "ሐምሌ", "ነሐሴ",
    "ጳጉሜ",
];

const WEEKDAYS_EN: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const WEEKDAYS_AM: [&str; 7] = ["ሰኞ", "ማክሰኞ", "ረቡዕ", "ሐሙስ", "አርብ", "ቅዳሜ", "እሑድ"];

/// Month name in the requested language.
pub fn month_name(month_index: u8, language: Language) -> &'static str {
    let table = match language {
        Language::En => &MONTHS_EN,
        Language::Am => &MONTHS_AM,
    };
    table.get(usize::from(month_index)).copied().unwrap_or("")
}

/// Weekday name in the requested language, Monday-first.
pub fn weekday_name(date: &EthiopianDate, language: Language) -> &'static str {
    let table = match language {
        Language::En => &WEEKDAYS_EN,
        Language::Am => &WEEKDAYS_AM,
    };
    table[usize::from(date.weekday().index())]
}

/// Format a date the way the dashboard shows it, weekday included.
pub fn format_date(date: &EthiopianDate, language: Language) -> String {
    let month = month_name(date.month_index(), language);
    let weekday = weekday_name(date, language);
    match language {
        Language::En => format!("{} {}, {} ({})", month, date.day(), date.year(), weekday),
        Language::Am => format!("{} {} ቀን {} ({})", month, date.day(), date.year(), weekday),
    }
}

/// Everything a rendered message interpolates. `date` is the date the
/// message is about: the due date for the due/overdue kinds, the move-in
/// date for the move-in kinds, the recording date for a paid confirmation.
#[derive(Debug, Clone)]
pub struct MessageContext<'a> {
    pub room_name: &'a str,
    pub renter_name: &'a str,
    pub amount: u32,
    pub date: EthiopianDate,
    pub language: Language,
}

/// Render the localized message for a notification kind.
///
/// Output uses the gateway's emphasis parse mode: `*bold*` spans and plain
/// line breaks.
pub fn render(kind: NotificationKind, day_distance: i64, ctx: &MessageContext<'_>) -> String {
    match ctx.language {
        Language::En => render_en(kind, day_distance, ctx),
        Language::Am => render_am(kind, day_distance, ctx),
    }
}

fn render_en(kind: NotificationKind, day_distance: i64, ctx: &MessageContext<'_>) -> String {
    let date = format_date(&ctx.date, Language::En);
    match kind {
        NotificationKind::DueSoon => format!(
            "🏠 *RENT DUE REMINDER*\n\n\
             📅 *Due: {date} ({day_distance} days)*\n\
             🏢 *Room: {room}*\n\
             👤 *Tenant: {tenant}*\n\
             💰 *Amount: {amount} ETB*\n\n\
             🔔 *Status: PENDING*\n\n\
             Please remind the tenant to pay on time.",
            room = ctx.room_name,
            tenant = ctx.renter_name,
            amount = ctx.amount,
        ),
        NotificationKind::DueToday => format!(
            "🏠 *RENT DUE TODAY*\n\n\
             📅 *Due: {date}*\n\
             🏢 *Room: {room}*\n\
             👤 *Tenant: {tenant}*\n\
             💰 *Amount: {amount} ETB*\n\n\
             🔔 *Status: PENDING*\n\n\
             Rent is due today.",
            room = ctx.room_name,
            tenant = ctx.renter_name,
            amount = ctx.amount,
        ),
        NotificationKind::Overdue => format!(
            "⚠️ *OVERDUE RENT PAYMENT*\n\n\
             📅 *Was Due: {date}*\n\
             🔴 *Overdue by: {days} days*\n\
             🏢 *Room: {room}*\n\
             👤 *Tenant: {tenant}*\n\
             💰 *Amount: {amount} ETB*\n\n\
             🔔 *Status: OVERDUE*\n\n\
             Immediate action required! Please contact the tenant.",
            days = day_distance.abs(),
            room = ctx.room_name,
            tenant = ctx.renter_name,
            amount = ctx.amount,
        ),
        NotificationKind::Paid => format!(
            "✅ *PAYMENT RECEIVED*\n\n\
             📅 *Paid: {date}*\n\
             🏢 *Room: {room}*\n\
             👤 *Tenant: {tenant}*\n\
             💰 *Amount: {amount} ETB*\n\n\
             🔔 *Status: PAID*\n\n\
             Thank you! Payment recorded successfully.",
            room = ctx.room_name,
            tenant = ctx.renter_name,
            amount = ctx.amount,
        ),
        NotificationKind::MoveInTomorrow => format!(
            "🔑 *MOVE-IN REMINDER*\n\n\
             📅 *Moving in: {date} (tomorrow)*\n\
             🏢 *Room: {room}*\n\
             👤 *Tenant: {tenant}*\n\n\
             Please have the room ready.",
            room = ctx.room_name,
            tenant = ctx.renter_name,
        ),
        NotificationKind::MoveInToday => format!(
            "🔑 *MOVE-IN DAY*\n\n\
             📅 *Moving in: {date} (today)*\n\
             🏢 *Room: {room}*\n\
             👤 *Tenant: {tenant}*\n\n\
             Welcome the tenant and hand over the keys.",
            room = ctx.room_name,
            tenant = ctx.renter_name,
        ),
    }
}

fn render_am(kind: NotificationKind, day_distance: i64, ctx: &MessageContext<'_>) -> String {
    let date = format_date(&ctx.date, Language::Am);
    match kind {
        NotificationKind::DueSoon => format!(
            "🏠 *የቤት ክፍያ ማስታወቂያ*\n\n\
             📅 *የሚከፈልበት: {date} ({day_distance} ቀናት)*\n\
             🏢 *ክፍል: {room}*\n\
             👤 *ተከራይ: {tenant}*\n\
             💰 *መጠን: {amount} ብር*\n\n\
             🔔 *ሁኔታ: ገና አልተከፈለም*\n\n\
             እባክዎ ተከራዩ በጊዜ እንዲከፍል ያሳስቡ።",
            room = ctx.room_name,
            tenant = ctx.renter_name,
            amount = ctx.amount,
        ),
        NotificationKind::DueToday => format!(
            "🏠 *የቤት ክፍያ ዛሬ ይከፈላል*\n\n\
             📅 *የሚከፈልበት: {date}*\n\
             🏢 *ክፍል: {room}*\n\
             👤 *ተከራይ: {tenant}*\n\
             💰 *መጠን: {amount} ብር*\n\n\
             🔔 *ሁኔታ: ገና አልተከፈለም*\n\n\
             የቤት ክፍያ ዛሬ ይከፈላል።",
            room = ctx.room_name,
            tenant = ctx.renter_name,
            amount = ctx.amount,
        ),
        NotificationKind::Overdue => format!(
            "⚠️ *ያለፈበት የቤት ክፍያ*\n\n\
             📅 *መከፈል ነበረበት: {date}*\n\
             🔴 *በጊዜ ያለፈ: {days} ቀናት*\n\
             🏢 *ክፍል: {room}*\n\
             👤 *ተከራይ: {tenant}*\n\
             💰 *መጠን: {amount} ብር*\n\n\
             🔔 *ሁኔታ: ጊዜው አልፏል*\n\n\
             አፋጣኝ እርምጃ ያስፈልጋል! እባክዎ ተከራዩን ያነጋግሩ።",
            days = day_distance.abs(),
            room = ctx.room_name,
            tenant = ctx.renter_name,
            amount = ctx.amount,
        ),
        NotificationKind::Paid => format!(
            "✅ *ክፍያ ተቀብሏል*\n\n\
             📅 *ተከፈለ: {date}*\n\
             🏢 *ክፍል: {room}*\n\
             👤 *ተከራይ: {tenant}*\n\
             💰 *መጠን: {amount} ብር*\n\n\
             🔔 *ሁኔታ: ተከፈለ*\n\n\
             እናመሰግናለን! ክፍያው በተሳካ ሁኔታ ተመዝግቧል።",
            room = ctx.room_name,
            tenant = ctx.renter_name,
            amount = ctx.amount,
        ),
        NotificationKind::MoveInTomorrow => format!(
            "🔑 *የመግቢያ ማስታወቂያ*\n\n\
             📅 *የሚገባበት: {date} (ነገ)*\n\
             🏢 *ክፍል: {room}*\n\
             👤 *ተከራይ: {tenant}*\n\n\
             እባክዎ ክፍሉን ያዘጋጁ።",
            room = ctx.room_name,
            tenant = ctx.renter_name,
        ),
        NotificationKind::MoveInToday => format!(
            "🔑 *የመግቢያ ቀን*\n\n\
             📅 *የሚገባበት: {date} (ዛሬ)*\n\
             🏢 *ክፍል: {room}*\n\
             👤 *ተከራይ: {tenant}*\n\n\
             ተከራዩን ተቀብለው ቁልፉን ያስረክቡ።",
            room = ctx.room_name,
            tenant = ctx.renter_name,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(language: Language) -> MessageContext<'static> {
        MessageContext {
            room_name: "ROOM 1",
            renter_name: "Alex Johnson",
            amount: 5000,
            date: EthiopianDate::new(2017, 0, 15).expect("valid date"),
            language,
        }
    }

    #[test]
    fn due_soon_interpolates_days_and_month_name() {
        let text = render(NotificationKind::DueSoon, 2, &context(Language::En));
        assert!(text.contains("Meskerem 15, 2017"));
        assert!(text.contains("(2 days)"));
        assert!(text.contains("*Room: ROOM 1*"));
        assert!(text.contains("5000 ETB"));
    }

    #[test]
    fn overdue_reports_absolute_distance() {
        let text = render(NotificationKind::Overdue, -40, &context(Language::En));
        assert!(text.contains("Overdue by: 40 days"));
    }

    #[test]
    fn amharic_uses_localized_month_names() {
        let text = render(NotificationKind::DueSoon, 3, &context(Language::Am));
        assert!(text.contains("መስከረም 15 ቀን 2017"));
        assert!(text.contains("ብር"));
        assert!(!text.contains("Meskerem"));
    }

    #[test]
    fn pagume_has_a_name_in_both_languages() {
        assert_eq!(month_name(12, Language::En), "Pagume");
        assert_eq!(month_name(12, Language::Am), "ጳጉሜ");
    }

    #[test]
    fn formatted_date_includes_weekday() {
        let date = EthiopianDate::new(2017, 0, 1).expect("valid date");
        assert_eq!(format_date(&date, Language::En), "Meskerem 1, 2017 (Wednesday)");
        assert_eq!(format_date(&date, Language::Am), "መስከረም 1 ቀን 2017 (ረቡዕ)");
    }

    #[test]
    fn move_in_messages_skip_amount() {
        let text = render(NotificationKind::MoveInToday, 0, &context(Language::En));
        assert!(!text.contains("ETB"));
        assert!(text.contains("keys"));
    }
}
