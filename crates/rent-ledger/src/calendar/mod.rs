use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The Ethiopian year has twelve 30-day months followed by Pagume.
pub const MONTHS_PER_YEAR: u8 = 13;

const PAGUME_INDEX: u8 = 12;

// Julian day number of the day before Meskerem 1 in the epoch year,
// per the Beyene-Kudlek arithmetic for the Amete Mihret era.
const ETHIOPIC_EPOCH_JDN: i64 = 1_723_856;

// chrono's `num_days_from_ce` counts from 0001-01-01 proleptic Gregorian;
// adding this offset yields the Julian day number.
const DAYS_FROM_CE_TO_JDN: i64 = 1_721_425;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("month index {0} is out of range for the 13-month year")]
    MonthOutOfRange(u8),
    #[error("day {day} is out of range for month {month_index} of year {year}")]
    DayOutOfRange { year: i32, month_index: u8, day: u8 },
}

/// A date in the Ethiopian calendar. `month_index` is zero-based; the
/// thirteenth month (index 12) has five days, six in a leap year.
///
/// Construction validates the day against the month length, so a held value
/// is always a real calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "DateParts", into = "DateParts")]
pub struct EthiopianDate {
    year: i32,
    month_index: u8,
    day: u8,
}

/// Serde-facing representation of an [`EthiopianDate`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DateParts {
    pub year: i32,
    pub month_index: u8,
    pub day: u8,
}

impl TryFrom<DateParts> for EthiopianDate {
    type Error = CalendarError;

    fn try_from(parts: DateParts) -> Result<Self, Self::Error> {
        EthiopianDate::new(parts.year, parts.month_index, parts.day)
    }
}

impl From<EthiopianDate> for DateParts {
    fn from(date: EthiopianDate) -> Self {
        DateParts {
            year: date.year,
            month_index: date.month_index,
            day: date.day,
        }
    }
}

/// Monday-first weekday, matching how the rent matrix labels days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const fn index(self) -> u8 {
        self as u8
    }

    const fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Monday,
            1 => Self::Tuesday,
            2 => Self::Wednesday,
            3 => Self::Thursday,
            4 => Self::Friday,
            5 => Self::Saturday,
            _ => Self::Sunday,
        }
    }
}

/// True when the year ends with a six-day Pagume.
pub fn is_leap_year(year: i32) -> bool {
    year.rem_euclid(4) == 3
}

/// Length of the given month, accounting for the short final month.
pub fn days_in_month(year: i32, month_index: u8) -> Result<u8, CalendarError> {
    if month_index >= MONTHS_PER_YEAR {
        return Err(CalendarError::MonthOutOfRange(month_index));
    }
    if month_index == PAGUME_INDEX {
        Ok(if is_leap_year(year) { 6 } else { 5 })
    } else {
        Ok(30)
    }
}

impl EthiopianDate {
    pub fn new(year: i32, month_index: u8, day: u8) -> Result<Self, CalendarError> {
        let length = days_in_month(year, month_index)?;
        if day == 0 || day > length {
            return Err(CalendarError::DayOutOfRange {
                year,
                month_index,
                day,
            });
        }
        Ok(Self {
            year,
            month_index,
            day,
        })
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    pub const fn month_index(&self) -> u8 {
        self.month_index
    }

    pub const fn day(&self) -> u8 {
        self.day
    }

    /// Convert from the host clock's Gregorian date. Total: every Gregorian
    /// day maps to exactly one Ethiopian day.
    pub fn from_gregorian(date: NaiveDate) -> Self {
        Self::from_day_number(i64::from(date.num_days_from_ce()) + DAYS_FROM_CE_TO_JDN)
    }

    pub fn to_gregorian(&self) -> NaiveDate {
        let days_from_ce = self.day_number() - DAYS_FROM_CE_TO_JDN;
        NaiveDate::from_num_days_from_ce_opt(days_from_ce as i32)
            .unwrap_or(NaiveDate::MAX)
    }

    /// Absolute day ordinal (Julian day number). Day distances across month
    /// and year boundaries are differences of these ordinals, never naive
    /// day-of-month subtraction.
    pub fn day_number(&self) -> i64 {
        let year = i64::from(self.year);
        ETHIOPIC_EPOCH_JDN
            + 365 * year
            + year.div_euclid(4)
            + 30 * i64::from(self.month_index)
            + i64::from(self.day)
            - 1
    }

    fn from_day_number(jdn: i64) -> Self {
        let offset = jdn - ETHIOPIC_EPOCH_JDN;
        let cycle = offset.div_euclid(1461);
        let r = offset.rem_euclid(1461);
        let n = r % 365 + 365 * (r / 1460);
        let year = 4 * cycle + r / 365 - r / 1460;
        let month_index = (n / 30) as u8;
        let day = (n % 30 + 1) as u8;
        Self {
            year: year as i32,
            month_index,
            day,
        }
    }

    pub fn weekday(&self) -> Weekday {
        Weekday::from_index(self.day_number().rem_euclid(7) as u8)
    }

    pub fn next_day(&self) -> Self {
        Self::from_day_number(self.day_number() + 1)
    }

    /// The billing period this date falls in.
    pub fn period(&self) -> BillingPeriod {
        BillingPeriod {
            year: self.year,
            month_index: self.month_index,
        }
    }
}

/// A (year, month) pair against which one payment status is tracked.
///
/// All month comparisons go through [`BillingPeriod::ordinal`], a linear
/// `year * 13 + month_index` count. Comparing through calendar-library date
/// objects would reintroduce Gregorian/Ethiopian drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub year: i32,
    pub month_index: u8,
}

impl BillingPeriod {
    pub fn new(year: i32, month_index: u8) -> Result<Self, CalendarError> {
        if month_index >= MONTHS_PER_YEAR {
            return Err(CalendarError::MonthOutOfRange(month_index));
        }
        Ok(Self { year, month_index })
    }

    pub fn ordinal(&self) -> i64 {
        i64::from(self.year) * i64::from(MONTHS_PER_YEAR) + i64::from(self.month_index)
    }

    pub fn next(&self) -> Self {
        if self.month_index + 1 >= MONTHS_PER_YEAR {
            Self {
                year: self.year + 1,
                month_index: 0,
            }
        } else {
            Self {
                year: self.year,
                month_index: self.month_index + 1,
            }
        }
    }

    /// First calendar day of the period.
    pub fn first_day(&self) -> EthiopianDate {
        EthiopianDate {
            year: self.year,
            month_index: self.month_index,
            day: 1,
        }
    }
}
