//! Rent ledger and due-date notification engine for tenancies tracked on
//! the Ethiopian calendar.

pub mod calendar;
pub mod config;
pub mod error;
pub mod ledger;
pub mod notifications;
pub mod telemetry;
