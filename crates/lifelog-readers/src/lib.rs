//! Format readers for personal-tracking exports.
//!
//! Each module reads one export format into the typed records of
//! [`lifelog_core`]: habit-tracker databases ([`loophabit`]), activity logs
//! ([`moonwatch`]) and screen-time exports ([`stayfree`]). Every reader is
//! synchronous, opens its sources read-only, and fails loudly on the first
//! thing it does not understand.

pub mod loophabit;
pub mod moonwatch;
pub mod stayfree;

mod sqlite;

pub use lifelog_core as core;
