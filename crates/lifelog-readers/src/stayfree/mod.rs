//! Readers for screen-time exports.
//!
//! The same tracker app exports two shapes: a legacy spreadsheet with one
//! wide sheet per measure ([`xls`]) and a full backup archive wrapping a
//! SQLite database ([`backup`]). Both melt into the long-form records of
//! [`lifelog_core::models`], so downstream code does not care which form a
//! measurement came from.

pub mod backup;
pub mod xls;

pub use backup::read_usage_time_from_backup;
pub use xls::{read_device_unlocks, read_usage_count, read_usage_time};
