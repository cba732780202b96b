//! Shared foundation for the lifelog readers.
//!
//! Holds the typed records the readers produce, the error taxonomy they
//! report failures through, and the time-parsing helpers several source
//! formats share.

pub mod error;
pub mod models;
pub mod time_utils;

pub use error::{ReaderError, Result};
