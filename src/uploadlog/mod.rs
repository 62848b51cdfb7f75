//! Upload logging
//!
//! Records one entry per processed upload attempt in a flat JSON file.

mod store;
mod types;

pub use store::{LogError, UploadLog};
pub use types::{LogEntry, STATUS_ERROR, STATUS_OK};
