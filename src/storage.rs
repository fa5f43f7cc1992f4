//! History Store
//!
//! In-memory, per-host probe state shared between the probe engine (writer)
//! and the renderer (reader).
//!
//! # Components
//!
//! - [`HistoryStore`]: Concurrent hostname → record map
//! - [`HostRecord`]: Address, status, and latest latency of one host
//! - [`History`]: Bounded outcome/latency samples, newest first

mod store;
mod types;

pub use store::HistoryStore;
pub use types::{HISTORY_CAPACITY, History, HostRecord, HostStatus, MIN_REPLY_LATENCY};
