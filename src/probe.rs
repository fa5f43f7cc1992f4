//! Probe Layer
//!
//! Liveness and latency checks, one per host per round.
//!
//! # Architecture
//!
//! - [`Resolver`] / [`Pinger`]: Seams for name resolution and ICMP echo
//! - [`SystemResolver`] / [`IcmpPinger`]: Production implementations
//! - [`ProbeEngine`]: Runs a round concurrently and records outcomes in the
//!   [`HistoryStore`](crate::storage::HistoryStore)

mod engine;
mod icmp;
mod traits;

pub use engine::{HostOutcome, ProbeEngine, RoundSummary};
pub use icmp::{IcmpPinger, SystemResolver};
pub use traits::{Pinger, ProbeError, Resolver};
