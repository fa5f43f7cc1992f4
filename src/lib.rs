//! Pingwatch - Continuous Reachability Monitor
//!
//! Pings a set of hosts every round, keeps the last ten samples per host, and
//! renders a live terminal table with status, latency, and trend columns.
//!
//! # Architecture
//!
//! - **Pattern**: Expands `rack-[1:2]-node-[01:04]` style host patterns
//! - **Storage**: Shared per-host records with bounded history
//! - **Probe**: Concurrent resolve-then-ping rounds
//! - **Render**: Fixed-width dashboard with trend marks and sparklines
//! - **Scheduler**: Probe, render, sleep until cancelled
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pingwatch::{
//!     Dashboard, HistoryStore, IcmpPinger, MonitorConfig, ProbeEngine, Renderer,
//!     RoundScheduler, SystemResolver,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitorConfig::new(pingwatch::pattern::expand("web-[01:03]")?);
//! let engine = ProbeEngine::new(
//!     Arc::new(SystemResolver::new()),
//!     Arc::new(IcmpPinger::new()?),
//!     HistoryStore::new(),
//! );
//! let scheduler = RoundScheduler::new(engine, Renderer::new(config.palette), &config);
//! scheduler.run(&mut Dashboard::stdout()).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod pattern;
pub mod probe;
pub mod render;
pub mod scheduler;
pub mod storage;

pub use config::{Cli, ConfigError, MonitorConfig};
pub use pattern::{PatternError, expand, expand_all};
pub use probe::{
    HostOutcome, IcmpPinger, Pinger, ProbeEngine, ProbeError, Resolver, RoundSummary,
    SystemResolver,
};
pub use render::{Dashboard, Palette, Renderer};
pub use scheduler::RoundScheduler;
pub use storage::{History, HistoryStore, HostRecord, HostStatus};
