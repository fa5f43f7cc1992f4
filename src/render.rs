//! Presentation Layer
//!
//! Turns the history store into the live dashboard:
//!
//! - [`Renderer`]: Fixed-width table, one row per probed host in display order
//! - [`sparkline`] / [`trend`]: Per-host encodings of the rolling history
//! - [`Dashboard`]: Clears the terminal and writes each frame

mod glyphs;
mod table;
mod terminal;

pub use glyphs::{
    NO_LATENCY, SPARK_BLOCKS, SPARK_TIMEOUT, TREND_FAIL, TREND_OK, format_latency, sparkline,
    trend,
};
pub use table::{Palette, Renderer};
pub use terminal::Dashboard;
