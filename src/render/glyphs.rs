//! Cell encodings derived from a host's history.

use std::time::Duration;

use crossterm::style::Color;

use crate::render::table::Palette;
use crate::storage::HISTORY_CAPACITY;

/// Sparkline glyphs, lowest to highest.
pub const SPARK_BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Sparkline glyph for a timed-out sample.
pub const SPARK_TIMEOUT: char = '-';

/// Latency cell shown when no latency is available.
pub const NO_LATENCY: &str = "--------";

/// Trend mark for a successful sample.
pub const TREND_OK: char = '+';

/// Trend mark for a failed sample.
pub const TREND_FAIL: char = '-';

/// Format a round-trip time as milliseconds with three decimals.
pub fn format_latency(rtt: Duration) -> String {
    if rtt.is_zero() {
        return NO_LATENCY.to_string();
    }
    format!("{:.3}ms", rtt.as_micros() as f64 / 1000.0)
}

/// One colored mark per outcome, newest leftmost.
pub fn trend(outcomes: &[bool], palette: Palette) -> String {
    outcomes
        .iter()
        .map(|&ok| {
            if ok {
                palette.paint(&TREND_OK.to_string(), Color::Green)
            } else {
                palette.paint(&TREND_FAIL.to_string(), Color::Red)
            }
        })
        .collect()
}

/// Relative-latency sparkline, newest leftmost.
///
/// Heights are scaled against the largest latency in the window. When every
/// sample is a timeout (or there are none) a fixed placeholder is returned.
pub fn sparkline(latencies: &[Duration]) -> String {
    let max = latencies.iter().max().copied().unwrap_or_default();
    if max.is_zero() {
        return SPARK_TIMEOUT.to_string().repeat(HISTORY_CAPACITY);
    }

    let top = SPARK_BLOCKS.len() - 1;
    latencies
        .iter()
        .map(|rtt| {
            if rtt.is_zero() {
                return SPARK_TIMEOUT;
            }
            let level = (rtt.as_nanos() * top as u128 / max.as_nanos()) as usize;
            SPARK_BLOCKS[level.min(top)]
        })
        .collect()
}
