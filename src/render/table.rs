//! Dashboard table rendering.

use chrono::{DateTime, Local};
use crossterm::style::{Color, Stylize, style};

use crate::render::glyphs::{format_latency, sparkline, trend};
use crate::storage::{HistoryStore, HostRecord, HostStatus};

const HOST_WIDTH: usize = 18;
const ADDRESS_WIDTH: usize = 18;
const STATUS_WIDTH: usize = 13;
const LATENCY_WIDTH: usize = 10;
const TREND_WIDTH: usize = 10;
const RULE_WIDTH: usize = 90;

/// How cells are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    /// ANSI foreground colors.
    #[default]
    Ansi,
    /// No escape sequences at all.
    Plain,
}

impl Palette {
    /// Wrap `text` in `color`, or return it unchanged for [`Palette::Plain`].
    pub fn paint(self, text: &str, color: Color) -> String {
        match self {
            Self::Ansi => style(text).with(color).to_string(),
            Self::Plain => text.to_string(),
        }
    }
}

/// Color for a status cell.
fn status_color(status: HostStatus) -> Color {
    match status {
        HostStatus::Responding => Color::Green,
        HostStatus::Timeout | HostStatus::ResolveError => Color::Red,
        HostStatus::Unresolved | HostStatus::Pending => Color::Yellow,
    }
}

/// Left-align `cell` to `width` visible characters.
///
/// `visible` is the on-screen length of `cell`, which differs from its byte
/// length once escape sequences are embedded.
fn pad(cell: &str, visible: usize, width: usize) -> String {
    let fill = width.saturating_sub(visible);
    format!("{cell}{}", " ".repeat(fill))
}

/// Builds the dashboard text from the history store.
///
/// Rendering only reads the store; the same snapshot always yields the same
/// rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    palette: Palette,
}

impl Renderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// Render the dashboard with the current local time in the footer.
    pub fn render<S: AsRef<str>>(&self, host_order: &[S], store: &HistoryStore) -> String {
        self.render_at(host_order, store, Local::now())
    }

    /// Render the dashboard with an explicit footer timestamp.
    pub fn render_at<S: AsRef<str>>(
        &self,
        host_order: &[S],
        store: &HistoryStore,
        now: DateTime<Local>,
    ) -> String {
        let mut out = format!(
            "{:<HOST_WIDTH$} {:<ADDRESS_WIDTH$} {:<STATUS_WIDTH$} {:<LATENCY_WIDTH$} {:<TREND_WIDTH$} {}\n",
            "Host", "IP", "Status", "RTT", "History", "RTT Graph"
        );
        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push('\n');

        for record in store.snapshot(host_order) {
            out.push_str(&self.row(&record));
            out.push('\n');
        }

        out.push_str(&format!(
            "\n{} | Total hosts: {} | Ctrl+C to stop\n",
            now.format("%Y-%m-%d %H:%M:%S"),
            host_order.len()
        ));
        out
    }

    fn row(&self, record: &HostRecord) -> String {
        let address = record.address.map(|a| a.to_string()).unwrap_or_default();
        let status = format!("{:<STATUS_WIDTH$}", record.status.as_ref());
        let outcomes = record.history.outcomes();

        format!(
            "{:<HOST_WIDTH$} {:<ADDRESS_WIDTH$} {} {:<LATENCY_WIDTH$} {} {}",
            record.hostname,
            address,
            self.palette.paint(&status, status_color(record.status)),
            format_latency(record.last_latency),
            pad(&trend(outcomes, self.palette), outcomes.len(), TREND_WIDTH),
            sparkline(record.history.latencies()),
        )
    }
}
