//! Round scheduler: probe, render, sleep, repeat.

use std::io::{self, Write};
use std::time::Duration;

use crate::config::MonitorConfig;
use crate::probe::{ProbeEngine, RoundSummary};
use crate::render::{Dashboard, Renderer};

/// Drives monitoring rounds until the surrounding task is cancelled.
///
/// Rounds never overlap: every host of round N has been classified before
/// round N is rendered, and round N+1 starts only after the interval.
#[derive(Debug)]
pub struct RoundScheduler {
    engine: ProbeEngine,
    renderer: Renderer,
    hosts: Vec<String>,
    timeout: Duration,
    interval: Duration,
}

impl RoundScheduler {
    /// Create a scheduler for the hosts and timing in `config`.
    pub fn new(engine: ProbeEngine, renderer: Renderer, config: &MonitorConfig) -> Self {
        Self {
            engine,
            renderer,
            hosts: config.hosts.clone(),
            timeout: config.timeout,
            interval: config.interval,
        }
    }

    /// Hosts in display order.
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Run one round: probe every host, then draw the result.
    pub async fn run_round<W: Write>(
        &self,
        dashboard: &mut Dashboard<W>,
    ) -> io::Result<RoundSummary> {
        let summary = self.engine.probe_round(&self.hosts, self.timeout).await;
        let frame = self.renderer.render(&self.hosts, self.engine.store());
        dashboard.draw(&frame)?;
        Ok(summary)
    }

    /// Run rounds forever.
    ///
    /// Only returns if writing to the dashboard fails; stopping is done by
    /// dropping the future.
    pub async fn run<W: Write>(&self, dashboard: &mut Dashboard<W>) -> io::Result<()> {
        tracing::info!(
            hosts = self.hosts.len(),
            timeout_ms = self.timeout.as_millis(),
            interval = ?self.interval,
            "Starting monitor"
        );
        loop {
            self.run_round(dashboard).await?;
            tokio::time::sleep(self.interval).await;
        }
    }
}
