//! Command-line surface and validated runtime configuration.
//!
//! [`Cli`] is the raw `clap` definition; [`Cli::into_config`] expands host
//! patterns and validates values, producing a [`MonitorConfig`].

use std::time::Duration;

use clap::{ArgGroup, Parser};
use thiserror::Error;

use crate::pattern::{PatternError, expand_all};
use crate::render::Palette;

// =============================================================================
// Constants
// =============================================================================

/// Default per-probe timeout (5 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default pause between rounds (1 second).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A `-s` pattern failed to expand.
    #[error("Error in -s pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: PatternError,
    },

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    ValidationError(String),
}

// =============================================================================
// Command Line
// =============================================================================

/// Continuously ping a set of hosts and show a live reachability table.
#[derive(Parser, Debug)]
#[command(name = "pingwatch", version, about, long_about = None)]
#[command(group(ArgGroup::new("targets").required(true).args(["patterns", "hosts"])))]
pub struct Cli {
    /// Synthetic host pattern like host-[001:004] (repeatable)
    #[arg(short = 's', long = "synthetic", value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Hosts to monitor
    #[arg(value_name = "HOST")]
    pub hosts: Vec<String>,

    /// Print the expanded host list and exit
    #[arg(long = "printhosts", visible_alias = "print-hosts")]
    pub print_hosts: bool,

    /// Timeout in milliseconds per ping
    #[arg(short = 't', long = "timeout", value_name = "MS", default_value_t = 5000)]
    pub timeout_ms: u64,

    /// Seconds between rounds
    #[arg(short = 'i', long = "interval", value_name = "SECONDS", default_value_t = 1)]
    pub interval_secs: u64,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Expand patterns and validate values.
    ///
    /// # Errors
    /// Returns `ConfigError::Pattern` for the first pattern that fails to
    /// expand and `ConfigError::ValidationError` for out-of-range values.
    pub fn into_config(self) -> Result<MonitorConfig, ConfigError> {
        let hosts = if self.patterns.is_empty() {
            self.hosts
        } else {
            expand_all(&self.patterns)
                .map_err(|(pattern, source)| ConfigError::Pattern { pattern, source })?
        };

        let palette = if self.no_color {
            Palette::Plain
        } else {
            Palette::Ansi
        };

        let config = MonitorConfig::new(hosts)
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_interval(Duration::from_secs(self.interval_secs))
            .with_print_hosts(self.print_hosts)
            .with_palette(palette);
        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Monitor Configuration
// =============================================================================

/// Validated settings for a monitoring session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Hosts in display order.
    pub hosts: Vec<String>,
    /// Maximum wait for each echo reply.
    pub timeout: Duration,
    /// Pause after each rendered round.
    pub interval: Duration,
    /// Print hosts and exit instead of monitoring.
    pub print_hosts: bool,
    /// Dashboard coloring.
    pub palette: Palette,
}

impl MonitorConfig {
    /// Create a configuration with default timing.
    pub fn new(hosts: Vec<String>) -> Self {
        Self {
            hosts,
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
            print_hosts: false,
            palette: Palette::Ansi,
        }
    }

    /// Set the per-probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the pause between rounds.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set print-hosts mode.
    pub fn with_print_hosts(mut self, print_hosts: bool) -> Self {
        self.print_hosts = print_hosts;
        self
    }

    /// Set the dashboard palette.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hosts.is_empty() {
            return Err(ConfigError::ValidationError(
                "no hosts to monitor".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("pingwatch").chain(args.iter().copied()))
    }

    #[test]
    fn test_explicit_hosts_with_defaults() {
        let config = parse(&["a.example", "b.example"])
            .unwrap()
            .into_config()
            .unwrap();

        assert_eq!(config.hosts, ["a.example", "b.example"]);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.interval, DEFAULT_INTERVAL);
        assert!(!config.print_hosts);
        assert_eq!(config.palette, Palette::Ansi);
    }

    #[test]
    fn test_patterns_concatenate_in_order() {
        let config = parse(&["-s", "web-[1:2]", "-s", "db-[a,b]", "--printhosts"])
            .unwrap()
            .into_config()
            .unwrap();

        assert_eq!(config.hosts, ["web-1", "web-2", "db-a", "db-b"]);
        assert!(config.print_hosts);
    }

    #[test]
    fn test_timing_flags() {
        let config = parse(&["-t", "250", "-i", "3", "--no-color", "h"])
            .unwrap()
            .into_config()
            .unwrap();

        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.interval, Duration::from_secs(3));
        assert_eq!(config.palette, Palette::Plain);
    }

    #[test]
    fn test_print_hosts_alias() {
        let cli = parse(&["--print-hosts", "h"]).unwrap();
        assert!(cli.print_hosts);
    }

    #[test]
    fn test_targets_required() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_hosts_and_patterns_conflict() {
        let err = parse(&["-s", "h[1:2]", "other"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_bad_pattern_names_pattern() {
        let err = parse(&["-s", "ok", "-s", "bad-[9:1]"])
            .unwrap()
            .into_config()
            .unwrap_err();

        assert!(matches!(&err, ConfigError::Pattern { pattern, .. } if pattern == "bad-[9:1]"));
        assert!(err.to_string().starts_with("Error in -s pattern 'bad-[9:1]'"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = parse(&["-t", "0", "h"]).unwrap().into_config().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_monitor_config_builder() {
        let config = MonitorConfig::new(vec!["h".to_string()])
            .with_timeout(Duration::from_millis(100))
            .with_interval(Duration::ZERO);

        assert!(config.validate().is_ok());
        assert_eq!(config.timeout, Duration::from_millis(100));
        assert!(MonitorConfig::new(Vec::new()).validate().is_err());
    }
}
