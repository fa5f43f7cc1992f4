//! Core data types for the history store.
//!
//! - [`HostStatus`]: Per-round classification of a host
//! - [`History`]: Bounded, index-aligned outcome/latency samples
//! - [`HostRecord`]: Everything known about one monitored hostname

use std::net::Ipv4Addr;
use std::time::Duration;

use strum_macros::{AsRefStr, Display};

/// Maximum number of samples retained per host.
pub const HISTORY_CAPACITY: usize = 10;

/// Smallest latency stored for a successful sample. Zero is reserved for
/// failures.
pub const MIN_REPLY_LATENCY: Duration = Duration::from_micros(1);

/// Status of a host for the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, AsRefStr)]
pub enum HostStatus {
    /// Record exists but no resolution has completed yet.
    #[default]
    Unresolved,
    /// Address resolved, echo request in flight.
    Pending,
    /// Echo reply received within the timeout.
    Responding,
    /// No echo reply within the timeout.
    Timeout,
    /// Hostname could not be resolved to an IPv4 address.
    #[strum(serialize = "Resolve Error")]
    ResolveError,
}

/// Bounded probe history, newest sample first.
///
/// Outcomes and latencies are only ever changed together through
/// [`History::push`], so both sequences always have the same length.
/// A zero latency marks a failed sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    outcomes: Vec<bool>,
    latencies: Vec<Duration>,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a sample, dropping the oldest once the capacity is exceeded.
    ///
    /// Successful samples are stored with at least [`MIN_REPLY_LATENCY`].
    pub fn push(&mut self, success: bool, latency: Duration) {
        let latency = if success {
            latency.max(MIN_REPLY_LATENCY)
        } else {
            Duration::ZERO
        };
        self.outcomes.insert(0, success);
        self.latencies.insert(0, latency);
        self.outcomes.truncate(HISTORY_CAPACITY);
        self.latencies.truncate(HISTORY_CAPACITY);
    }

    /// Success flags, newest first.
    pub fn outcomes(&self) -> &[bool] {
        &self.outcomes
    }

    /// Round-trip times, newest first. Failed samples are zero.
    pub fn latencies(&self) -> &[Duration] {
        &self.latencies
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// State of one monitored host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Hostname as configured; identity key.
    pub hostname: String,
    /// Last successfully resolved address.
    pub address: Option<Ipv4Addr>,
    /// Classification for the current round.
    pub status: HostStatus,
    /// Latest round-trip time, zero unless `status` is `Responding`.
    pub last_latency: Duration,
    /// Rolling sample history.
    pub history: History,
    /// Last round that produced a final classification for this host.
    pub classified_round: Option<u64>,
}

impl HostRecord {
    /// Create a fresh record for a hostname.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            address: None,
            status: HostStatus::Unresolved,
            last_latency: Duration::ZERO,
            history: History::new(),
            classified_round: None,
        }
    }

    /// Record a resolution failure. Address and history are kept.
    pub fn mark_resolve_error(&mut self, round: u64) -> bool {
        if !self.begin_classification(round) {
            return false;
        }
        self.status = HostStatus::ResolveError;
        self.last_latency = Duration::ZERO;
        true
    }

    /// Record a successful resolution ahead of the echo request.
    ///
    /// Ignored once the record has been classified for `round`, so a
    /// duplicate attempt cannot reopen a settled round.
    pub fn mark_pending(&mut self, round: u64, address: Ipv4Addr) -> bool {
        if self.classified_round == Some(round) {
            return false;
        }
        self.address = Some(address);
        self.status = HostStatus::Pending;
        true
    }

    /// Record an echo reply.
    pub fn record_reply(&mut self, round: u64, rtt: Duration) -> bool {
        if !self.begin_classification(round) {
            return false;
        }
        let rtt = rtt.max(MIN_REPLY_LATENCY);
        self.status = HostStatus::Responding;
        self.last_latency = rtt;
        self.history.push(true, rtt);
        true
    }

    /// Record a missing echo reply.
    pub fn record_timeout(&mut self, round: u64) -> bool {
        if !self.begin_classification(round) {
            return false;
        }
        self.status = HostStatus::Timeout;
        self.last_latency = Duration::ZERO;
        self.history.push(false, Duration::ZERO);
        true
    }

    /// First classification for a round wins; later ones are rejected.
    fn begin_classification(&mut self, round: u64) -> bool {
        if self.classified_round == Some(round) {
            tracing::debug!(
                host = %self.hostname,
                round,
                status = %self.status,
                "Ignoring late classification"
            );
            return false;
        }
        self.classified_round = Some(round);
        true
    }
}
