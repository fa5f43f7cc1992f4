//! Core probe traits and types.

use std::net::Ipv4Addr;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while probing a single host.
///
/// These are per-host observations, not failures of the monitor: the engine
/// turns every one of them into a status and, where applicable, a history
/// sample.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Name lookup failed.
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// Name resolved, but only to non-IPv4 addresses.
    #[error("no IPv4 address found for {0}")]
    NoIpv4(String),

    /// No echo reply before the deadline.
    #[error("timeout elapsed")]
    Timeout,

    /// Echo request failed for a reason other than a timeout.
    #[error("ping error: {0}")]
    Ping(String),

    /// ICMP socket could not be created.
    #[error("failed to create ICMP client: {0}")]
    Client(#[source] std::io::Error),
}

/// Maps a hostname to an IPv4 address.
///
/// Called once per host per round; implementations must not cache results
/// across calls.
#[async_trait::async_trait]
pub trait Resolver: Send + Sync + 'static {
    /// Resolve `host` to an IPv4 address.
    async fn resolve(&self, host: &str) -> Result<Ipv4Addr, ProbeError>;
}

/// Sends a single ICMP echo request.
#[async_trait::async_trait]
pub trait Pinger: Send + Sync + 'static {
    /// Send one echo request to `addr` and wait at most `timeout` for the
    /// reply.
    ///
    /// # Returns
    ///
    /// - `Ok(rtt)`: reply received, `rtt` is the measured round-trip time
    /// - `Err(ProbeError::Timeout)`: no reply before `timeout`
    /// - `Err(_)`: the request could not be sent or the reply was invalid
    async fn ping(&self, addr: Ipv4Addr, timeout: Duration) -> Result<Duration, ProbeError>;
}
