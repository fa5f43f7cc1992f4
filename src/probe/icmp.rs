//! System resolver and ICMP echo implementation.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use surge_ping::{Client, Config, PingIdentifier, PingSequence, SurgeError};

use crate::probe::traits::{Pinger, ProbeError, Resolver};

/// Resolver backed by the operating system (`getaddrinfo` via tokio).
///
/// IPv4 literals are returned as-is without a lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl SystemResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Resolver for SystemResolver {
    async fn resolve(&self, host: &str) -> Result<Ipv4Addr, ProbeError> {
        if let Ok(ip) = host.parse::<Ipv4Addr>() {
            return Ok(ip);
        }

        let addrs = tokio::net::lookup_host(format!("{host}:0"))
            .await
            .map_err(|source| ProbeError::Resolve {
                host: host.to_string(),
                source,
            })?;

        addrs
            .into_iter()
            .find_map(|addr| match addr.ip() {
                IpAddr::V4(ip) => Some(ip),
                IpAddr::V6(_) => None,
            })
            .ok_or_else(|| ProbeError::NoIpv4(host.to_string()))
    }
}

/// ICMP echo pinger built on `surge-ping`.
///
/// One socket is shared by all hosts; each call creates a fresh pinger with
/// a random identifier.
#[derive(Clone)]
pub struct IcmpPinger {
    client: Client,
}

impl IcmpPinger {
    /// Open the ICMPv4 socket.
    ///
    /// # Errors
    /// Returns `ProbeError::Client` when the socket cannot be created, which
    /// usually means the process lacks raw-socket privileges.
    pub fn new() -> Result<Self, ProbeError> {
        let client = Client::new(&Config::default()).map_err(ProbeError::Client)?;
        Ok(Self { client })
    }
}

impl std::fmt::Debug for IcmpPinger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IcmpPinger").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Pinger for IcmpPinger {
    async fn ping(&self, addr: Ipv4Addr, timeout: Duration) -> Result<Duration, ProbeError> {
        let mut pinger = self
            .client
            .pinger(IpAddr::V4(addr), PingIdentifier(rand::random()))
            .await;
        pinger.timeout(timeout);

        match pinger.ping(PingSequence(0), &[]).await {
            Ok((_, rtt)) => Ok(rtt),
            Err(SurgeError::Timeout { .. }) => Err(ProbeError::Timeout),
            Err(e) => Err(ProbeError::Ping(e.to_string())),
        }
    }
}
