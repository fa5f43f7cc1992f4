//! Probe engine: one resolve-then-echo attempt per host per round.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinSet;

use crate::probe::traits::{Pinger, ProbeError, Resolver};
use crate::storage::HistoryStore;

/// Final classification of one host for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOutcome {
    /// Echo reply with the measured round-trip time.
    Responding(Duration),
    /// No reply within the timeout, or the echo request failed.
    Timeout,
    /// Hostname did not resolve.
    ResolveError,
}

/// Tally of one probe round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub round: u64,
    pub responding: usize,
    pub timed_out: usize,
    pub resolve_errors: usize,
    /// Tasks that panicked or were cancelled before classifying.
    pub aborted: usize,
    /// Attempts whose classification lost to an earlier one for the same
    /// host in this round (duplicate hostnames).
    pub superseded: usize,
}

impl RoundSummary {
    fn record(&mut self, outcome: HostOutcome) {
        match outcome {
            HostOutcome::Responding(_) => self.responding += 1,
            HostOutcome::Timeout => self.timed_out += 1,
            HostOutcome::ResolveError => self.resolve_errors += 1,
        }
    }
}

/// Runs probe rounds and writes their outcomes into a [`HistoryStore`].
pub struct ProbeEngine {
    resolver: Arc<dyn Resolver>,
    pinger: Arc<dyn Pinger>,
    store: HistoryStore,
    next_round: AtomicU64,
}

impl ProbeEngine {
    /// Create an engine writing into `store`.
    pub fn new(resolver: Arc<dyn Resolver>, pinger: Arc<dyn Pinger>, store: HistoryStore) -> Self {
        Self {
            resolver,
            pinger,
            store,
            next_round: AtomicU64::new(1),
        }
    }

    /// Handle to the store this engine writes into.
    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Probe every host once, concurrently, and wait for all of them.
    ///
    /// Each echo wait is bounded by `timeout`, so the round takes roughly
    /// `timeout` (plus resolution time) regardless of the host count.
    pub async fn probe_round<S: AsRef<str>>(&self, hosts: &[S], timeout: Duration) -> RoundSummary {
        let round = self.next_round.fetch_add(1, Ordering::Relaxed);
        let mut tasks = JoinSet::new();

        for host in hosts {
            let host = host.as_ref().to_string();
            let resolver = Arc::clone(&self.resolver);
            let pinger = Arc::clone(&self.pinger);
            let store = self.store.clone();
            tasks.spawn(async move {
                probe_host(resolver.as_ref(), pinger.as_ref(), &store, &host, round, timeout).await
            });
        }

        let mut summary = RoundSummary {
            round,
            ..Default::default()
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(outcome)) => summary.record(outcome),
                Ok(None) => summary.superseded += 1,
                Err(e) => {
                    tracing::error!(round, error = %e, "Probe task failed");
                    summary.aborted += 1;
                }
            }
        }

        tracing::debug!(
            round,
            responding = summary.responding,
            timed_out = summary.timed_out,
            resolve_errors = summary.resolve_errors,
            aborted = summary.aborted,
            superseded = summary.superseded,
            "Probe round complete"
        );
        summary
    }
}

impl std::fmt::Debug for ProbeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeEngine")
            .field("store", &self.store)
            .field("next_round", &self.next_round)
            .finish_non_exhaustive()
    }
}

/// Resolve `host`, send one echo request, and record the outcome.
///
/// Returns `None` when the record was already classified for `round`, in
/// which case nothing this attempt observed was stored.
async fn probe_host(
    resolver: &dyn Resolver,
    pinger: &dyn Pinger,
    store: &HistoryStore,
    host: &str,
    round: u64,
    timeout: Duration,
) -> Option<HostOutcome> {
    let addr = match resolver.resolve(host).await {
        Ok(addr) => addr,
        Err(e) => {
            tracing::debug!(host, round, error = %e, "Failed to resolve hostname");
            return store
                .upsert(host, |r| r.mark_resolve_error(round))
                .then_some(HostOutcome::ResolveError);
        }
    };

    if !store.upsert(host, |r| r.mark_pending(round, addr)) {
        tracing::debug!(host, %addr, round, "Host already classified this round");
        return None;
    }

    match echo(pinger, addr, timeout).await {
        Ok(rtt) => {
            tracing::debug!(host, %addr, round, rtt_ms = rtt.as_secs_f64() * 1000.0, "Ping reply");
            store
                .upsert(host, |r| r.record_reply(round, rtt))
                .then_some(HostOutcome::Responding(rtt))
        }
        Err(e) => {
            match &e {
                ProbeError::Timeout => {
                    tracing::debug!(host, %addr, round, timeout_ms = timeout.as_millis(), "Ping timed out")
                }
                _ => tracing::warn!(host, %addr, round, error = %e, "Ping failed"),
            }
            store
                .upsert(host, |r| r.record_timeout(round))
                .then_some(HostOutcome::Timeout)
        }
    }
}

/// One echo request, abandoned once `timeout` has elapsed even if the
/// pinger itself does not honour it.
async fn echo(pinger: &dyn Pinger, addr: Ipv4Addr, timeout: Duration) -> Result<Duration, ProbeError> {
    tokio::time::timeout(timeout, pinger.ping(addr, timeout))
        .await
        .unwrap_or(Err(ProbeError::Timeout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::expand_all;
    use crate::storage::HostStatus;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    #[derive(Clone, Copy)]
    enum Reply {
        After(Duration),
        Never,
        Fail,
    }

    /// Resolver answering from a fixed table; addresses can be changed
    /// between rounds.
    #[derive(Default)]
    struct TableResolver {
        table: Mutex<HashMap<String, Ipv4Addr>>,
    }

    impl TableResolver {
        fn set(&self, host: &str, addr: Ipv4Addr) {
            self.table.lock().unwrap().insert(host.to_string(), addr);
        }

        fn remove(&self, host: &str) {
            self.table.lock().unwrap().remove(host);
        }
    }

    #[async_trait::async_trait]
    impl Resolver for TableResolver {
        async fn resolve(&self, host: &str) -> Result<Ipv4Addr, ProbeError> {
            self.table
                .lock()
                .unwrap()
                .get(host)
                .copied()
                .ok_or_else(|| ProbeError::NoIpv4(host.to_string()))
        }
    }

    #[derive(Default)]
    struct ScriptedPinger {
        replies: Mutex<HashMap<Ipv4Addr, Reply>>,
    }

    impl ScriptedPinger {
        fn set(&self, addr: Ipv4Addr, reply: Reply) {
            self.replies.lock().unwrap().insert(addr, reply);
        }
    }

    #[async_trait::async_trait]
    impl Pinger for ScriptedPinger {
        async fn ping(&self, addr: Ipv4Addr, _timeout: Duration) -> Result<Duration, ProbeError> {
            let reply = self.replies.lock().unwrap().get(&addr).copied();
            match reply.unwrap_or(Reply::Never) {
                Reply::After(rtt) => {
                    tokio::time::sleep(rtt).await;
                    Ok(rtt)
                }
                // Ignores the timeout on purpose; the engine must cut it off.
                Reply::Never => std::future::pending().await,
                Reply::Fail => Err(ProbeError::Ping("host unreachable".to_string())),
            }
        }
    }

    /// Resolver whose answers arrive later with every call.
    struct StaggeredResolver {
        addr: Ipv4Addr,
        step: Duration,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Resolver for StaggeredResolver {
        async fn resolve(&self, _host: &str) -> Result<Ipv4Addr, ProbeError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) as u32;
            tokio::time::sleep(self.step * call).await;
            Ok(self.addr)
        }
    }

    fn ip(last: u8) -> Ipv4Addr {
        Ipv4Addr::new(10, 0, 0, last)
    }

    fn engine(resolver: &Arc<TableResolver>, pinger: &Arc<ScriptedPinger>) -> ProbeEngine {
        ProbeEngine::new(resolver.clone(), pinger.clone(), HistoryStore::new())
    }

    const TIMEOUT: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn test_round_classifies_each_host() {
        let resolver = Arc::new(TableResolver::default());
        let pinger = Arc::new(ScriptedPinger::default());
        resolver.set("up", ip(1));
        resolver.set("down", ip(2));
        resolver.set("broken", ip(3));
        pinger.set(ip(1), Reply::After(Duration::from_millis(12)));
        pinger.set(ip(2), Reply::Never);
        pinger.set(ip(3), Reply::Fail);

        let engine = engine(&resolver, &pinger);
        let summary = engine
            .probe_round(&["up", "down", "broken", "missing"], TIMEOUT)
            .await;

        assert_eq!(summary.round, 1);
        assert_eq!(summary.responding, 1);
        assert_eq!(summary.timed_out, 2);
        assert_eq!(summary.resolve_errors, 1);

        let store = engine.store();
        let up = store.get("up").unwrap();
        assert_eq!(up.status, HostStatus::Responding);
        assert_eq!(up.last_latency, Duration::from_millis(12));
        assert_eq!(up.history.outcomes(), [true]);
        assert_eq!(up.address, Some(ip(1)));

        let down = store.get("down").unwrap();
        assert_eq!(down.status, HostStatus::Timeout);
        assert_eq!(down.last_latency, Duration::ZERO);
        assert_eq!(down.history.latencies(), [Duration::ZERO]);

        assert_eq!(store.get("broken").unwrap().status, HostStatus::Timeout);

        let missing = store.get("missing").unwrap();
        assert_eq!(missing.status, HostStatus::ResolveError);
        assert!(missing.history.is_empty());
        assert_eq!(missing.address, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_duration_bounded_by_timeout() {
        let resolver = Arc::new(TableResolver::default());
        let pinger = Arc::new(ScriptedPinger::default());
        let hosts: Vec<String> = (1..=20).map(|n| format!("h{n}")).collect();
        for (n, host) in hosts.iter().enumerate() {
            resolver.set(host, ip(n as u8 + 1));
        }

        let engine = engine(&resolver, &pinger);
        let start = tokio::time::Instant::now();
        engine.probe_round(&hosts, TIMEOUT).await;
        let elapsed = start.elapsed();

        assert!(elapsed >= TIMEOUT);
        assert!(elapsed < TIMEOUT * 2, "round took {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_failure_keeps_history_and_address() {
        let resolver = Arc::new(TableResolver::default());
        let pinger = Arc::new(ScriptedPinger::default());
        resolver.set("flaky", ip(7));
        pinger.set(ip(7), Reply::After(Duration::from_millis(3)));

        let engine = engine(&resolver, &pinger);
        engine.probe_round(&["flaky"], TIMEOUT).await;
        engine.probe_round(&["flaky"], TIMEOUT).await;
        let before = engine.store().get("flaky").unwrap();

        resolver.remove("flaky");
        engine.probe_round(&["flaky"], TIMEOUT).await;
        let after = engine.store().get("flaky").unwrap();

        assert_eq!(after.status, HostStatus::ResolveError);
        assert_eq!(after.address, before.address);
        assert_eq!(after.history, before.history);
        assert_eq!(after.history.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_address_re_resolved_every_round() {
        let resolver = Arc::new(TableResolver::default());
        let pinger = Arc::new(ScriptedPinger::default());
        resolver.set("moving", ip(1));
        pinger.set(ip(1), Reply::After(Duration::from_millis(1)));
        pinger.set(ip(2), Reply::After(Duration::from_millis(2)));

        let engine = engine(&resolver, &pinger);
        engine.probe_round(&["moving"], TIMEOUT).await;
        assert_eq!(engine.store().get("moving").unwrap().address, Some(ip(1)));

        resolver.set("moving", ip(2));
        engine.probe_round(&["moving"], TIMEOUT).await;
        let record = engine.store().get("moving").unwrap();
        assert_eq!(record.address, Some(ip(2)));
        assert_eq!(
            record.history.latencies(),
            [Duration::from_millis(2), Duration::from_millis(1)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_bounded_across_rounds() {
        let resolver = Arc::new(TableResolver::default());
        let pinger = Arc::new(ScriptedPinger::default());
        resolver.set("h", ip(1));

        let engine = engine(&resolver, &pinger);
        for n in 1..=14u64 {
            let reply = if n % 4 == 0 {
                Reply::Never
            } else {
                Reply::After(Duration::from_millis(n))
            };
            pinger.set(ip(1), reply);
            let summary = engine.probe_round(&["h"], TIMEOUT).await;
            assert_eq!(summary.round, n);

            let record = engine.store().get("h").unwrap();
            assert_eq!(record.history.len(), (n as usize).min(10));
            assert_eq!(record.history.outcomes()[0], n % 4 != 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_reply_does_not_resurrect_timeout() {
        let resolver = Arc::new(TableResolver::default());
        let pinger = Arc::new(ScriptedPinger::default());
        resolver.set("slow", ip(9));
        pinger.set(ip(9), Reply::After(TIMEOUT * 3));

        let engine = engine(&resolver, &pinger);
        let summary = engine.probe_round(&["slow"], TIMEOUT).await;
        assert_eq!(summary.timed_out, 1);

        tokio::time::sleep(TIMEOUT * 4).await;
        let record = engine.store().get("slow").unwrap();
        assert_eq!(record.status, HostStatus::Timeout);
        assert_eq!(record.history.outcomes(), [false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_host_settles_once_per_round() {
        let resolver = Arc::new(StaggeredResolver {
            addr: ip(4),
            step: Duration::from_millis(50),
            calls: AtomicUsize::new(0),
        });
        let pinger = Arc::new(ScriptedPinger::default());
        pinger.set(ip(4), Reply::After(Duration::from_millis(10)));

        let hosts = expand_all(["dup", "dup"]).unwrap();
        assert_eq!(hosts, ["dup", "dup"]);

        let engine = ProbeEngine::new(resolver.clone(), pinger, HistoryStore::new());
        let summary = engine.probe_round(&hosts, TIMEOUT).await;

        assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
        assert_eq!(summary.responding, 1);
        assert_eq!(summary.superseded, 1);

        let record = engine.store().get("dup").unwrap();
        assert_eq!(record.status, HostStatus::Responding);
        assert_eq!(record.history.outcomes(), [true]);
        assert_eq!(record.last_latency, Duration::from_millis(10));

        // The next round is a fresh classification again.
        let summary = engine.probe_round(&hosts, TIMEOUT).await;
        assert_eq!(summary.responding, 1);
        assert_eq!(engine.store().get("dup").unwrap().history.len(), 2);
    }
}
