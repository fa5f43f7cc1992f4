//! Shared in-memory store of host records.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::storage::types::HostRecord;

/// Concurrent map from hostname to [`HostRecord`].
///
/// Cloning is cheap and yields a handle to the same records. Mutation goes
/// through [`HistoryStore::upsert`], which applies the whole change under
/// the write lock so readers never see a half-updated record. The lock is
/// never held across an `.await`.
#[derive(Clone, Default)]
pub struct HistoryStore {
    records: Arc<RwLock<HashMap<String, HostRecord>>>,
}

impl HistoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or create the record for `hostname` and apply `mutate` to it.
    ///
    /// Returns whatever `mutate` returns.
    pub fn upsert<F, R>(&self, hostname: &str, mutate: F) -> R
    where
        F: FnOnce(&mut HostRecord) -> R,
    {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let record = records
            .entry(hostname.to_string())
            .or_insert_with(|| HostRecord::new(hostname));
        mutate(record)
    }

    /// Copy the records for `host_order`, in that order.
    ///
    /// Hosts that have never been probed are skipped. All records are read
    /// under a single lock acquisition.
    pub fn snapshot<S: AsRef<str>>(&self, host_order: &[S]) -> Vec<HostRecord> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        host_order
            .iter()
            .filter_map(|host| records.get(host.as_ref()).cloned())
            .collect()
    }

    /// Copy of a single record.
    pub fn get(&self, hostname: &str) -> Option<HostRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(hostname)
            .cloned()
    }

    /// Number of hosts with a record.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("host_count", &self.len())
            .finish_non_exhaustive()
    }
}
