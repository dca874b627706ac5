//! Short-lived memoisation of provider results.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::ProviderError;
use crate::traits::AttributeProvider;
use crate::types::AccountData;

/// How long a fetched result is reused unless overridden.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

struct Entry {
    fetched_at: Instant,
    data: AccountData,
}

/// Wraps a provider and reuses successful results per subject for `ttl`.
///
/// Failures are not cached: the next call after an error fetches again.
/// Concurrent misses for the same subject may each reach the inner provider.
pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl<P: AttributeProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL)
    }

    pub fn with_ttl(inner: P, ttl: Duration) -> Self {
        CachedProvider {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn cached(&self, subject: &str) -> Option<AccountData> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(subject)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.data.clone())
    }

    fn store(&self, subject: &str, data: AccountData) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| entry.fetched_at.elapsed() < self.ttl);
        entries.insert(
            subject.to_string(),
            Entry {
                fetched_at: Instant::now(),
                data,
            },
        );
    }
}

impl<P: AttributeProvider> AttributeProvider for CachedProvider<P> {
    fn fetch(&self, subject: &str) -> Result<AccountData, ProviderError> {
        if let Some(data) = self.cached(subject) {
            debug!(event = "Provider", phase = "CacheHit");
            return Ok(data);
        }
        let data = self.inner.fetch(subject)?;
        self.store(subject, data.clone());
        Ok(data)
    }
}
