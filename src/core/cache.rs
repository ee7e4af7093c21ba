use crate::core::error::FetchError;
use crate::core::quote::Quote;
use crate::core::symbol::CacheKey;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

pub const DEFAULT_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
struct CacheEntry {
    quote: Quote,
    stored_at: Instant,
}

type Slot = Arc<Mutex<Option<CacheEntry>>>;

/// TTL-bounded store of the latest quote per (symbol, currency).
///
/// Each key owns its own lock, held for the duration of a fetch, so at most
/// one fetch per key is in flight while distinct keys fetch in parallel.
/// A key keeps its slot once a quote is stored; slots whose first fetch
/// fails are released again.
pub struct QuoteCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
    ttl: Duration,
    fetch_timeout: Duration,
}

impl QuoteCache {
    pub fn new(ttl: Duration, fetch_timeout: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
            fetch_timeout,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Returns the live quote for `key`, or runs `fetch` to refresh it.
    ///
    /// Callers that queued behind an in-flight fetch for the same key receive
    /// that fetch's quote instead of issuing their own, even with a zero TTL.
    /// A failed fetch leaves the previous entry untouched.
    pub async fn get_or_fetch<F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<Quote, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Quote, FetchError>>,
    {
        let requested_at = Instant::now();
        let slot = self.slot(key).await;
        let mut entry = slot.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.stored_at > requested_at {
                debug!("Cache HIT (coalesced) for key: {}", key);
                return Ok(cached.quote.clone());
            }
            if self.is_fresh(cached) {
                debug!("Cache HIT for key: {}", key);
                return Ok(cached.quote.clone());
            }
            debug!("Cache entry expired for key: {}", key);
        } else {
            debug!("Cache MISS for key: {}", key);
        }

        let result = match tokio::time::timeout(self.fetch_timeout, fetch()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.fetch_timeout)),
        };

        match result {
            Ok(quote) => {
                debug!("Cache PUT for key: {}", key);
                *entry = Some(CacheEntry {
                    quote: quote.clone(),
                    stored_at: Instant::now(),
                });
                Ok(quote)
            }
            Err(e) => {
                warn!(error = %e, "Fetch failed for key: {}", key);
                if entry.is_none() {
                    self.release_empty(key, &slot).await;
                }
                Err(e)
            }
        }
    }

    /// Returns the stored quote for `key` regardless of its age.
    pub async fn peek(&self, key: &CacheKey) -> Option<Quote> {
        let slot = self.slots.lock().await.get(key).cloned()?;
        let entry = slot.lock().await;
        entry.as_ref().map(|cached| cached.quote.clone())
    }

    /// Number of keys holding a quote or with a fetch in flight.
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }

    async fn slot(&self, key: &CacheKey) -> Slot {
        let mut slots = self.slots.lock().await;
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Removes a slot that never held a quote, unless another caller is
    /// already queued on it. Cloning a slot requires the map lock, so the
    /// count cannot grow while it is held.
    async fn release_empty(&self, key: &CacheKey, slot: &Slot) {
        let mut slots = self.slots.lock().await;
        if Arc::strong_count(slot) == 2 {
            debug!("Releasing empty slot for key: {}", key);
            slots.remove(key);
        }
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        !self.ttl.is_zero() && entry.stored_at.elapsed() < self.ttl
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_FETCH_TIMEOUT)
    }
}
