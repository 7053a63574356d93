//! In-memory memoization of lookup results keyed by `(app id, storefront)`.
//!
//! A failed lookup is cached as `None` just like a successful one, so a region
//! that errored stays unavailable until its entry expires or is invalidated.
//! Concurrent callers for the same key share a single in-flight request.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, OnceCell};
use whatregion_core::CanonicalAppId;

use crate::types::LookupResponse;

pub type LookupKey = (CanonicalAppId, &'static str);

type Slot = Arc<OnceCell<Option<Arc<LookupResponse>>>>;

struct CacheEntry {
    created_at: Instant,
    slot: Slot,
}

pub struct LookupCache {
    ttl: Duration,
    entries: Mutex<HashMap<LookupKey, CacheEntry>>,
}

impl LookupCache {
    /// A `ttl` of zero disables memoization; every call fetches.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached result for `key`, running `fetch` only when no live
    /// entry exists.
    pub async fn get_or_fetch<F, Fut>(&self, key: LookupKey, fetch: F) -> Option<Arc<LookupResponse>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<LookupResponse>>,
    {
        let slot = {
            let mut entries = self.entries.lock().await;
            match entries.get(&key) {
                Some(entry) if entry.created_at.elapsed() < self.ttl => Arc::clone(&entry.slot),
                _ => {
                    let ttl = self.ttl;
                    entries.retain(|_, entry| entry.created_at.elapsed() < ttl);
                    let slot: Slot = Arc::new(OnceCell::new());
                    entries.insert(
                        key,
                        CacheEntry {
                            created_at: Instant::now(),
                            slot: Arc::clone(&slot),
                        },
                    );
                    slot
                }
            }
        };

        slot.get_or_init(|| async { fetch().await.map(Arc::new) })
            .await
            .clone()
    }

    /// Drops the entry for one key so the next request re-fetches it.
    pub async fn invalidate(&self, app_id: &CanonicalAppId, region_code: &'static str) -> bool {
        self.entries
            .lock()
            .await
            .remove(&(app_id.clone(), region_code))
            .is_some()
    }

    /// Drops every entry for `app_id`, across all storefronts. Returns how
    /// many entries were removed.
    pub async fn invalidate_app(&self, app_id: &CanonicalAppId) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|(id, _), _| id != app_id);
        before - entries.len()
    }

    pub(crate) async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
