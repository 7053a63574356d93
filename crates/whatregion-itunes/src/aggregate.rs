//! Per-region availability fan-out.
//!
//! Every storefront lookup runs as its own task and reports through a channel
//! as soon as it settles, so one slow or failing region never holds back the
//! rest. Lookup errors stop here: they are logged and the region is reported
//! unavailable.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use whatregion_core::{CanonicalAppId, Region, RegionAvailability, REGIONS};

use crate::cache::LookupCache;
use crate::client::ItunesClient;
use crate::types::{AppRecord, LookupResponse};

/// Outcome of one lookup started by [`Aggregator::spawn_check`].
///
/// `generation` is whatever the caller passed in; it lets a consumer tell
/// results for the current app apart from late arrivals for a previous one.
#[derive(Debug, Clone)]
pub enum LookupEvent {
    Region {
        generation: u64,
        app_id: CanonicalAppId,
        availability: RegionAvailability,
    },
    Baseline {
        generation: u64,
        app_id: CanonicalAppId,
        record: Option<Box<AppRecord>>,
    },
}

impl LookupEvent {
    #[must_use]
    pub fn generation(&self) -> u64 {
        match self {
            LookupEvent::Region { generation, .. } | LookupEvent::Baseline { generation, .. } => {
                *generation
            }
        }
    }

    #[must_use]
    pub fn app_id(&self) -> &CanonicalAppId {
        match self {
            LookupEvent::Region { app_id, .. } | LookupEvent::Baseline { app_id, .. } => app_id,
        }
    }
}

/// Reduces one region's lookup result to its availability.
///
/// `None` (transport, status, parse or timeout failure) and a zero
/// `resultCount` produce the same value.
#[must_use]
pub fn interpret(region: &'static Region, response: Option<&LookupResponse>) -> RegionAvailability {
    match response {
        Some(response) if response.result_count > 0 => RegionAvailability::available(
            region,
            response
                .first_record()
                .and_then(|record| record.formatted_price.clone()),
        ),
        _ => RegionAvailability::unavailable(region),
    }
}

/// Cheap to clone; clones share the HTTP client and the result cache.
#[derive(Clone)]
pub struct Aggregator {
    client: Arc<ItunesClient>,
    cache: Arc<LookupCache>,
    baseline_region: &'static Region,
    regions: &'static [Region],
}

impl Aggregator {
    #[must_use]
    pub fn new(client: ItunesClient, cache: LookupCache, baseline_region: &'static Region) -> Self {
        Self {
            client: Arc::new(client),
            cache: Arc::new(cache),
            baseline_region,
            regions: REGIONS,
        }
    }

    /// Restricts the fan-out to `regions` instead of the full catalog.
    #[must_use]
    pub fn with_regions(mut self, regions: &'static [Region]) -> Self {
        self.regions = regions;
        self
    }

    #[must_use]
    pub fn regions(&self) -> &'static [Region] {
        self.regions
    }

    #[must_use]
    pub fn baseline_region(&self) -> &'static Region {
        self.baseline_region
    }

    #[must_use]
    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    #[must_use]
    pub fn lookup_timeout(&self) -> Duration {
        self.client.timeout()
    }

    /// Forgets every cached result for `app_id`, including failures, so the
    /// next check queries each storefront again. Returns the number of
    /// entries dropped.
    pub async fn refresh(&self, app_id: &CanonicalAppId) -> usize {
        let dropped = self.cache.invalidate_app(app_id).await;
        let remaining = self.cache.len().await;
        tracing::debug!(
            app_id = %app_id,
            dropped,
            remaining,
            "cleared cached lookups"
        );
        dropped
    }

    /// Cached lookup with every error collapsed to `None`.
    async fn lookup(
        &self,
        app_id: &CanonicalAppId,
        region: &'static Region,
    ) -> Option<Arc<LookupResponse>> {
        self.cache
            .get_or_fetch((app_id.clone(), region.code), || async {
                match self.client.lookup(app_id, region.code).await {
                    Ok(response) => Some(response),
                    Err(e) => {
                        tracing::warn!(
                            app_id = %app_id,
                            region = region.code,
                            error = %e,
                            "lookup failed; reporting region as unavailable"
                        );
                        None
                    }
                }
            })
            .await
    }

    /// Availability of `app_id` in a single storefront.
    pub async fn check_region(
        &self,
        app_id: &CanonicalAppId,
        region: &'static Region,
    ) -> RegionAvailability {
        let response = self.lookup(app_id, region).await;
        interpret(region, response.as_deref())
    }

    /// The app's record in the baseline storefront, used for its name,
    /// artwork and description.
    pub async fn baseline(&self, app_id: &CanonicalAppId) -> Option<AppRecord> {
        self.lookup(app_id, self.baseline_region)
            .await
            .and_then(|response| response.first_record().cloned())
    }

    /// Starts the baseline lookup and one task per region, each sending a
    /// [`LookupEvent`] tagged with `generation` when it settles.
    ///
    /// Events arrive in completion order. Sending never blocks; if the
    /// receiver is gone the result is dropped (it still lands in the cache).
    pub fn spawn_check(
        &self,
        app_id: &CanonicalAppId,
        generation: u64,
        tx: &mpsc::UnboundedSender<LookupEvent>,
    ) {
        tracing::debug!(
            app_id = %app_id,
            generation,
            regions = self.regions.len(),
            "starting region fan-out"
        );

        {
            let this = self.clone();
            let app_id = app_id.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let record = this.baseline(&app_id).await.map(Box::new);
                let _ = tx.send(LookupEvent::Baseline {
                    generation,
                    app_id,
                    record,
                });
            });
        }

        for region in self.regions {
            let this = self.clone();
            let app_id = app_id.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let availability = this.check_region(&app_id, region).await;
                let _ = tx.send(LookupEvent::Region {
                    generation,
                    app_id,
                    availability,
                });
            });
        }
    }

    /// One-shot fan-out: a receiver that yields the baseline event and one
    /// event per region, then closes.
    #[must_use]
    pub fn stream(&self, app_id: &CanonicalAppId) -> mpsc::UnboundedReceiver<LookupEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.spawn_check(app_id, 0, &tx);
        rx
    }
}
