//! Live per-region view for one checker session.
//!
//! Each identifier change bumps a generation counter. Lookups are tagged with
//! the generation they were started under, and the board only accepts events
//! whose generation and app id match the current context. A slow response for
//! a previous app therefore never overwrites the view for the current one;
//! nothing is cancelled, late results are simply discarded on arrival.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use whatregion_core::{
    AppIdError, CanonicalAppId, Continent, Region, RegionAvailability, RegionEntry, RegionState,
};

use crate::aggregate::{Aggregator, LookupEvent};
use crate::types::AppRecord;

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum Applied {
    Accepted,
    Stale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "record", rename_all = "snake_case")]
pub enum BaselineState {
    Idle,
    Loading,
    Found(Box<AppRecord>),
    Missing,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContinentGroup {
    pub continent: Continent,
    pub name: &'static str,
    pub regions: Vec<RegionEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    pub total: usize,
    pub settled: usize,
    pub available: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub app_id: Option<CanonicalAppId>,
    pub generation: u64,
    pub baseline: BaselineState,
    pub summary: BoardSummary,
    pub continents: Vec<ContinentGroup>,
}

#[derive(Debug, Clone)]
pub struct RegionBoard {
    generation: u64,
    app_id: Option<CanonicalAppId>,
    baseline: BaselineState,
    entries: Vec<RegionEntry>,
}

impl RegionBoard {
    /// An idle board covering `regions`, with no app selected.
    #[must_use]
    pub fn new(regions: &'static [Region]) -> Self {
        Self {
            generation: 0,
            app_id: None,
            baseline: BaselineState::Idle,
            entries: regions
                .iter()
                .map(|region| RegionEntry {
                    region,
                    state: RegionState::Idle,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn app_id(&self) -> Option<&CanonicalAppId> {
        self.app_id.as_ref()
    }

    #[must_use]
    pub fn baseline(&self) -> &BaselineState {
        &self.baseline
    }

    #[must_use]
    pub fn entries(&self) -> &[RegionEntry] {
        &self.entries
    }

    /// Switches to `app_id`, putting every region back into `Loading`.
    /// Returns the new generation to tag lookups with.
    pub fn set_app_id(&mut self, app_id: CanonicalAppId) -> u64 {
        self.generation += 1;
        self.app_id = Some(app_id);
        self.baseline = BaselineState::Loading;
        for entry in &mut self.entries {
            entry.state = RegionState::Loading;
        }
        self.generation
    }

    fn is_current(&self, generation: u64, app_id: &CanonicalAppId) -> bool {
        generation == self.generation && self.app_id.as_ref() == Some(app_id)
    }

    /// Records one settled lookup, unless it belongs to a superseded context.
    pub fn apply(&mut self, event: LookupEvent) -> Applied {
        if !self.is_current(event.generation(), event.app_id()) {
            tracing::debug!(
                generation = event.generation(),
                current = self.generation,
                app_id = %event.app_id(),
                "discarding stale lookup result"
            );
            return Applied::Stale;
        }

        match event {
            LookupEvent::Region { availability, .. } => self.settle_region(&availability),
            LookupEvent::Baseline { record, .. } => {
                self.baseline = match record {
                    Some(record) => BaselineState::Found(record),
                    None => BaselineState::Missing,
                };
                Applied::Accepted
            }
        }
    }

    fn settle_region(&mut self, availability: &RegionAvailability) -> Applied {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.region.code == availability.region.code)
        {
            Some(entry) => {
                entry.state = RegionState::from(availability);
                Applied::Accepted
            }
            None => Applied::Stale,
        }
    }

    /// Settles everything still loading as unavailable (baseline as missing)
    /// and returns how many regions were affected.
    pub fn expire_pending(&mut self) -> usize {
        if self.baseline == BaselineState::Loading {
            self.baseline = BaselineState::Missing;
        }
        let mut expired = 0;
        for entry in &mut self.entries {
            if entry.state == RegionState::Loading {
                entry.state = RegionState::Unavailable;
                expired += 1;
            }
        }
        expired
    }

    /// True once the baseline and every region have settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(
            self.baseline,
            BaselineState::Found(_) | BaselineState::Missing
        ) && self.entries.iter().all(|entry| entry.state.is_settled())
    }

    #[must_use]
    pub fn summary(&self) -> BoardSummary {
        BoardSummary {
            total: self.entries.len(),
            settled: self
                .entries
                .iter()
                .filter(|entry| entry.state.is_settled())
                .count(),
            available: self
                .entries
                .iter()
                .filter(|entry| matches!(entry.state, RegionState::Available { .. }))
                .count(),
        }
    }

    /// Current state grouped by continent, in catalog order.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        let continents = Continent::ALL
            .iter()
            .filter_map(|&continent| {
                let regions: Vec<RegionEntry> = self
                    .entries
                    .iter()
                    .filter(|entry| entry.region.continent == continent)
                    .cloned()
                    .collect();
                (!regions.is_empty()).then_some(ContinentGroup {
                    continent,
                    name: continent.display_name(),
                    regions,
                })
            })
            .collect();

        BoardSnapshot {
            app_id: self.app_id.clone(),
            generation: self.generation,
            baseline: self.baseline.clone(),
            summary: self.summary(),
            continents,
        }
    }
}

/// Extra wait on top of the lookup timeout before pending regions are given up.
const IDLE_SLACK: Duration = Duration::from_secs(5);

/// A board wired to an aggregator: the state behind one checker page.
pub struct Session {
    aggregator: Aggregator,
    board: RegionBoard,
    idle_timeout: Duration,
    tx: mpsc::UnboundedSender<LookupEvent>,
    rx: mpsc::UnboundedReceiver<LookupEvent>,
}

impl Session {
    #[must_use]
    pub fn new(aggregator: Aggregator) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let board = RegionBoard::new(aggregator.regions());
        let idle_timeout = aggregator.lookup_timeout() + IDLE_SLACK;
        Self {
            aggregator,
            board,
            idle_timeout,
            tx,
            rx,
        }
    }

    /// Overrides how long [`Session::pump`] waits for the next event before
    /// expiring whatever is still loading.
    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    #[must_use]
    pub fn board(&self) -> &RegionBoard {
        &self.board
    }

    /// Normalizes `input`, drops any cached results for it and starts a
    /// fresh check, superseding any check still in flight.
    ///
    /// Every submission re-queries each storefront, so a region that failed
    /// earlier gets another chance.
    ///
    /// # Errors
    ///
    /// Returns [`AppIdError`] when `input` does not yield a numeric app id;
    /// the board is left untouched in that case.
    pub async fn check(&mut self, input: &str) -> Result<CanonicalAppId, AppIdError> {
        let app_id = CanonicalAppId::parse(input)?;
        self.aggregator.refresh(&app_id).await;
        self.check_id(app_id.clone());
        Ok(app_id)
    }

    /// Starts checking an already-canonical id, reusing cached results.
    /// Returns the new generation.
    pub fn check_id(&mut self, app_id: CanonicalAppId) -> u64 {
        let generation = self.board.set_app_id(app_id.clone());
        self.aggregator.spawn_check(&app_id, generation, &self.tx);
        generation
    }

    /// Waits for the next lookup event and applies it to the board.
    ///
    /// Returns `None` when nothing has been checked yet or the current check
    /// has fully settled, since no further current events can arrive. If no
    /// event arrives within the idle timeout the remaining regions are
    /// expired as unavailable and `None` is returned.
    pub async fn pump(&mut self) -> Option<Applied> {
        if self.board.app_id().is_none() || self.board.is_settled() {
            return None;
        }
        match tokio::time::timeout(self.idle_timeout, self.rx.recv()).await {
            Ok(Some(event)) => Some(self.board.apply(event)),
            Ok(None) => None,
            Err(_) => {
                let expired = self.board.expire_pending();
                tracing::warn!(
                    generation = self.board.generation(),
                    expired,
                    idle_timeout_ms = self.idle_timeout.as_millis(),
                    "lookups stopped reporting; marking pending regions unavailable"
                );
                None
            }
        }
    }

    /// Drains events until the current check has settled. Returns how many
    /// stale events were discarded along the way.
    pub async fn settle(&mut self) -> usize {
        let mut stale = 0;
        while let Some(applied) = self.pump().await {
            if applied == Applied::Stale {
                stale += 1;
            }
        }
        stale
    }

    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whatregion_core::{find_region, REGIONS};

    fn id(raw: &str) -> CanonicalAppId {
        CanonicalAppId::parse(raw).unwrap()
    }

    fn region_event(generation: u64, app: &str, code: &str, available: bool) -> LookupEvent {
        let region = find_region(code).unwrap();
        let availability = if available {
            RegionAvailability::available(region, Some("$1.99".to_owned()))
        } else {
            RegionAvailability::unavailable(region)
        };
        LookupEvent::Region {
            generation,
            app_id: id(app),
            availability,
        }
    }

    #[test]
    fn new_board_is_idle() {
        let board = RegionBoard::new(REGIONS);
        assert_eq!(board.generation(), 0);
        assert!(board.app_id().is_none());
        assert!(board
            .entries()
            .iter()
            .all(|entry| entry.state == RegionState::Idle));
        assert!(!board.is_settled());
    }

    #[test]
    fn set_app_id_moves_regions_to_loading() {
        let mut board = RegionBoard::new(REGIONS);
        assert_eq!(board.set_app_id(id("1")), 1);
        assert!(board
            .entries()
            .iter()
            .all(|entry| entry.state == RegionState::Loading));
        assert_eq!(board.baseline(), &BaselineState::Loading);
    }

    #[test]
    fn current_event_is_applied() {
        let mut board = RegionBoard::new(REGIONS);
        let generation = board.set_app_id(id("1"));
        assert_eq!(
            board.apply(region_event(generation, "1", "us", true)),
            Applied::Accepted
        );
        let us = board
            .entries()
            .iter()
            .find(|entry| entry.region.code == "us")
            .unwrap();
        assert_eq!(
            us.state,
            RegionState::Available {
                price: Some("$1.99".to_owned())
            }
        );
    }

    #[test]
    fn event_from_previous_generation_is_discarded() {
        let mut board = RegionBoard::new(REGIONS);
        let old = board.set_app_id(id("1"));
        let new = board.set_app_id(id("2"));
        assert_ne!(old, new);

        assert_eq!(
            board.apply(region_event(old, "1", "us", true)),
            Applied::Stale
        );
        assert!(board
            .entries()
            .iter()
            .all(|entry| entry.state == RegionState::Loading));
    }

    #[test]
    fn same_app_rechecked_still_discards_old_generation() {
        let mut board = RegionBoard::new(REGIONS);
        let old = board.set_app_id(id("1"));
        board.set_app_id(id("1"));
        assert_eq!(
            board.apply(region_event(old, "1", "fr", false)),
            Applied::Stale
        );
    }

    #[test]
    fn settles_after_every_region_and_baseline() {
        static TWO: [Region; 2] = [
            Region {
                code: "nz",
                name: "New Zealand",
                continent: Continent::Oceania,
            },
            Region {
                code: "fj",
                name: "Fiji",
                continent: Continent::Oceania,
            },
        ];
        let mut board = RegionBoard::new(&TWO);
        let generation = board.set_app_id(id("3"));

        for region in &TWO {
            board.apply(LookupEvent::Region {
                generation,
                app_id: id("3"),
                availability: RegionAvailability::unavailable(region),
            });
        }
        assert!(!board.is_settled(), "baseline still loading");

        board.apply(LookupEvent::Baseline {
            generation,
            app_id: id("3"),
            record: None,
        });
        assert!(board.is_settled());
        assert_eq!(
            board.summary(),
            BoardSummary {
                total: 2,
                settled: 2,
                available: 0
            }
        );
    }

    #[test]
    fn expire_pending_settles_only_loading_entries() {
        let mut board = RegionBoard::new(REGIONS);
        let generation = board.set_app_id(id("4"));
        board.apply(region_event(generation, "4", "jp", true));

        assert_eq!(board.expire_pending(), REGIONS.len() - 1);
        assert!(board.is_settled());
        assert_eq!(board.baseline(), &BaselineState::Missing);
        assert_eq!(board.summary().available, 1, "settled results are kept");
    }

    #[test]
    fn snapshot_groups_by_continent() {
        let mut board = RegionBoard::new(REGIONS);
        let generation = board.set_app_id(id("1"));
        board.apply(region_event(generation, "1", "jp", true));

        let snapshot = board.snapshot();
        assert_eq!(snapshot.summary.total, REGIONS.len());
        assert_eq!(snapshot.summary.available, 1);
        let asia = snapshot
            .continents
            .iter()
            .find(|group| group.continent == Continent::Asia)
            .unwrap();
        assert!(asia.regions.iter().any(|entry| entry.region.code == "jp"
            && matches!(entry.state, RegionState::Available { .. })));
    }
}
