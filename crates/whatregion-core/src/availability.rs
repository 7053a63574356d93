use serde::Serialize;

use crate::Region;

/// Whether an app is listed in one storefront, and at what local price.
///
/// "Not listed" and "could not be determined" are the same value: a lookup
/// that failed is reported exactly like an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionAvailability {
    pub region: &'static Region,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

impl RegionAvailability {
    #[must_use]
    pub fn available(region: &'static Region, price: Option<String>) -> Self {
        Self {
            region,
            is_available: true,
            price,
        }
    }

    #[must_use]
    pub fn unavailable(region: &'static Region) -> Self {
        Self {
            region,
            is_available: false,
            price: None,
        }
    }
}

/// Lifecycle of one region's lookup: `idle -> loading -> {available | unavailable}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RegionState {
    Idle,
    Loading,
    Available {
        #[serde(skip_serializing_if = "Option::is_none")]
        price: Option<String>,
    },
    Unavailable,
}

impl RegionState {
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            RegionState::Available { .. } | RegionState::Unavailable
        )
    }
}

impl From<&RegionAvailability> for RegionState {
    fn from(availability: &RegionAvailability) -> Self {
        if availability.is_available {
            RegionState::Available {
                price: availability.price.clone(),
            }
        } else {
            RegionState::Unavailable
        }
    }
}

/// A catalog region paired with its current lookup state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionEntry {
    pub region: &'static Region,
    #[serde(flatten)]
    pub state: RegionState,
}

impl RegionEntry {
    /// The settled result, or `None` while the lookup is idle or in flight.
    #[must_use]
    pub fn availability(&self) -> Option<RegionAvailability> {
        match &self.state {
            RegionState::Available { price } => {
                Some(RegionAvailability::available(self.region, price.clone()))
            }
            RegionState::Unavailable => Some(RegionAvailability::unavailable(self.region)),
            RegionState::Idle | RegionState::Loading => None,
        }
    }
}
