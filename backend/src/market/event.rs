//! Market shock events
//!
//! Each event kind maps to a closed, signed percentage range. The applied
//! modifier is drawn uniformly from that range and compounds on whatever the
//! current price already is.
//!
//! Modeled as a tagged enum rather than string keys so dispatch is
//! exhaustiveness-checked.

use serde::{Deserialize, Serialize};

/// A one-time multiplicative price shock for one city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketEvent {
    /// Authorities seize stock; prices drop 30-50%
    SupplyRaid,
    /// Demand spike; prices rise 30-50%
    HighDemand,
    /// Goods stop arriving; prices rise 40-60%
    SupplyShortage,
    /// A new supplier floods the market; prices drop 20-40%
    NewSupplier,
}

impl MarketEvent {
    /// All event kinds, for uniform selection.
    pub const ALL: [MarketEvent; 4] = [
        MarketEvent::SupplyRaid,
        MarketEvent::HighDemand,
        MarketEvent::SupplyShortage,
        MarketEvent::NewSupplier,
    ];

    /// Closed signed modifier range `(min, max)` for this event kind.
    pub fn modifier_range(self) -> (f64, f64) {
        match self {
            MarketEvent::SupplyRaid => (-0.5, -0.3),
            MarketEvent::HighDemand => (0.3, 0.5),
            MarketEvent::SupplyShortage => (0.4, 0.6),
            MarketEvent::NewSupplier => (-0.4, -0.2),
        }
    }

    /// Short display label for the presentation layer.
    pub fn label(self) -> &'static str {
        match self {
            MarketEvent::SupplyRaid => "SUPPLY RAID",
            MarketEvent::HighDemand => "HIGH DEMAND",
            MarketEvent::SupplyShortage => "SUPPLY SHORTAGE",
            MarketEvent::NewSupplier => "NEW SUPPLIER",
        }
    }
}
