//! Market price model
//!
//! Holds per-city, per-good base and current prices and applies three kinds
//! of movement:
//!
//! - **Drift**: once per game day every price is re-rolled around its
//!   base-adjusted value, nudged by the previous day's transaction feedback.
//! - **Arrival refresh**: traveling re-rolls a single city's prices (prices
//!   you haven't seen in a while are stale).
//! - **Events**: discrete multiplicative shocks on top of current prices.
//!
//! # Critical Invariants
//!
//! 1. All prices are i64 whole currency units, rounded at formula boundaries
//! 2. A current price never falls below half its base-adjusted value
//! 3. `advance_day` is idempotent per day value
//! 4. All randomness flows through the injected [`UniformSource`]

mod event;

pub use event::MarketEvent;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rng::UniformSource;

/// Default initial/daily fluctuation range (±30%).
pub const DEFAULT_FLUCTUATION: f64 = 0.3;

/// Daily transaction count below which a good trades thin (price pressure down).
const THIN_MARKET_THRESHOLD: u32 = 2;

/// Daily transaction count above which a good trades hot (price pressure up).
const HOT_MARKET_THRESHOLD: u32 = 5;

/// Flat feedback applied past either threshold.
///
/// Feedback law: flat ±10% regardless of how far past the threshold the
/// count landed. The magnitude-scaled variant was considered and rejected;
/// see DESIGN.md.
const FEEDBACK_MODIFIER: f64 = 0.1;

/// Errors that can occur during market operations
#[derive(Debug, Error, PartialEq)]
pub enum MarketError {
    #[error("market is not initialized")]
    NotInitialized,

    #[error("unknown city: {0}")]
    UnknownCity(String),

    #[error("unknown good: {0}")]
    UnknownGood(String),
}

/// A tradeable good: name plus fixed reference base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodDef {
    pub name: String,
    /// Reference price in the canonical city (i64 currency units)
    pub base_price: i64,
}

/// A city: name plus multiplicative price modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityDef {
    pub name: String,
    /// Factor applied to base prices (1.0 = canonical city)
    pub modifier: f64,
}

/// Live price table for every city × good pair
///
/// # Example
/// ```
/// use trade_simulator_core_rs::{CityDef, GoodDef, Market, RngManager};
///
/// let goods = vec![GoodDef { name: "Copper".into(), base_price: 100 }];
/// let cities = vec![CityDef { name: "New York".into(), modifier: 1.0 }];
///
/// let mut rng = RngManager::new(42);
/// let mut market = Market::new();
/// market.initialize(&goods, &cities, &mut rng);
///
/// let prices = market.prices("New York").unwrap();
/// assert!(prices["Copper"] >= 70 && prices["Copper"] <= 130);
/// ```
#[derive(Debug, Clone)]
pub struct Market {
    /// Canonical base price per good (immutable after init)
    base_prices: HashMap<String, i64>,
    /// Price modifier per city (immutable after init)
    city_modifiers: HashMap<String, f64>,
    /// Live city -> good -> current price
    current_prices: HashMap<String, HashMap<String, i64>>,
    /// city -> good -> units traded since the last day boundary
    transactions: HashMap<String, HashMap<String, u32>>,
    /// Uniform fluctuation half-range F; draws are U(-F, F)
    fluctuation: f64,
    /// Day the last drift pass ran for (idempotence guard)
    last_update_day: u32,
    initialized: bool,
}

impl Market {
    /// Create an empty, uninitialized market.
    pub fn new() -> Self {
        Self::with_fluctuation(DEFAULT_FLUCTUATION)
    }

    /// Create an uninitialized market with a custom fluctuation range.
    pub fn with_fluctuation(fluctuation: f64) -> Self {
        Self {
            base_prices: HashMap::new(),
            city_modifiers: HashMap::new(),
            current_prices: HashMap::new(),
            transactions: HashMap::new(),
            fluctuation,
            last_update_day: 1,
            initialized: false,
        }
    }

    /// Build the price tables: for every city × good,
    /// `price = round(base × modifier × (1 + U(-F, F)))`.
    pub fn initialize(
        &mut self,
        goods: &[GoodDef],
        cities: &[CityDef],
        rng: &mut dyn UniformSource,
    ) {
        self.base_prices = goods
            .iter()
            .map(|g| (g.name.clone(), g.base_price))
            .collect();
        self.city_modifiers = cities
            .iter()
            .map(|c| (c.name.clone(), c.modifier))
            .collect();

        self.current_prices.clear();
        for city in cities {
            let mut table = HashMap::new();
            for good in goods {
                let fluct = self.draw_fluctuation(rng);
                let price = round_price(good.base_price as f64 * city.modifier * (1.0 + fluct));
                table.insert(good.name.clone(), price);
            }
            self.current_prices.insert(city.name.clone(), table);
        }

        self.transactions.clear();
        self.last_update_day = 1;
        self.initialized = true;
    }

    /// Cloned live price table for a city.
    ///
    /// Always a snapshot, never an alias into internal state.
    pub fn prices(&self, city: &str) -> Result<HashMap<String, i64>, MarketError> {
        self.city_table(city).map(Clone::clone)
    }

    /// Cheapest current price in a city, `None` for an empty catalog.
    pub fn cheapest_price(&self, city: &str) -> Result<Option<i64>, MarketError> {
        Ok(self.city_table(city)?.values().copied().min())
    }

    /// Accumulate `quantity.abs()` units into the city/good daily counter.
    ///
    /// Side effect only; the feedback is applied at the next day boundary.
    pub fn record_transaction(
        &mut self,
        city: &str,
        good: &str,
        quantity: i64,
    ) -> Result<(), MarketError> {
        // Validates the city the same way reads do
        self.city_table(city)?;

        let counter = self
            .transactions
            .entry(city.to_string())
            .or_default()
            .entry(good.to_string())
            .or_insert(0);
        *counter = counter.saturating_add(quantity.unsigned_abs().min(u32::MAX as u64) as u32);
        Ok(())
    }

    /// Daily drift pass. No-op when `current_day` equals the last-updated
    /// day, so repeated calls within one day never double-apply.
    ///
    /// On a genuine day change every price is recomputed as
    /// `round(base × modifier × (1 + U(-F,F) + feedback))` and clamped to the
    /// half-base-adjusted floor, then all transaction counters are cleared.
    pub fn advance_day(
        &mut self,
        current_day: u32,
        rng: &mut dyn UniformSource,
    ) -> Result<(), MarketError> {
        if !self.initialized {
            return Err(MarketError::NotInitialized);
        }
        if current_day == self.last_update_day {
            return Ok(());
        }
        self.last_update_day = current_day;

        for (city, table) in &mut self.current_prices {
            let modifier = self.city_modifiers[city.as_str()];
            for (good, price) in table.iter_mut() {
                let base = self.base_prices[good.as_str()];
                let fluct = (rng.next_f64() * 2.0 - 1.0) * self.fluctuation;
                let feedback = transaction_feedback(
                    self.transactions
                        .get(city.as_str())
                        .and_then(|t| t.get(good.as_str()))
                        .copied()
                        .unwrap_or(0),
                );

                let next = round_price(base as f64 * modifier * (1.0 + fluct + feedback));
                *price = next.max(price_floor(base, modifier));
            }
        }

        self.transactions.clear();
        Ok(())
    }

    /// Re-roll a single city with the initialization formula; other cities
    /// are untouched. Models stale prices re-randomizing on arrival.
    pub fn refresh_city_on_arrival(
        &mut self,
        city: &str,
        rng: &mut dyn UniformSource,
    ) -> Result<(), MarketError> {
        if !self.initialized {
            return Err(MarketError::NotInitialized);
        }
        let modifier = *self
            .city_modifiers
            .get(city)
            .ok_or_else(|| MarketError::UnknownCity(city.to_string()))?;
        let table = self
            .current_prices
            .get_mut(city)
            .ok_or_else(|| MarketError::UnknownCity(city.to_string()))?;

        for (good, price) in table.iter_mut() {
            let base = self.base_prices[good.as_str()];
            let fluct = (rng.next_f64() * 2.0 - 1.0) * self.fluctuation;
            *price = round_price(base as f64 * modifier * (1.0 + fluct));
        }
        Ok(())
    }

    /// Apply a one-time shock to every good in a city.
    ///
    /// The modifier is drawn uniformly from the event's range and compounds
    /// on the current price (not reset to base first). Prices stay clamped
    /// to the half-base-adjusted floor. Returns the applied modifier.
    pub fn trigger_event(
        &mut self,
        city: &str,
        event: MarketEvent,
        rng: &mut dyn UniformSource,
    ) -> Result<f64, MarketError> {
        if !self.initialized {
            return Err(MarketError::NotInitialized);
        }
        let modifier = *self
            .city_modifiers
            .get(city)
            .ok_or_else(|| MarketError::UnknownCity(city.to_string()))?;
        let table = self
            .current_prices
            .get_mut(city)
            .ok_or_else(|| MarketError::UnknownCity(city.to_string()))?;

        let (min, max) = event.modifier_range();
        let applied = min + rng.next_f64() * (max - min);

        for (good, price) in table.iter_mut() {
            let base = self.base_prices[good.as_str()];
            let next = round_price(*price as f64 * (1.0 + applied));
            *price = next.max(price_floor(base, modifier));
        }
        Ok(applied)
    }

    /// Whole-market price snapshot for save/load.
    pub fn snapshot_prices(
        &self,
    ) -> Result<HashMap<String, HashMap<String, i64>>, MarketError> {
        if !self.initialized {
            return Err(MarketError::NotInitialized);
        }
        Ok(self.current_prices.clone())
    }

    /// Replace all current prices verbatim (no replay, no re-randomization).
    ///
    /// Counters reset and the drift guard is pinned to `day`, so a same-day
    /// `advance_day` after restore stays a no-op.
    pub fn restore_prices(
        &mut self,
        prices: HashMap<String, HashMap<String, i64>>,
        day: u32,
    ) -> Result<(), MarketError> {
        if !self.initialized {
            return Err(MarketError::NotInitialized);
        }
        for (city, table) in &prices {
            if !self.city_modifiers.contains_key(city) {
                return Err(MarketError::UnknownCity(city.clone()));
            }
            for good in table.keys() {
                if !self.base_prices.contains_key(good) {
                    return Err(MarketError::UnknownGood(good.clone()));
                }
            }
        }
        self.current_prices = prices;
        self.transactions.clear();
        self.last_update_day = day;
        Ok(())
    }

    /// Daily transaction count recorded so far for a city/good pair.
    pub fn transaction_count(&self, city: &str, good: &str) -> u32 {
        self.transactions
            .get(city)
            .and_then(|t| t.get(good))
            .copied()
            .unwrap_or(0)
    }

    fn city_table(&self, city: &str) -> Result<&HashMap<String, i64>, MarketError> {
        if !self.initialized {
            return Err(MarketError::NotInitialized);
        }
        self.current_prices
            .get(city)
            .ok_or_else(|| MarketError::UnknownCity(city.to_string()))
    }

    fn draw_fluctuation(&self, rng: &mut dyn UniformSource) -> f64 {
        (rng.next_f64() * 2.0 - 1.0) * self.fluctuation
    }
}

impl Default for Market {
    fn default() -> Self {
        Self::new()
    }
}

/// Flat-law transaction feedback for one city/good pair.
fn transaction_feedback(count: u32) -> f64 {
    if count == 0 {
        0.0
    } else if count > HOT_MARKET_THRESHOLD {
        FEEDBACK_MODIFIER
    } else if count < THIN_MARKET_THRESHOLD {
        -FEEDBACK_MODIFIER
    } else {
        0.0
    }
}

/// Lowest admissible price: half the base-adjusted value, rounded.
fn price_floor(base: i64, city_modifier: f64) -> i64 {
    round_price(base as f64 * city_modifier * 0.5)
}

/// Round a computed price to the nearest whole currency unit, never below zero.
fn round_price(value: f64) -> i64 {
    value.round().max(0.0) as i64
}
