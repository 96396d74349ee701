//! Tests for the Market price model
//!
//! Scripted random sources pin the fluctuation draws where exact prices
//! matter; proptest covers the price-floor law across arbitrary seeds.

use std::collections::HashMap;

use proptest::prelude::*;

use trade_simulator_core_rs::{
    CityDef, GoodDef, Market, MarketError, MarketEvent, RngManager, UniformSource,
};

/// Replays a fixed sequence of draws, repeating the last one forever.
struct Scripted {
    values: Vec<f64>,
    index: usize,
}

impl Scripted {
    fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty());
        Self { values, index: 0 }
    }

    /// Every draw is 0.5, which maps to a fluctuation of exactly zero.
    fn centered() -> Self {
        Self::new(vec![0.5])
    }
}

impl UniformSource for Scripted {
    fn next_f64(&mut self) -> f64 {
        let value = self.values[self.index.min(self.values.len() - 1)];
        self.index += 1;
        value
    }
}

fn goods() -> Vec<GoodDef> {
    vec![
        GoodDef {
            name: "Copper".to_string(),
            base_price: 100,
        },
        GoodDef {
            name: "Gold".to_string(),
            base_price: 1_000,
        },
    ]
}

fn cities() -> Vec<CityDef> {
    vec![
        CityDef {
            name: "New York".to_string(),
            modifier: 1.0,
        },
        CityDef {
            name: "Los Angeles".to_string(),
            modifier: 1.2,
        },
    ]
}

fn centered_market() -> Market {
    let mut market = Market::new();
    market.initialize(&goods(), &cities(), &mut Scripted::centered());
    market
}

#[test]
fn test_initial_prices_within_fluctuation_band() {
    let mut rng = RngManager::new(42);
    let mut market = Market::new();
    market.initialize(&goods(), &cities(), &mut rng);

    for city in cities() {
        let prices = market.prices(&city.name).unwrap();
        for good in goods() {
            let adjusted = good.base_price as f64 * city.modifier;
            let price = prices[&good.name] as f64;
            assert!(
                price >= (adjusted * 0.7).floor() && price <= (adjusted * 1.3).ceil(),
                "{}/{} initialized at {} outside ±30% of {}",
                city.name,
                good.name,
                price,
                adjusted
            );
        }
    }
}

#[test]
fn test_centered_draws_give_base_adjusted_prices() {
    let market = centered_market();

    let ny = market.prices("New York").unwrap();
    assert_eq!(ny["Copper"], 100);
    assert_eq!(ny["Gold"], 1_000);

    let la = market.prices("Los Angeles").unwrap();
    assert_eq!(la["Copper"], 120);
    assert_eq!(la["Gold"], 1_200);
}

#[test]
fn test_unknown_city_rejected() {
    let market = centered_market();
    assert_eq!(
        market.prices("Atlantis").unwrap_err(),
        MarketError::UnknownCity("Atlantis".to_string())
    );
}

#[test]
fn test_uninitialized_operations_fail() {
    let mut market = Market::new();
    let mut rng = RngManager::new(1);

    assert_eq!(
        market.prices("New York").unwrap_err(),
        MarketError::NotInitialized
    );
    assert_eq!(
        market.advance_day(2, &mut rng).unwrap_err(),
        MarketError::NotInitialized
    );
    assert_eq!(
        market
            .trigger_event("New York", MarketEvent::HighDemand, &mut rng)
            .unwrap_err(),
        MarketError::NotInitialized
    );
}

#[test]
fn test_record_transaction_accumulates_absolute() {
    let mut market = centered_market();

    market.record_transaction("New York", "Copper", 3).unwrap();
    market.record_transaction("New York", "Copper", -2).unwrap();
    assert_eq!(market.transaction_count("New York", "Copper"), 5);
    assert_eq!(market.transaction_count("Los Angeles", "Copper"), 0);
}

#[test]
fn test_advance_day_is_idempotent_per_day() {
    let mut market = centered_market();
    let mut rng = RngManager::new(9);

    market.advance_day(2, &mut rng).unwrap();
    let after_first = market.prices("New York").unwrap();

    market.advance_day(2, &mut rng).unwrap();
    market.advance_day(2, &mut rng).unwrap();
    assert_eq!(market.prices("New York").unwrap(), after_first);
}

#[test]
fn test_hot_market_feedback_raises_price() {
    let mut market = centered_market();

    // 6 units traded: above the hot threshold of 5
    market.record_transaction("New York", "Copper", 6).unwrap();
    market.advance_day(2, &mut Scripted::centered()).unwrap();

    let ny = market.prices("New York").unwrap();
    assert_eq!(ny["Copper"], 110); // 100 × (1 + 0 + 0.1)
    assert_eq!(ny["Gold"], 1_000); // untraded good unaffected
}

#[test]
fn test_thin_market_feedback_lowers_price() {
    let mut market = centered_market();

    // 1 unit traded: below the thin threshold of 2
    market.record_transaction("New York", "Copper", 1).unwrap();
    market.advance_day(2, &mut Scripted::centered()).unwrap();

    assert_eq!(market.prices("New York").unwrap()["Copper"], 90);
}

#[test]
fn test_counters_cleared_after_drift() {
    let mut market = centered_market();

    market.record_transaction("New York", "Copper", 6).unwrap();
    market.advance_day(2, &mut Scripted::centered()).unwrap();
    assert_eq!(market.transaction_count("New York", "Copper"), 0);

    // Next day carries no feedback from the cleared counters
    market.advance_day(3, &mut Scripted::centered()).unwrap();
    assert_eq!(market.prices("New York").unwrap()["Copper"], 100);
}

#[test]
fn test_drift_clamped_to_half_base_adjusted_floor() {
    // Wide fluctuation so a bottom draw lands below the floor
    let mut market = Market::with_fluctuation(0.6);
    market.initialize(&goods(), &cities(), &mut Scripted::centered());
    market.record_transaction("New York", "Copper", 1).unwrap();

    // Draw 0.0 maps to the full -60% fluctuation; with -10% thin-market
    // feedback the raw price would be 30
    market.advance_day(2, &mut Scripted::new(vec![0.0])).unwrap();

    let ny = market.prices("New York").unwrap();
    assert_eq!(ny["Copper"], 50);
    let la = market.prices("Los Angeles").unwrap();
    assert_eq!(la["Copper"], 60); // floor uses the city-adjusted base
}

#[test]
fn test_event_applies_drawn_modifier_once() {
    let mut market = centered_market();

    // Draw 1.0-epsilon lands at the top of HighDemand's 0.3..0.5 range;
    // draw 0.0 lands at the bottom
    let applied = market
        .trigger_event("New York", MarketEvent::HighDemand, &mut Scripted::new(vec![0.0]))
        .unwrap();
    assert!((applied - 0.3).abs() < 1e-9);

    let ny = market.prices("New York").unwrap();
    assert_eq!(ny["Copper"], 130);
    assert_eq!(ny["Gold"], 1_300);

    // Other cities untouched
    assert_eq!(market.prices("Los Angeles").unwrap()["Copper"], 120);
}

#[test]
fn test_event_compounds_on_current_price() {
    let mut market = centered_market();

    market
        .trigger_event("New York", MarketEvent::HighDemand, &mut Scripted::new(vec![0.0]))
        .unwrap();
    market
        .trigger_event("New York", MarketEvent::HighDemand, &mut Scripted::new(vec![0.0]))
        .unwrap();

    // 100 → 130 → 169, not 130 twice
    assert_eq!(market.prices("New York").unwrap()["Copper"], 169);
}

#[test]
fn test_event_respects_price_floor() {
    let mut market = centered_market();
    let raid = MarketEvent::SupplyRaid;

    // Bottom draw: -50% each time. First raid hits the floor exactly,
    // the second cannot push below it.
    market
        .trigger_event("New York", raid, &mut Scripted::new(vec![0.0]))
        .unwrap();
    assert_eq!(market.prices("New York").unwrap()["Copper"], 50);

    market
        .trigger_event("New York", raid, &mut Scripted::new(vec![0.0]))
        .unwrap();
    assert_eq!(market.prices("New York").unwrap()["Copper"], 50);
}

#[test]
fn test_arrival_refresh_touches_one_city_only() {
    let mut market = centered_market();
    let la_before = market.prices("Los Angeles").unwrap();

    market
        .refresh_city_on_arrival("New York", &mut Scripted::new(vec![0.0]))
        .unwrap();

    // New York re-rolled at the bottom of the band
    assert_eq!(market.prices("New York").unwrap()["Copper"], 70);
    // Los Angeles untouched
    assert_eq!(market.prices("Los Angeles").unwrap(), la_before);
}

#[test]
fn test_snapshot_restore_is_verbatim() {
    let mut rng = RngManager::new(123);
    let mut market = Market::new();
    market.initialize(&goods(), &cities(), &mut rng);

    let snapshot = market.snapshot_prices().unwrap();

    // Mutate heavily, then restore
    market.advance_day(2, &mut rng).unwrap();
    market
        .trigger_event("New York", MarketEvent::SupplyShortage, &mut rng)
        .unwrap();
    market.restore_prices(snapshot.clone(), 2).unwrap();

    assert_eq!(market.snapshot_prices().unwrap(), snapshot);

    // Restore pins the drift guard: same-day advance stays a no-op
    market.advance_day(2, &mut rng).unwrap();
    assert_eq!(market.snapshot_prices().unwrap(), snapshot);
}

#[test]
fn test_restore_rejects_unknown_city() {
    let mut market = centered_market();

    let mut bogus = HashMap::new();
    bogus.insert("Atlantis".to_string(), HashMap::new());

    assert_eq!(
        market.restore_prices(bogus, 1).unwrap_err(),
        MarketError::UnknownCity("Atlantis".to_string())
    );
}

#[test]
fn test_restore_rejects_unknown_good() {
    let mut market = centered_market();

    let mut tampered = market.snapshot_prices().unwrap();
    tampered
        .get_mut("New York")
        .unwrap()
        .insert("Spice".to_string(), 123);

    assert_eq!(
        market.restore_prices(tampered, 1).unwrap_err(),
        MarketError::UnknownGood("Spice".to_string())
    );

    // The failed restore leaves the market usable
    market.advance_day(2, &mut Scripted::centered()).unwrap();
    assert_eq!(market.prices("New York").unwrap()["Copper"], 100);
}

proptest! {
    /// After any drift pass, every price sits at or above half its
    /// base-adjusted value, regardless of draws and traded volume.
    #[test]
    fn prop_price_floor_holds_after_drift(seed in any::<u64>(), traded in 0i64..40) {
        let mut rng = RngManager::new(seed);
        let mut market = Market::with_fluctuation(0.9);
        market.initialize(&goods(), &cities(), &mut rng);

        market.record_transaction("New York", "Copper", traded).unwrap();
        market.advance_day(2, &mut rng).unwrap();

        for city in cities() {
            let prices = market.prices(&city.name).unwrap();
            for good in goods() {
                let floor = (good.base_price as f64 * city.modifier * 0.5).round() as i64;
                prop_assert!(
                    prices[&good.name] >= floor,
                    "{}/{} at {} below floor {}",
                    city.name, good.name, prices[&good.name], floor
                );
            }
        }
    }

    /// Event shocks keep prices at or above the floor and never negative.
    #[test]
    fn prop_price_floor_holds_after_event(seed in any::<u64>(), kind in 0usize..4) {
        let mut rng = RngManager::new(seed);
        let mut market = Market::new();
        market.initialize(&goods(), &cities(), &mut rng);

        market.trigger_event("New York", MarketEvent::ALL[kind], &mut rng).unwrap();

        let prices = market.prices("New York").unwrap();
        for good in goods() {
            let floor = (good.base_price as f64 * 0.5).round() as i64;
            prop_assert!(prices[&good.name] >= floor);
        }
    }
}
