//! Session engine
//!
//! The single entry point presentation code talks to. Owns the market, the
//! debt ledger, the clock and the RNG, and exposes the player-facing
//! operations: buy, sell, travel, sleep, borrow, repay, plus game-over
//! evaluation.
//!
//! Every operation runs to completion on the caller's thread and returns an
//! owned receipt/report describing what changed; internal state is never
//! handed out by mutable alias.
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 whole currency units
//! 2. Player money may go negative only transiently, between an operation
//!    and the next `evaluate_game_over` call
//! 3. Inventory entries are removed the moment a quantity reaches zero

use std::collections::HashMap;

use thiserror::Error;

use crate::core::time::GameClock;
use crate::ledger::{Debt, Ledger, LedgerError, Lender, LoanTerms, OverdueNotice};
use crate::market::{CityDef, GoodDef, Market, MarketError, MarketEvent};
use crate::rng::{RngManager, UniformSource};

/// Errors that can occur during session operations
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("insufficient stock of {good}: requested {requested}, available {available}")]
    InsufficientStock {
        good: String,
        requested: u32,
        available: u32,
    },

    #[error("no positive quantities selected")]
    EmptySelection,

    #[error("unknown good: {0}")]
    UnknownGood(String),

    #[error(transparent)]
    Market(#[from] MarketError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A debt the player starts the game already owing.
#[derive(Debug, Clone, PartialEq)]
pub struct StartingDebt {
    pub lender: String,
    pub amount: i64,
}

/// Complete session configuration
///
/// Everything needed to start a new game: the catalog, the starting
/// position, and the tunables for events and game over.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Opening player money (currency units)
    pub starting_money: i64,

    /// City the player starts in (must appear in `cities`)
    pub starting_city: String,

    /// Tradeable goods with their canonical base prices
    pub goods: Vec<GoodDef>,

    /// Cities with their price modifiers
    pub cities: Vec<CityDef>,

    /// Debt the player opens with (quoted at the lender's own terms)
    pub starting_debt: Option<StartingDebt>,

    /// RNG seed for deterministic runs
    pub rng_seed: u64,

    /// Chance of a market event firing on each sleep.
    ///
    /// Event cadence: events roll only here, once per sleep (default 30%).
    /// The periodic-tick cadence variant was rejected; see DESIGN.md.
    pub event_chance: f64,

    /// Consecutive no-deal days before suppliers abandon the player
    pub max_idle_days: u32,

    /// Real milliseconds per game hour for wall-clock advancement
    pub ms_per_game_hour: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_money: 1_000,
            starting_city: "New York".to_string(),
            goods: vec![
                GoodDef {
                    name: "Copper".to_string(),
                    base_price: 100,
                },
                GoodDef {
                    name: "Iron".to_string(),
                    base_price: 200,
                },
                GoodDef {
                    name: "Silver".to_string(),
                    base_price: 500,
                },
                GoodDef {
                    name: "Gold".to_string(),
                    base_price: 1_000,
                },
            ],
            cities: vec![
                CityDef {
                    name: "New York".to_string(),
                    modifier: 1.0,
                },
                CityDef {
                    name: "Los Angeles".to_string(),
                    modifier: 1.2,
                },
                CityDef {
                    name: "Chicago".to_string(),
                    modifier: 0.9,
                },
            ],
            starting_debt: Some(StartingDebt {
                lender: "Easy Eddie".to_string(),
                amount: 5_000,
            }),
            rng_seed: 0,
            event_chance: 0.3,
            max_idle_days: 5,
            ms_per_game_hour: crate::core::time::DEFAULT_MS_PER_GAME_HOUR,
        }
    }
}

/// One good's share of a completed trade.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeLine {
    pub good: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub subtotal: i64,
}

/// Result of a completed buy or sell.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeReceipt {
    /// Total money moved (debited on buy, credited on sell)
    pub total: i64,
    /// Per-good breakdown, sorted by good name
    pub lines: Vec<TradeLine>,
}

/// A market event that fired during sleep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggeredEvent {
    pub kind: MarketEvent,
    /// Signed modifier actually applied to the city's prices
    pub modifier: f64,
}

/// What happened while the player slept.
#[derive(Debug, Clone, PartialEq)]
pub struct SleepReport {
    /// Day the clock woke up on
    pub day: u32,
    /// Market event triggered in the current city, if any
    pub event: Option<TriggeredEvent>,
    /// Overdue-debt notices for the presentation layer to surface
    pub overdue: Vec<OverdueNotice>,
}

/// What happened when wall-clock time rolled the game day over.
#[derive(Debug, Clone, PartialEq)]
pub struct DayReport {
    pub day: u32,
    pub hours_advanced: u32,
    pub overdue: Vec<OverdueNotice>,
}

/// Result of a successful loan.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanReceipt {
    pub debt_id: String,
    pub amount: i64,
    pub terms: LoanTerms,
}

/// Terminal reason reported by [`Session::evaluate_game_over`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    /// Money ran out
    Bankrupt,
    /// No stock and not enough money for the cheapest good here
    CannotTrade,
    /// Too many consecutive days without a deal
    AbandonedBySuppliers,
}

impl GameOverReason {
    /// Display label for the presentation layer.
    pub fn label(self) -> &'static str {
        match self {
            GameOverReason::Bankrupt => "YOU ARE BANKRUPT!",
            GameOverReason::CannotTrade => "NO MONEY TO BUY AND NO STOCK!",
            GameOverReason::AbandonedBySuppliers => {
                "IDLE TOO LONG! YOUR SUPPLIERS ABANDONED YOU!"
            }
        }
    }
}

/// End-of-run statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStats {
    pub days_survived: u32,
    pub max_money: i64,
    pub total_deals: u32,
}

/// A finished game: why it ended and how it went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOver {
    pub reason: GameOverReason,
    pub stats: GameStats,
}

/// Game session: player state plus the simulation components
///
/// # Example
/// ```
/// use trade_simulator_core_rs::{Session, SessionConfig};
///
/// let mut session = Session::new(SessionConfig::default()).unwrap();
/// assert_eq!(session.money(), 1000);
/// assert_eq!(session.current_city(), "New York");
///
/// let report = session.sleep().unwrap();
/// assert_eq!(report.day, 2);
/// ```
pub struct Session {
    money: i64,
    /// Good -> quantity held; entries removed at zero
    inventory: HashMap<String, u32>,
    current_city: String,

    market: Market,
    ledger: Ledger,
    clock: GameClock,
    rng: Box<dyn UniformSource>,

    /// Highest money ever observed (stats)
    max_money: i64,
    /// Completed buy/sell operations (stats)
    total_deals: u32,
    /// Consecutive slept days without a completed deal
    days_without_deal: u32,

    event_chance: f64,
    max_idle_days: u32,
}

impl Session {
    /// Start a new game with a seeded deterministic RNG.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let rng = Box::new(RngManager::new(config.rng_seed));
        Self::with_rng(config, rng)
    }

    /// Start a new game with an injected random source (tests).
    pub fn with_rng(
        config: SessionConfig,
        mut rng: Box<dyn UniformSource>,
    ) -> Result<Self, SessionError> {
        let mut market = Market::new();
        market.initialize(&config.goods, &config.cities, &mut *rng);
        // Starting city must be in the catalog
        market.prices(&config.starting_city)?;

        let clock = GameClock::with_ratio(config.ms_per_game_hour);

        let mut ledger = Ledger::new();
        if let Some(debt) = &config.starting_debt {
            let terms = ledger.quote_loan(&debt.lender, debt.amount, clock.game_time_ms())?;
            ledger.issue_loan(&terms, debt.amount);
        }

        Ok(Self {
            money: config.starting_money,
            inventory: HashMap::new(),
            current_city: config.starting_city,
            market,
            ledger,
            clock,
            rng,
            max_money: config.starting_money,
            total_deals: 0,
            days_without_deal: 0,
            event_chance: config.event_chance,
            max_idle_days: config.max_idle_days,
        })
    }

    // ------------------------------------------------------------------
    // Trading
    // ------------------------------------------------------------------

    /// Buy goods at a city's live prices.
    ///
    /// `selections` maps good name to wanted quantity; zero quantities are
    /// ignored. Debits money, credits inventory, records one transaction
    /// per good with the market, and resets the idle-days counter.
    pub fn buy(
        &mut self,
        city: &str,
        selections: &HashMap<String, u32>,
    ) -> Result<TradeReceipt, SessionError> {
        let (total, lines) = self.price_selection(city, selections)?;

        if total > self.money {
            return Err(SessionError::InsufficientFunds {
                required: total,
                available: self.money,
            });
        }

        self.money -= total;
        for line in &lines {
            *self.inventory.entry(line.good.clone()).or_insert(0) += line.quantity;
            self.market
                .record_transaction(city, &line.good, line.quantity as i64)?;
        }
        self.complete_deal();

        Ok(TradeReceipt { total, lines })
    }

    /// Sell goods from inventory at a city's live prices.
    ///
    /// Each quantity must be covered by current stock. Credits money and
    /// removes inventory entries that reach zero.
    pub fn sell(
        &mut self,
        city: &str,
        selections: &HashMap<String, u32>,
    ) -> Result<TradeReceipt, SessionError> {
        let (total, lines) = self.price_selection(city, selections)?;

        for line in &lines {
            let available = self.inventory.get(&line.good).copied().unwrap_or(0);
            if line.quantity > available {
                return Err(SessionError::InsufficientStock {
                    good: line.good.clone(),
                    requested: line.quantity,
                    available,
                });
            }
        }

        self.money += total;
        for line in &lines {
            if let Some(held) = self.inventory.get_mut(&line.good) {
                *held -= line.quantity;
                if *held == 0 {
                    self.inventory.remove(&line.good);
                }
            }
            self.market
                .record_transaction(city, &line.good, line.quantity as i64)?;
        }
        self.complete_deal();

        Ok(TradeReceipt { total, lines })
    }

    /// Move to another city, paying the fare.
    ///
    /// Prices in the destination re-roll on arrival; other cities are
    /// untouched.
    pub fn travel(&mut self, destination: &str, cost: i64) -> Result<(), SessionError> {
        if cost > self.money {
            return Err(SessionError::InsufficientFunds {
                required: cost,
                available: self.money,
            });
        }
        self.market
            .refresh_city_on_arrival(destination, &mut *self.rng)?;
        self.money -= cost;
        self.current_city = destination.to_string();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    /// Sleep through to the next day.
    ///
    /// Advances the clock one day, counts an idle day, applies the market's
    /// daily drift, rolls a market event for the current city with
    /// `event_chance`, and sweeps the ledger for overdue debts.
    pub fn sleep(&mut self) -> Result<SleepReport, SessionError> {
        self.clock.advance_one_day();
        self.days_without_deal += 1;

        self.market.advance_day(self.clock.day(), &mut *self.rng)?;

        let event = if self.rng.next_f64() < self.event_chance {
            let all = MarketEvent::ALL;
            let index = ((self.rng.next_f64() * all.len() as f64) as usize).min(all.len() - 1);
            let kind = all[index];
            let modifier = self
                .market
                .trigger_event(&self.current_city, kind, &mut *self.rng)?;
            Some(TriggeredEvent { kind, modifier })
        } else {
            None
        };

        let overdue = self.ledger.tick(self.clock.game_time_ms());

        Ok(SleepReport {
            day: self.clock.day(),
            event,
            overdue,
        })
    }

    /// Advance the clock from wall-clock time.
    ///
    /// Returns a report when the game day rolled over (drift applied and
    /// overdue debts swept), `None` otherwise. Market events never fire on
    /// this path; they are sleep-cadence only.
    pub fn advance_real_time(&mut self, now_ms: i64) -> Result<Option<DayReport>, SessionError> {
        let day_before = self.clock.day();
        let hours = self.clock.advance_by_elapsed(now_ms);
        let day = self.clock.day();
        if day == day_before {
            return Ok(None);
        }

        self.market.advance_day(day, &mut *self.rng)?;
        let overdue = self.ledger.tick(self.clock.game_time_ms());

        Ok(Some(DayReport {
            day,
            hours_advanced: hours,
            overdue,
        }))
    }

    // ------------------------------------------------------------------
    // Debt
    // ------------------------------------------------------------------

    /// Quote terms for a loan without committing to it.
    pub fn quote_loan(&self, lender: &str, amount: i64) -> Result<LoanTerms, SessionError> {
        Ok(self
            .ledger
            .quote_loan(lender, amount, self.clock.game_time_ms())?)
    }

    /// Take a loan: quote, record the debt, credit the money.
    pub fn borrow(&mut self, lender: &str, amount: i64) -> Result<LoanReceipt, SessionError> {
        let terms = self
            .ledger
            .quote_loan(lender, amount, self.clock.game_time_ms())?;
        let debt_id = self.ledger.issue_loan(&terms, amount);
        self.money += amount;
        self.track_max_money();
        Ok(LoanReceipt {
            debt_id,
            amount,
            terms,
        })
    }

    /// Pay toward a debt, capped by current money.
    ///
    /// Returns how much was actually paid and debited; 0 for an unknown id.
    pub fn repay(&mut self, debt_id: &str, amount: i64) -> i64 {
        let available = amount.min(self.money).max(0);
        let paid = self
            .ledger
            .pay_debt(debt_id, available, self.clock.game_time_ms());
        self.money -= paid;
        paid
    }

    /// Total currently owed on a debt, `None` for an unknown id.
    pub fn amount_due(&self, debt_id: &str) -> Option<i64> {
        let debt = self.ledger.find_debt(debt_id)?;
        Some(self.ledger.amount_due(debt, self.clock.game_time_ms()))
    }

    /// The fixed lender catalog.
    pub fn lenders(&self) -> &[Lender] {
        self.ledger.lenders()
    }

    /// All debts, settled ones included.
    pub fn debts(&self) -> &[Debt] {
        self.ledger.debts()
    }

    // ------------------------------------------------------------------
    // Game over
    // ------------------------------------------------------------------

    /// Check the terminal conditions, in order. Only the first condition
    /// that holds is reported.
    pub fn evaluate_game_over(&self) -> Result<Option<GameOver>, SessionError> {
        if self.money <= 0 {
            return Ok(Some(self.game_over(GameOverReason::Bankrupt)));
        }

        if self.inventory.is_empty() {
            if let Some(cheapest) = self.market.cheapest_price(&self.current_city)? {
                if self.money < cheapest {
                    return Ok(Some(self.game_over(GameOverReason::CannotTrade)));
                }
            }
        }

        if self.days_without_deal >= self.max_idle_days {
            return Ok(Some(self.game_over(GameOverReason::AbandonedBySuppliers)));
        }

        Ok(None)
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    /// Current player money.
    pub fn money(&self) -> i64 {
        self.money
    }

    /// Current inventory, good -> quantity.
    pub fn inventory(&self) -> &HashMap<String, u32> {
        &self.inventory
    }

    /// City the player is in.
    pub fn current_city(&self) -> &str {
        &self.current_city
    }

    /// Live prices for a city (cloned snapshot).
    pub fn prices(&self, city: &str) -> Result<HashMap<String, i64>, SessionError> {
        Ok(self.market.prices(city)?)
    }

    /// HUD time string, e.g. `"Day 3 - 04:00"`.
    pub fn time_string(&self) -> String {
        self.clock.time_string()
    }

    /// The game clock.
    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// Consecutive slept days without a completed deal.
    pub fn days_without_deal(&self) -> u32 {
        self.days_without_deal
    }

    /// Completed deals so far.
    pub fn total_deals(&self) -> u32 {
        self.total_deals
    }

    /// Highest money observed this run.
    pub fn max_money(&self) -> i64 {
        self.max_money
    }

    // ------------------------------------------------------------------
    // Internals (shared with checkpoint.rs)
    // ------------------------------------------------------------------

    /// Price a selection against a city's live table.
    ///
    /// Filters zero quantities, rejects unknown goods and empty selections,
    /// returns the total and per-good lines sorted by name.
    fn price_selection(
        &self,
        city: &str,
        selections: &HashMap<String, u32>,
    ) -> Result<(i64, Vec<TradeLine>), SessionError> {
        let prices = self.market.prices(city)?;

        let mut wanted: Vec<(&String, u32)> = selections
            .iter()
            .filter(|(_, &quantity)| quantity > 0)
            .map(|(good, &quantity)| (good, quantity))
            .collect();
        wanted.sort_by(|a, b| a.0.cmp(b.0));

        if wanted.is_empty() {
            return Err(SessionError::EmptySelection);
        }

        let mut total = 0i64;
        let mut lines = Vec::with_capacity(wanted.len());
        for (good, quantity) in wanted {
            let unit_price = *prices
                .get(good)
                .ok_or_else(|| SessionError::UnknownGood(good.clone()))?;
            let subtotal = unit_price * quantity as i64;
            total += subtotal;
            lines.push(TradeLine {
                good: good.clone(),
                quantity,
                unit_price,
                subtotal,
            });
        }

        Ok((total, lines))
    }

    fn complete_deal(&mut self) {
        self.total_deals += 1;
        self.days_without_deal = 0;
        self.track_max_money();
    }

    fn track_max_money(&mut self) {
        if self.money > self.max_money {
            self.max_money = self.money;
        }
    }

    fn game_over(&self, reason: GameOverReason) -> GameOver {
        GameOver {
            reason,
            stats: GameStats {
                days_survived: self.clock.day(),
                max_money: self.max_money,
                total_deals: self.total_deals,
            },
        }
    }

    pub(crate) fn market(&self) -> &Market {
        &self.market
    }

    pub(crate) fn market_mut(&mut self) -> &mut Market {
        &mut self.market
    }

    pub(crate) fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub(crate) fn clock_mut(&mut self) -> &mut GameClock {
        &mut self.clock
    }

    pub(crate) fn restore_player(
        &mut self,
        money: i64,
        inventory: HashMap<String, u32>,
        current_city: String,
    ) {
        self.money = money;
        self.inventory = inventory;
        self.current_city = current_city;
        // Running counters are not part of the persisted shape; a restored
        // run starts them fresh.
        self.max_money = money;
        self.total_deals = 0;
        self.days_without_deal = 0;
    }
}
