//! Trade Simulator Core - Rust Engine
//!
//! Economic simulation core for a single-player buy-low/sell-high trading
//! game with lenders breathing down your neck. Presentation (menus, scenes,
//! save slots) lives elsewhere and calls into this crate.
//!
//! # Architecture
//!
//! - **core**: Game clock (day/hour, real-time and explicit advancement)
//! - **rng**: Deterministic random number generation behind an injectable seam
//! - **market**: Per-city prices, daily drift, demand feedback, shock events
//! - **ledger**: Lender catalog, debts, compounding interest, consequences
//! - **session**: Orchestration - buy, sell, travel, sleep, borrow, repay,
//!   game-over evaluation, save/load snapshot
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 whole currency units
//! 2. All randomness is deterministic (seeded RNG through [`UniformSource`])
//! 3. Single-threaded: every operation is synchronous and runs to completion
//! 4. The core never hands out mutable aliases of its state; operations
//!    return owned receipts and reports

pub mod core;
pub mod ledger;
pub mod market;
pub mod rng;
pub mod session;

// Re-exports for convenience
pub use crate::core::time::GameClock;
pub use ledger::{
    Consequence, Debt, Ledger, LedgerError, Lender, LoanTerms, OverdueNotice,
};
pub use market::{CityDef, GoodDef, Market, MarketError, MarketEvent};
pub use rng::{RngManager, UniformSource};
pub use session::{
    DayReport, GameOver, GameOverReason, GameSnapshot, GameStats, GameTime, LoanReceipt, Session,
    SessionConfig, SessionError, SleepReport, StartingDebt, TradeLine, TradeReceipt,
    TriggeredEvent,
};
