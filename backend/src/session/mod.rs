//! Session - game orchestration
//!
//! Drives the market, ledger and clock against the player's money,
//! inventory and location. See `engine.rs` for the operations the
//! presentation layer calls and `checkpoint.rs` for the save/load shape.

pub mod checkpoint;
pub mod engine;

pub use checkpoint::{GameSnapshot, GameTime};
pub use engine::{
    DayReport, GameOver, GameOverReason, GameStats, LoanReceipt, Session, SessionConfig,
    SessionError, SleepReport, StartingDebt, TradeLine, TradeReceipt, TriggeredEvent,
};
