//! Checkpoint - save/load game state
//!
//! Serializes the session to the fixed external save shape and restores it
//! verbatim. Restoring replaces market prices, debts, clock and player state
//! wholesale; nothing is replayed or re-randomized.
//!
//! # Critical Invariants
//!
//! - Round trip is bit-exact for every integer field
//! - Field names are camelCase: the JSON blob is an external contract
//! - `lastSaved` is wall-clock epoch ms supplied by the caller at export

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ledger::Debt;
use crate::market::MarketError;
use crate::session::engine::{Session, SessionError};

/// Clock position inside the save blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTime {
    pub day: u32,
    pub hour: u32,
}

/// Complete persisted game state
///
/// This is the shape the save layer writes and reads:
///
/// ```json
/// {
///   "playerMoney": 1000,
///   "inventory": { "Copper": 2 },
///   "currentLocation": "New York",
///   "debts": [ { "id": "…", "amount": 5000, "interest": 0.1,
///                "dueDate": 432000000, "lender": "Easy Eddie",
///                "isPaid": false } ],
///   "lastSaved": 1735689600000,
///   "currentPrices": { "New York": { "Copper": 104 } },
///   "gameTime": { "day": 1, "hour": 0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub player_money: i64,
    pub inventory: HashMap<String, u32>,
    pub current_location: String,
    pub debts: Vec<Debt>,
    /// Wall-clock epoch ms at save time
    pub last_saved: i64,
    pub current_prices: HashMap<String, HashMap<String, i64>>,
    pub game_time: GameTime,
}

impl GameSnapshot {
    /// Encode as the JSON save blob.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode from the JSON save blob.
    pub fn from_json(data: &str) -> serde_json::Result<GameSnapshot> {
        serde_json::from_str(data)
    }
}

impl Session {
    /// Export the complete session state.
    ///
    /// `saved_at_ms` is the wall-clock timestamp the save layer stamps the
    /// slot with; it does not affect simulation state.
    pub fn export_snapshot(&self, saved_at_ms: i64) -> Result<GameSnapshot, SessionError> {
        Ok(GameSnapshot {
            player_money: self.money(),
            inventory: self.inventory().clone(),
            current_location: self.current_city().to_string(),
            debts: self.debts().to_vec(),
            last_saved: saved_at_ms,
            current_prices: self.market().snapshot_prices()?,
            game_time: GameTime {
                day: self.clock().day(),
                hour: self.clock().hour(),
            },
        })
    }

    /// Replace session state with a snapshot's, wholesale.
    ///
    /// The session must have been created with the same catalog config the
    /// snapshot was saved under; cities in the snapshot are validated
    /// against it. Running counters restart fresh (they are not persisted).
    pub fn restore_snapshot(&mut self, snapshot: GameSnapshot) -> Result<(), SessionError> {
        if !snapshot
            .current_prices
            .contains_key(&snapshot.current_location)
        {
            return Err(SessionError::Market(MarketError::UnknownCity(
                snapshot.current_location,
            )));
        }

        self.market_mut()
            .restore_prices(snapshot.current_prices, snapshot.game_time.day)?;
        self.ledger_mut().restore_debts(snapshot.debts);
        self.clock_mut()
            .set_absolute(snapshot.game_time.day, snapshot.game_time.hour);
        self.restore_player(
            snapshot.player_money,
            snapshot.inventory,
            snapshot.current_location,
        );
        Ok(())
    }
}
