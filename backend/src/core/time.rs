//! Time management for the simulation
//!
//! The game runs on a day/hour clock. It can advance two ways: from real
//! elapsed wall-clock time (at a configurable real-to-game ratio) or by an
//! explicit whole-day step (the sleep action).
//!
//! The clock also defines the game-time axis used by the debt ledger: a
//! millisecond position where day 1, hour 0 is zero and one game hour spans
//! [`MS_PER_HOUR`]. All interest and due-date arithmetic lives on that axis,
//! never on the host clock, so a saved game accrues nothing while closed.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Milliseconds per game hour on the game-time axis.
pub const MS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Milliseconds per game day on the game-time axis.
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Default real-to-game ratio: one real hour of wall clock per game hour.
pub const DEFAULT_MS_PER_GAME_HOUR: i64 = MS_PER_HOUR;

/// Day/hour game clock
///
/// # Example
/// ```
/// use trade_simulator_core_rs::GameClock;
///
/// let mut clock = GameClock::new();
/// assert_eq!(clock.day(), 1);
/// assert_eq!(clock.hour(), 0);
///
/// clock.advance_one_day();
/// assert_eq!(clock.day(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameClock {
    /// Current game day, starting at 1
    day: u32,
    /// Current hour within the day, 0..24
    hour: u32,
    /// Wall-clock ms of the last elapsed-time advancement.
    ///
    /// Advanced only by whole consumed game hours, so fractional remainders
    /// carry into the next call. No hour is double-counted or dropped.
    last_update_ms: i64,
    /// Real milliseconds per game hour
    ms_per_game_hour: i64,
}

impl GameClock {
    /// Create a clock at day 1, hour 0, anchored to the current wall clock.
    pub fn new() -> Self {
        Self::with_ratio(DEFAULT_MS_PER_GAME_HOUR)
    }

    /// Create a clock with a custom real-to-game ratio.
    ///
    /// # Panics
    /// Panics if `ms_per_game_hour` is not positive.
    pub fn with_ratio(ms_per_game_hour: i64) -> Self {
        assert!(ms_per_game_hour > 0, "ms_per_game_hour must be positive");
        Self {
            day: 1,
            hour: 0,
            last_update_ms: wall_clock_ms(),
            ms_per_game_hour,
        }
    }

    /// Advance by whole game hours elapsed between the anchor and `now_ms`.
    ///
    /// Returns the number of game hours consumed. The anchor moves forward
    /// by exactly the consumed hours; a partial hour stays pending for the
    /// next call. If `now_ms` is earlier than the anchor (host clock skew),
    /// the clock re-anchors and reports zero.
    pub fn advance_by_elapsed(&mut self, now_ms: i64) -> u32 {
        if now_ms < self.last_update_ms {
            self.last_update_ms = now_ms;
            return 0;
        }

        let elapsed_hours = (now_ms - self.last_update_ms) / self.ms_per_game_hour;
        if elapsed_hours == 0 {
            return 0;
        }

        self.last_update_ms += elapsed_hours * self.ms_per_game_hour;

        let total = self.hour as i64 + elapsed_hours;
        self.day += (total / 24) as u32;
        self.hour = (total % 24) as u32;

        elapsed_hours as u32
    }

    /// Advance from the system wall clock. See [`advance_by_elapsed`].
    ///
    /// [`advance_by_elapsed`]: GameClock::advance_by_elapsed
    pub fn advance_by_elapsed_real_time(&mut self) -> u32 {
        self.advance_by_elapsed(wall_clock_ms())
    }

    /// Explicit whole-day step (the sleep action). Hour is left untouched.
    pub fn advance_one_day(&mut self) {
        self.day += 1;
    }

    /// Set the clock when restoring persisted state.
    ///
    /// Bypasses elapsed-time computation and re-anchors the wall-clock
    /// reference to now, so time spent closed never counts.
    pub fn set_absolute(&mut self, day: u32, hour: u32) {
        self.set_absolute_at(day, hour, wall_clock_ms());
    }

    /// Restore path with an explicit wall-clock anchor.
    pub fn set_absolute_at(&mut self, day: u32, hour: u32, now_ms: i64) {
        self.day = day.max(1);
        self.hour = hour % 24;
        self.last_update_ms = now_ms;
    }

    /// Current game day (1-indexed).
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Current hour within the day (0..24).
    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Position on the game-time axis in milliseconds.
    ///
    /// Day 1, hour 0 maps to zero. This is the `now` the ledger computes
    /// due dates and overdue days against.
    pub fn game_time_ms(&self) -> i64 {
        ((self.day as i64 - 1) * 24 + self.hour as i64) * MS_PER_HOUR
    }

    /// HUD-style time string, e.g. `"Day 3 - 04:00"`.
    pub fn time_string(&self) -> String {
        format!("Day {} - {:02}:00", self.day, self.hour)
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Current wall clock as epoch milliseconds.
pub fn wall_clock_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
