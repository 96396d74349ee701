//! xorshift64* random number generator
//!
//! A fast, high-quality PRNG with 64-bit state and 64-bit output.
//!
//! # Determinism
//!
//! Same seed → same sequence. This is what makes a whole game session
//! replayable: a saved seed reproduces every price roll and event draw
//! exactly.

use serde::{Deserialize, Serialize};

use super::UniformSource;

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use trade_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with the given seed.
    ///
    /// A zero seed is coerced to 1 (xorshift requires nonzero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate the next random u64 value, advancing the internal state.
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Current internal state (for checkpointing/replay).
    ///
    /// A generator recreated with `RngManager::new(state)` continues the
    /// same sequence.
    pub fn get_state(&self) -> u64 {
        self.state
    }
}

impl UniformSource for RngManager {
    /// Uniform f64 in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }
}
