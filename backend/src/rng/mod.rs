//! Deterministic random number generation
//!
//! Uses the xorshift64* algorithm for fast, deterministic random numbers.
//! CRITICAL: All randomness in the simulation MUST go through this module.
//!
//! Price and event computations never touch a concrete generator directly;
//! they draw through the [`UniformSource`] trait so tests can substitute
//! scripted sequences.

mod xorshift;

pub use xorshift::RngManager;

/// A source of uniform random floats in `[0.0, 1.0)`.
///
/// The single seam between the simulation and its randomness. Production
/// code uses [`RngManager`]; tests may supply a scripted implementation to
/// pin every draw.
pub trait UniformSource {
    /// Next uniform value in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;
}
