//! Time management and shared constants

pub mod time;
