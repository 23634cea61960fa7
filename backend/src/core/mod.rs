//! Core simulation primitives

pub mod time;

pub use time::SimClock;
