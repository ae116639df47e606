//! An engine for San Jego, a two-player game of stacking towers.
//!
//! Positions are searched with alpha-beta search, and small boards can be solved completely.

pub mod error;
pub mod game;
pub mod minmax;
pub mod position;
pub mod rules;
pub mod search;
mod tests;

pub use error::{Error, ErrorKind};
