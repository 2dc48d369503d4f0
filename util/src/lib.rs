//! Unopinionated standalone utilities.

mod grid;
pub use grid::Grid;

mod rng;
pub use rng::{game_rng, RngExt};

/// Good default concrete rng.
pub type GameRng = rand_xorshift::XorShiftRng;
