use rand::{Rng, SeedableRng};

use crate::GameRng;

/// Build the engine rng from a numeric seed.
pub fn game_rng(seed: u64) -> GameRng {
    GameRng::seed_from_u64(seed)
}

pub trait RngExt {
    /// Uniform index into a collection of the given length.
    ///
    /// Returns `None` for an empty collection.
    fn index(&mut self, len: usize) -> Option<usize>;
}

impl<T: Rng + ?Sized> RngExt for T {
    fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.gen_range(0..len))
    }
}
