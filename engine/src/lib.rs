//! Core game logic: the tick driver, per-kind dynamics handlers,
//! observation encoding, and search-facing state identity.

mod observe;
pub use observe::Observation;

mod reward;
pub use reward::RewardFlags;

mod rules;

mod search;
pub use search::{Equality, SearchState};

mod state;
pub use state::{GameState, Params};
