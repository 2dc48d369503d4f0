//! Deterministic tick engine for a stones-and-gems cave game.
//!
//! The engine advances a grid of typed cells by one discrete tick per agent
//! action, applying gravity, rolling, explosions, magic-wall transmutation,
//! enemy motion, keyed gates, and blob growth. It exposes a
//! reinforcement-learning style interface ([`Environment`]) and a
//! deterministic successor interface for tree search ([`SearchState`]).
//!
//! States are built from an initial-grid string: a `cols, rows, max_steps,
//! gems_required` header followed by one line of hidden cell ids per row.
//!
//! ```
//! use rockfall::{Action, GameState, Params};
//!
//! let map = "3,3,10,0\n19,19,19\n19,0,8\n19,19,19";
//! let mut state = GameState::new(map, &Params::default()).unwrap();
//! state.apply_action(Action::Right);
//! assert!(state.is_solution());
//! ```

pub use engine::{
    Equality, GameState, Observation, Params, RewardFlags, SearchState,
};
pub use world::{
    Action, Board, Cell, Dir, Element, Heading, KeyColor, MapHeader,
    Properties, Tile, NUM_ACTIONS, NUM_ELEMENT_CHANNELS, NUM_TILE_CHANNELS,
};

mod env;
pub use env::{Environment, Step};
