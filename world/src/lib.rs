//! Cave element datatypes and the channel grid they live in.

mod board;
pub use board::{Board, Cell, MapHeader, BACKGROUND_ID};

mod direction;
pub use direction::{Action, Dir, Heading, NUM_ACTIONS};

mod element;
pub use element::{
    Element, KeyColor, Properties, Tile, NUM_ELEMENT_CHANNELS,
    NUM_TILE_CHANNELS,
};
