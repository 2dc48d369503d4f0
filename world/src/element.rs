use anyhow::bail;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::Heading;

bitflags! {
    /// Static per-kind behavior flags.
    #[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
    pub struct Properties: u8 {
        /// An explosion may overwrite this cell.
        const CONSUMABLE = 1 << 0;
        /// Chain-explosion source.
        const CAN_EXPLODE = 1 << 1;
        /// Things can roll off this cell.
        const ROUNDED = 1 << 2;
        /// The agent may step onto this cell without a push.
        const TRAVERSABLE = 1 << 3;
    }
}

/// Color of a key and its matching gates.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum KeyColor {
    Red,
    Blue,
    Green,
    Yellow,
}

/// Hidden cell kind, the full internal state of one board cell.
///
/// Every kind maps to a fixed hidden-channel index via [`Element::channel`];
/// those integers are an external contract shared with map files and
/// downstream observers and must not change.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
pub enum Element {
    Agent,
    #[default]
    Empty,
    Dirt,
    Stone,
    StoneFalling,
    Diamond,
    DiamondFalling,
    ExitClosed,
    ExitOpen,
    AgentInExit,
    Firefly(Heading),
    Butterfly(Heading),
    WallBrick,
    WallSteel,
    WallMagicDormant,
    WallMagicOn,
    WallMagicExpired,
    Blob,
    ExplosionDiamond,
    ExplosionBoulder,
    ExplosionEmpty,
    GateClosed(KeyColor),
    GateOpen(KeyColor),
    Key(KeyColor),
    Nut,
    NutFalling,
    Bomb,
    BombFalling,
    Orange(Heading),
    PebbleInDirt,
    StoneInDirt,
    VoidInDirt,
}

/// Number of hidden channels.
pub const NUM_ELEMENT_CHANNELS: usize = 50;

use crate::Heading::{Down, Left, Right, Up};
use Element::*;
use KeyColor::{Blue, Green, Red, Yellow};

impl Element {
    pub fn properties(self) -> Properties {
        match self {
            Agent => Properties::CONSUMABLE | Properties::CAN_EXPLODE,
            Empty | Dirt => Properties::CONSUMABLE | Properties::TRAVERSABLE,
            Stone | WallBrick => Properties::CONSUMABLE | Properties::ROUNDED,
            StoneFalling | DiamondFalling => Properties::CONSUMABLE,
            Diamond => {
                Properties::CONSUMABLE
                    | Properties::ROUNDED
                    | Properties::TRAVERSABLE
            }
            ExitClosed | AgentInExit | WallSteel => Properties::empty(),
            ExitOpen => Properties::TRAVERSABLE,
            Firefly(_) | Butterfly(_) | Orange(_) => {
                Properties::CONSUMABLE | Properties::CAN_EXPLODE
            }
            WallMagicDormant | WallMagicOn | WallMagicExpired | Blob => {
                Properties::CONSUMABLE
            }
            ExplosionDiamond | ExplosionBoulder | ExplosionEmpty => {
                Properties::empty()
            }
            GateClosed(_) | GateOpen(_) => Properties::empty(),
            Key(_) => Properties::TRAVERSABLE,
            Nut | NutFalling => Properties::ROUNDED | Properties::CONSUMABLE,
            Bomb | BombFalling => {
                Properties::ROUNDED
                    | Properties::CONSUMABLE
                    | Properties::CAN_EXPLODE
            }
            PebbleInDirt | StoneInDirt | VoidInDirt => Properties::CONSUMABLE,
        }
    }

    pub fn is_consumable(self) -> bool {
        self.properties().contains(Properties::CONSUMABLE)
    }

    pub fn can_explode(self) -> bool {
        self.properties().contains(Properties::CAN_EXPLODE)
    }

    pub fn is_rounded(self) -> bool {
        self.properties().contains(Properties::ROUNDED)
    }

    pub fn is_traversable(self) -> bool {
        self.properties().contains(Properties::TRAVERSABLE)
    }

    /// Empty and dirt are background: they share the fixed id 1 and never
    /// participate in identity tracking.
    pub fn is_background(self) -> bool {
        matches!(self, Empty | Dirt)
    }

    /// The explosion kind this element produces when it blows up.
    ///
    /// Butterflies burst into diamond explosions, stones into boulder
    /// explosions, everything else into empty ones.
    pub fn explosion(self) -> Element {
        match self {
            Butterfly(_) => ExplosionDiamond,
            Stone | StoneFalling => ExplosionBoulder,
            _ => ExplosionEmpty,
        }
    }

    /// What an explosion cell settles into on the tick after the blast.
    pub fn explosion_product(self) -> Option<Element> {
        match self {
            ExplosionDiamond => Some(Diamond),
            ExplosionBoulder => Some(Stone),
            ExplosionEmpty => Some(Empty),
            _ => None,
        }
    }

    /// Falling flavor of a gravity-affected object.
    pub fn falling(self) -> Option<Element> {
        match self {
            Stone => Some(StoneFalling),
            Diamond => Some(DiamondFalling),
            Nut => Some(NutFalling),
            Bomb => Some(BombFalling),
            _ => None,
        }
    }

    /// Magic wall transmutation: stones and diamonds swap flavors.
    pub fn magic_conversion(self) -> Option<Element> {
        match self {
            StoneFalling => Some(DiamondFalling),
            DiamondFalling => Some(StoneFalling),
            _ => None,
        }
    }

    /// Point value credited when the agent consumes this cell.
    pub fn points(self) -> i64 {
        match self {
            Diamond | DiamondFalling => 10,
            AgentInExit => 100,
            _ => 0,
        }
    }

    /// Visible projection used in observations.
    pub fn tile(self) -> Tile {
        match self {
            Agent => Tile::Agent,
            Empty => Tile::Empty,
            Dirt => Tile::Dirt,
            Stone | StoneFalling => Tile::Stone,
            Diamond | DiamondFalling => Tile::Diamond,
            ExitClosed => Tile::ExitClosed,
            ExitOpen => Tile::ExitOpen,
            AgentInExit => Tile::AgentInExit,
            Firefly(_) => Tile::Firefly,
            Butterfly(_) => Tile::Butterfly,
            WallBrick => Tile::WallBrick,
            WallSteel => Tile::WallSteel,
            WallMagicDormant | WallMagicExpired => Tile::WallMagicOff,
            WallMagicOn => Tile::WallMagicOn,
            Blob => Tile::Blob,
            ExplosionDiamond | ExplosionBoulder | ExplosionEmpty => {
                Tile::Explosion
            }
            GateClosed(c) => Tile::GateClosed(c),
            GateOpen(c) => Tile::GateOpen(c),
            Key(c) => Tile::Key(c),
            Nut | NutFalling => Tile::Nut,
            Bomb | BombFalling => Tile::Bomb,
            Orange(_) => Tile::Orange,
            PebbleInDirt => Tile::PebbleInDirt,
            StoneInDirt => Tile::StoneInDirt,
            VoidInDirt => Tile::VoidInDirt,
        }
    }

    /// Hidden-channel index. Part of the external numeric contract.
    pub fn channel(self) -> usize {
        match self {
            Agent => 0,
            Empty => 1,
            Dirt => 2,
            Stone => 3,
            StoneFalling => 4,
            Diamond => 5,
            DiamondFalling => 6,
            ExitClosed => 7,
            ExitOpen => 8,
            AgentInExit => 9,
            Firefly(Up) => 10,
            Firefly(Left) => 11,
            Firefly(Down) => 12,
            Firefly(Right) => 13,
            Butterfly(Up) => 14,
            Butterfly(Left) => 15,
            Butterfly(Down) => 16,
            Butterfly(Right) => 17,
            WallBrick => 18,
            WallSteel => 19,
            WallMagicDormant => 20,
            WallMagicOn => 21,
            WallMagicExpired => 22,
            Blob => 23,
            ExplosionDiamond => 24,
            ExplosionBoulder => 25,
            ExplosionEmpty => 26,
            GateClosed(Red) => 27,
            GateOpen(Red) => 28,
            Key(Red) => 29,
            GateClosed(Blue) => 30,
            GateOpen(Blue) => 31,
            Key(Blue) => 32,
            GateClosed(Green) => 33,
            GateOpen(Green) => 34,
            Key(Green) => 35,
            GateClosed(Yellow) => 36,
            GateOpen(Yellow) => 37,
            Key(Yellow) => 38,
            Nut => 39,
            NutFalling => 40,
            Bomb => 41,
            BombFalling => 42,
            Orange(Up) => 43,
            Orange(Left) => 44,
            Orange(Down) => 45,
            Orange(Right) => 46,
            PebbleInDirt => 47,
            StoneInDirt => 48,
            VoidInDirt => 49,
        }
    }

    /// Decode a hidden-channel index, as found in initial-grid strings.
    pub fn from_channel(id: i64) -> anyhow::Result<Element> {
        Ok(match id {
            0 => Agent,
            1 => Empty,
            2 => Dirt,
            3 => Stone,
            4 => StoneFalling,
            5 => Diamond,
            6 => DiamondFalling,
            7 => ExitClosed,
            8 => ExitOpen,
            9 => AgentInExit,
            10 => Firefly(Up),
            11 => Firefly(Left),
            12 => Firefly(Down),
            13 => Firefly(Right),
            14 => Butterfly(Up),
            15 => Butterfly(Left),
            16 => Butterfly(Down),
            17 => Butterfly(Right),
            18 => WallBrick,
            19 => WallSteel,
            20 => WallMagicDormant,
            21 => WallMagicOn,
            22 => WallMagicExpired,
            23 => Blob,
            24 => ExplosionDiamond,
            25 => ExplosionBoulder,
            26 => ExplosionEmpty,
            27 => GateClosed(Red),
            28 => GateOpen(Red),
            29 => Key(Red),
            30 => GateClosed(Blue),
            31 => GateOpen(Blue),
            32 => Key(Blue),
            33 => GateClosed(Green),
            34 => GateOpen(Green),
            35 => Key(Green),
            36 => GateClosed(Yellow),
            37 => GateOpen(Yellow),
            38 => Key(Yellow),
            39 => Nut,
            40 => NutFalling,
            41 => Bomb,
            42 => BombFalling,
            43 => Orange(Up),
            44 => Orange(Left),
            45 => Orange(Down),
            46 => Orange(Right),
            47 => PebbleInDirt,
            48 => StoneInDirt,
            49 => VoidInDirt,
            _ => bail!("unknown cell id {id}"),
        })
    }
}

/// Visible cell kind, the projection exposed to observers.
///
/// Collapses falling/stationary pairs, enemy facings, and magic wall
/// dormant/expired states.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Tile {
    Agent,
    Empty,
    Dirt,
    Stone,
    Diamond,
    ExitClosed,
    ExitOpen,
    AgentInExit,
    Firefly,
    Butterfly,
    WallBrick,
    WallSteel,
    WallMagicOff,
    WallMagicOn,
    Blob,
    Explosion,
    GateClosed(KeyColor),
    GateOpen(KeyColor),
    Key(KeyColor),
    Nut,
    Bomb,
    Orange,
    PebbleInDirt,
    StoneInDirt,
    VoidInDirt,
}

/// Number of visible channels.
pub const NUM_TILE_CHANNELS: usize = 34;

impl Tile {
    /// Visible-channel index. Part of the external numeric contract.
    pub fn channel(self) -> usize {
        match self {
            Tile::Agent => 0,
            Tile::Empty => 1,
            Tile::Dirt => 2,
            Tile::Stone => 3,
            Tile::Diamond => 4,
            Tile::ExitClosed => 5,
            Tile::ExitOpen => 6,
            Tile::AgentInExit => 7,
            Tile::Firefly => 8,
            Tile::Butterfly => 9,
            Tile::WallBrick => 10,
            Tile::WallSteel => 11,
            Tile::WallMagicOff => 12,
            Tile::WallMagicOn => 13,
            Tile::Blob => 14,
            Tile::Explosion => 15,
            Tile::GateClosed(Red) => 16,
            Tile::GateOpen(Red) => 17,
            Tile::Key(Red) => 18,
            Tile::GateClosed(Blue) => 19,
            Tile::GateOpen(Blue) => 20,
            Tile::Key(Blue) => 21,
            Tile::GateClosed(Green) => 22,
            Tile::GateOpen(Green) => 23,
            Tile::Key(Green) => 24,
            Tile::GateClosed(Yellow) => 25,
            Tile::GateOpen(Yellow) => 26,
            Tile::Key(Yellow) => 27,
            Tile::Nut => 28,
            Tile::Bomb => 29,
            Tile::Orange => 30,
            Tile::PebbleInDirt => 31,
            Tile::StoneInDirt => 32,
            Tile::VoidInDirt => 33,
        }
    }
}
