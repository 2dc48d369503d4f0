//! Per-kind dynamics handlers.
//!
//! Handlers run at most once per cell per tick; the board's `has_updated`
//! bookkeeping skips cells that already moved or were written this tick.

use glam::IVec2;
use rand::Rng;
use util::RngExt;
use world::{Dir, Element, Heading, KeyColor, Properties, BACKGROUND_ID};

use crate::{GameState, RewardFlags};

impl GameState {
    /// Agent handler, run before the cell scan.
    pub(crate) fn update_agent(&mut self, pos: IVec2, dir: Dir) {
        let Some(target) = self.board.neighbor(pos, dir) else {
            return;
        };
        match target.kind {
            Element::Empty | Element::Dirt => self.board.shift(pos, dir),
            Element::Diamond | Element::DiamondFalling => {
                self.gems_collected += 1;
                self.current_reward += target.kind.points();
                self.reward_signal |= RewardFlags::COLLECT_DIAMOND;
                self.board.shift(pos, dir);
            }
            Element::Stone | Element::Nut | Element::Bomb
                if dir.is_horizontal() =>
            {
                self.push(pos, dir)
            }
            Element::Key(color) => {
                self.open_gates(color);
                self.board.shift(pos, dir);
                self.reward_signal |= RewardFlags::COLLECT_KEY;
            }
            Element::GateOpen(_) => self.walk_through_gate(pos, dir),
            Element::ExitOpen => {
                self.board.shift(pos, dir);
                let exit = pos + dir.offset();
                // The exit swallows the agent's identity.
                self.board.set(exit, Element::AgentInExit, BACKGROUND_ID);
                self.current_reward += match self.steps_remaining {
                    Some(steps) => steps,
                    None => Element::AgentInExit.points(),
                };
                self.reward_signal |= RewardFlags::WALK_THROUGH_EXIT;
            }
            _ => {}
        }
    }

    /// Push a stone, nut, or bomb one cell sideways, stepping into its
    /// place. Only works when the cell past the object is empty.
    fn push(&mut self, pos: IVec2, dir: Dir) {
        let obj = pos + dir.offset();
        if !self.board.matches(obj, dir, Element::Empty) {
            return;
        }
        let target = obj + dir.offset();
        let kind = self.board.element(obj);
        let placed = if self.board.matches(target, Dir::Down, Element::Empty)
        {
            kind.falling().unwrap_or(kind)
        } else {
            kind
        };
        self.board.set(target, placed, self.board.id(obj));
        self.board.shift(pos, dir);
    }

    /// Teleport through an open gate onto the traversable cell past it,
    /// consuming whatever was there.
    fn walk_through_gate(&mut self, pos: IVec2, dir: Dir) {
        let gate = pos + dir.offset();
        if !self.board.has_property(gate, dir, Properties::TRAVERSABLE) {
            return;
        }
        let beyond = gate + dir.offset();
        match self.board.element(beyond) {
            Element::Diamond => {
                self.gems_collected += 1;
                self.current_reward += Element::Diamond.points();
                self.reward_signal |= RewardFlags::COLLECT_DIAMOND;
            }
            Element::Key(color) => {
                self.open_gates(color);
                self.reward_signal |= RewardFlags::COLLECT_KEY;
            }
            _ => {}
        }
        self.board.set(beyond, Element::Agent, self.board.id(pos));
        self.board.set(pos, Element::Empty, BACKGROUND_ID);
        self.reward_signal |= RewardFlags::WALK_THROUGH_GATE;
    }

    /// Convert every closed gate of the color to its open kind.
    fn open_gates(&mut self, color: KeyColor) {
        for pos in self.board.all_of(Element::GateClosed(color)) {
            let id = self.board.mint();
            self.board.set(pos, Element::GateOpen(color), id);
        }
    }

    pub(crate) fn update_stone(&mut self, pos: IVec2) {
        if self.board.matches(pos, Dir::Down, Element::Empty) {
            self.board
                .set(pos, Element::StoneFalling, self.board.id(pos));
            self.update_stone_falling(pos);
        } else if self.can_roll(pos, Dir::Left) {
            self.roll(pos, Element::StoneFalling, Dir::Left);
        } else if self.can_roll(pos, Dir::Right) {
            self.roll(pos, Element::StoneFalling, Dir::Right);
        }
    }

    pub(crate) fn update_stone_falling(&mut self, pos: IVec2) {
        let below = pos + Dir::Down.offset();
        if self.board.matches(pos, Dir::Down, Element::Empty) {
            self.board.shift(pos, Dir::Down);
        } else if self
            .board
            .has_property(pos, Dir::Down, Properties::CAN_EXPLODE)
        {
            self.explode(below, self.board.element(below).explosion());
        } else if self.board.matches(pos, Dir::Down, Element::WallMagicOn)
            || self.board.matches(pos, Dir::Down, Element::WallMagicDormant)
        {
            self.magic_wall_pass(pos, Element::Stone);
        } else if self.board.matches(pos, Dir::Down, Element::Nut) {
            // A stone cracks the nut open into a diamond.
            let id = self.board.mint();
            self.board.set(below, Element::Diamond, id);
            self.reward_signal |= RewardFlags::NUT_TO_DIAMOND;
        } else if self.can_roll(pos, Dir::Left) {
            self.roll(pos, Element::StoneFalling, Dir::Left);
        } else if self.can_roll(pos, Dir::Right) {
            self.roll(pos, Element::StoneFalling, Dir::Right);
        } else {
            self.board.set(pos, Element::Stone, self.board.id(pos));
        }
    }

    pub(crate) fn update_diamond(&mut self, pos: IVec2) {
        if self.board.matches(pos, Dir::Down, Element::Empty) {
            self.board
                .set(pos, Element::DiamondFalling, self.board.id(pos));
            self.update_diamond_falling(pos);
        } else if self.can_roll(pos, Dir::Left) {
            self.roll(pos, Element::DiamondFalling, Dir::Left);
        } else if self.can_roll(pos, Dir::Right) {
            self.roll(pos, Element::DiamondFalling, Dir::Right);
        }
    }

    pub(crate) fn update_diamond_falling(&mut self, pos: IVec2) {
        let below = pos + Dir::Down.offset();
        // Unlike stones, falling diamonds do not set off bombs.
        let explodes_below = self
            .board
            .has_property(pos, Dir::Down, Properties::CAN_EXPLODE)
            && !self.board.matches(pos, Dir::Down, Element::Bomb)
            && !self.board.matches(pos, Dir::Down, Element::BombFalling);
        if self.board.matches(pos, Dir::Down, Element::Empty) {
            self.board.shift(pos, Dir::Down);
        } else if explodes_below {
            self.explode(below, self.board.element(below).explosion());
        } else if self.board.matches(pos, Dir::Down, Element::WallMagicOn)
            || self.board.matches(pos, Dir::Down, Element::WallMagicDormant)
        {
            self.magic_wall_pass(pos, Element::Diamond);
        } else if self.can_roll(pos, Dir::Left) {
            self.roll(pos, Element::DiamondFalling, Dir::Left);
        } else if self.can_roll(pos, Dir::Right) {
            self.roll(pos, Element::DiamondFalling, Dir::Right);
        } else {
            self.board.set(pos, Element::Diamond, self.board.id(pos));
        }
    }

    pub(crate) fn update_nut(&mut self, pos: IVec2) {
        if self.board.matches(pos, Dir::Down, Element::Empty) {
            self.board.set(pos, Element::NutFalling, self.board.id(pos));
            self.update_nut_falling(pos);
        } else if self.can_roll(pos, Dir::Left) {
            self.roll(pos, Element::NutFalling, Dir::Left);
        } else if self.can_roll(pos, Dir::Right) {
            self.roll(pos, Element::NutFalling, Dir::Right);
        }
    }

    pub(crate) fn update_nut_falling(&mut self, pos: IVec2) {
        if self.board.matches(pos, Dir::Down, Element::Empty) {
            self.board.shift(pos, Dir::Down);
        } else if self.can_roll(pos, Dir::Left) {
            self.roll(pos, Element::NutFalling, Dir::Left);
        } else if self.can_roll(pos, Dir::Right) {
            self.roll(pos, Element::NutFalling, Dir::Right);
        } else {
            self.board.set(pos, Element::Nut, self.board.id(pos));
        }
    }

    pub(crate) fn update_bomb(&mut self, pos: IVec2) {
        if self.board.matches(pos, Dir::Down, Element::Empty) {
            self.board
                .set(pos, Element::BombFalling, self.board.id(pos));
            self.update_bomb_falling(pos);
        } else if self.can_roll(pos, Dir::Left) {
            self.roll(pos, Element::BombFalling, Dir::Left);
        } else if self.can_roll(pos, Dir::Right) {
            self.roll(pos, Element::BombFalling, Dir::Right);
        }
    }

    pub(crate) fn update_bomb_falling(&mut self, pos: IVec2) {
        if self.board.matches(pos, Dir::Down, Element::Empty) {
            self.board.shift(pos, Dir::Down);
        } else if self.can_roll(pos, Dir::Left) {
            self.roll(pos, Element::BombFalling, Dir::Left);
        } else if self.can_roll(pos, Dir::Right) {
            self.roll(pos, Element::BombFalling, Dir::Right);
        } else {
            // Bombs explode on landing instead of settling.
            self.explode(pos, self.board.element(pos).explosion());
        }
    }

    /// Open the exit once enough gems have been collected.
    pub(crate) fn update_exit(&mut self, pos: IVec2) {
        if self.gems_collected >= self.gems_required {
            self.board.set(pos, Element::ExitOpen, self.board.id(pos));
        }
    }

    /// Fireflies hug the left wall: turn left when possible, else straight,
    /// else turn right in place. Touching the agent or the blob sets them
    /// off.
    pub(crate) fn update_firefly(&mut self, pos: IVec2, heading: Heading) {
        if self.adjacent_to(pos, Element::Agent)
            || self.adjacent_to(pos, Element::Blob)
        {
            self.explode(pos, self.board.element(pos).explosion());
            return;
        }
        let turned = heading.left();
        if self.board.matches(pos, turned.dir(), Element::Empty) {
            self.board
                .set(pos, Element::Firefly(turned), self.board.id(pos));
            self.board.shift(pos, turned.dir());
        } else if self.board.matches(pos, heading.dir(), Element::Empty) {
            self.board.shift(pos, heading.dir());
        } else {
            self.board.set(
                pos,
                Element::Firefly(heading.right()),
                self.board.id(pos),
            );
        }
    }

    /// Butterflies mirror fireflies: right wall, diamond explosions.
    pub(crate) fn update_butterfly(&mut self, pos: IVec2, heading: Heading) {
        if self.adjacent_to(pos, Element::Agent)
            || self.adjacent_to(pos, Element::Blob)
        {
            self.explode(pos, self.board.element(pos).explosion());
            return;
        }
        let turned = heading.right();
        if self.board.matches(pos, turned.dir(), Element::Empty) {
            self.board
                .set(pos, Element::Butterfly(turned), self.board.id(pos));
            self.board.shift(pos, turned.dir());
        } else if self.board.matches(pos, heading.dir(), Element::Empty) {
            self.board.shift(pos, heading.dir());
        } else {
            self.board.set(
                pos,
                Element::Butterfly(heading.left()),
                self.board.id(pos),
            );
        }
    }

    /// Oranges barrel forward until blocked, explode when they reach the
    /// agent, and otherwise pick a random open direction to face.
    pub(crate) fn update_orange(&mut self, pos: IVec2, heading: Heading) {
        if self.board.matches(pos, heading.dir(), Element::Empty) {
            self.board.shift(pos, heading.dir());
        } else if self.adjacent_to(pos, Element::Agent) {
            self.explode(pos, self.board.element(pos).explosion());
        } else {
            let open: Vec<Heading> = Heading::ALL
                .into_iter()
                .filter(|h| self.board.matches(pos, h.dir(), Element::Empty))
                .collect();
            if let Some(i) = self.rng.index(open.len()) {
                self.board
                    .set(pos, Element::Orange(open[i]), self.board.id(pos));
            }
        }
    }

    /// Magic wall cells track the global wall state.
    pub(crate) fn update_magic_wall(&mut self, pos: IVec2) {
        let kind = if self.magic_active {
            Element::WallMagicOn
        } else if self.magic_wall_steps > 0 {
            Element::WallMagicDormant
        } else {
            Element::WallMagicExpired
        };
        self.board.set(pos, kind, self.board.id(pos));
    }

    /// Blob cells grow into empty space and dirt. Once the swap kind is
    /// decided at end of scan, every blob cell collapses into it.
    pub(crate) fn update_blob(&mut self, pos: IVec2) {
        if let Some(swap) = self.blob_swap {
            let id = self.board.mint();
            self.board.set(pos, swap, id);
            return;
        }
        self.blob_size += 1;
        if self.adjacent_to(pos, Element::Empty)
            || self.adjacent_to(pos, Element::Dirt)
        {
            self.blob_enclosed = false;
        }
        if self.rng.gen_range(0..256) < i32::from(self.blob_chance) {
            let growth =
                Heading::ALL[self.rng.gen_range(0..Heading::ALL.len())];
            let dir = growth.dir();
            if self.board.matches(pos, dir, Element::Empty)
                || self.board.matches(pos, dir, Element::Dirt)
            {
                let id = self.board.mint();
                self.board.set(pos + dir.offset(), Element::Blob, id);
            }
        }
    }

    /// Resolve an explosion cell into its product.
    pub(crate) fn update_explosion(&mut self, pos: IVec2) {
        if let Some(product) = self.board.element(pos).explosion_product() {
            if product == Element::Diamond {
                self.reward_signal |= RewardFlags::BUTTERFLY_TO_DIAMOND;
            }
            let id = self.board.mint();
            let id = if product.is_background() { BACKGROUND_ID } else { id };
            self.board.set(pos, product, id);
        }
    }

    /// Blast a cell into the given explosion kind and spread over the eight
    /// neighbors: chain-explode sources, overwrite consumables. The spread
    /// product comes from the element that occupied the center.
    pub(crate) fn explode(&mut self, pos: IVec2, as_kind: Element) {
        let old = self.board.element(pos);
        if old == Element::Agent {
            self.reward_signal |= RewardFlags::AGENT_DIES;
        }
        let spread = old.explosion();
        let id = self.board.mint();
        self.board.set(pos, as_kind, id);
        for dir in Dir::ALL {
            let Some(cell) = self.board.neighbor(pos, dir) else {
                continue;
            };
            let target = pos + dir.offset();
            if cell.kind.can_explode() {
                self.explode(target, spread);
            } else if cell.kind.is_consumable() {
                let id = self.board.mint();
                self.board.set(target, spread, id);
            }
        }
    }

    /// Drop a falling stone or diamond through a live magic wall, swapping
    /// its kind on the way. Fails when the wall is out of time or there is
    /// no room below it, in which case the object settles on the wall.
    fn magic_wall_pass(&mut self, pos: IVec2, landed: Element) {
        let below = pos + Dir::Down.offset();
        if self.magic_wall_steps > 0
            && self.board.matches(below, Dir::Down, Element::Empty)
        {
            if let Some(converted) =
                self.board.element(pos).magic_conversion()
            {
                self.magic_active = true;
                self.board.set(pos, Element::Empty, BACKGROUND_ID);
                let id = self.board.mint();
                self.board
                    .set(below + Dir::Down.offset(), converted, id);
                return;
            }
        }
        self.board.set(pos, landed, self.board.id(pos));
    }

    fn can_roll(&self, pos: IVec2, side: Dir) -> bool {
        let diagonal = match side {
            Dir::Left => Dir::DownLeft,
            _ => Dir::DownRight,
        };
        self.board
            .has_property(pos, Dir::Down, Properties::ROUNDED)
            && self.board.matches(pos, side, Element::Empty)
            && self.board.matches(pos, diagonal, Element::Empty)
    }

    fn roll(&mut self, pos: IVec2, falling: Element, side: Dir) {
        self.board.set(pos, falling, self.board.id(pos));
        self.board.shift(pos, side);
    }

    fn adjacent_to(&self, pos: IVec2, kind: Element) -> bool {
        Dir::CARDINAL
            .iter()
            .any(|&d| self.board.matches(pos, d, kind))
    }
}
