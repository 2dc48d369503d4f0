use anyhow::Result;
use glam::ivec2;
use serde::{Deserialize, Serialize};
use util::GameRng;
use world::{Action, Board, Element};

use crate::RewardFlags;

/// Tunable construction parameters.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Store object ids in the observation instead of binary channels.
    pub obs_show_ids: bool,
    /// Tick budget of a magic wall once activated.
    pub magic_wall_steps: i32,
    /// Chance out of 256 for a blob cell to attempt growth each tick.
    pub blob_chance: u8,
    /// Fraction of the map the blob may cover before collapsing to stones.
    pub blob_max_percentage: f64,
    /// Seed for the engine rng.
    pub rng_seed: u64,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            obs_show_ids: false,
            magic_wall_steps: 140,
            blob_chance: 20,
            blob_max_percentage: 0.16,
            rng_seed: 0,
        }
    }
}

/// Complete simulation state: the board, the per-tick transients, and the
/// rng. A tick is a pure function of this value and the chosen action.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) rng: GameRng,
    pub(crate) show_ids: bool,
    pub(crate) steps_remaining: Option<i64>,
    pub(crate) gems_required: u32,
    pub(crate) gems_collected: u32,
    pub(crate) current_reward: i64,
    pub(crate) reward_signal: RewardFlags,
    pub(crate) magic_wall_steps: i32,
    pub(crate) magic_active: bool,
    pub(crate) blob_chance: u8,
    pub(crate) blob_size: u32,
    pub(crate) blob_max_size: f64,
    pub(crate) blob_enclosed: bool,
    pub(crate) blob_swap: Option<Element>,
}

impl GameState {
    /// Build a state from an initial-grid string.
    pub fn new(map: &str, params: &Params) -> Result<Self> {
        let (board, header) = Board::parse(map)?;
        let blob_max_size = params.blob_max_percentage
            * (header.cols * header.rows) as f64;
        log::debug!(
            "new game: {}x{}, {} gems required, budget {}",
            header.cols,
            header.rows,
            header.gems_required,
            header.max_steps
        );
        Ok(GameState {
            board,
            rng: util::game_rng(params.rng_seed),
            show_ids: params.obs_show_ids,
            steps_remaining: (header.max_steps > 0)
                .then_some(header.max_steps),
            gems_required: header.gems_required,
            gems_collected: 0,
            current_reward: 0,
            reward_signal: RewardFlags::empty(),
            magic_wall_steps: params.magic_wall_steps,
            magic_active: false,
            blob_chance: params.blob_chance,
            blob_size: 0,
            blob_max_size,
            blob_enclosed: false,
            blob_swap: None,
        })
    }

    /// Advance the whole grid by one tick in response to an agent action.
    ///
    /// The agent acts first, then every cell not already updated this tick
    /// is processed in scan order (top to bottom, left to right). Calling
    /// this on a terminal state is a no-op.
    pub fn apply_action(&mut self, action: Action) {
        if self.is_terminal() {
            return;
        }
        self.begin_tick();

        if let (Some(pos), Some(dir)) =
            (self.board.locate(Element::Agent), action.dir())
        {
            self.update_agent(pos, dir);
        }

        for r in 0..self.board.rows() as i32 {
            for c in 0..self.board.cols() as i32 {
                let pos = ivec2(c, r);
                if self.board.was_updated(pos) {
                    continue;
                }
                match self.board.element(pos) {
                    Element::Stone => self.update_stone(pos),
                    Element::StoneFalling => self.update_stone_falling(pos),
                    Element::Diamond => self.update_diamond(pos),
                    Element::DiamondFalling => {
                        self.update_diamond_falling(pos)
                    }
                    Element::Nut => self.update_nut(pos),
                    Element::NutFalling => self.update_nut_falling(pos),
                    Element::Bomb => self.update_bomb(pos),
                    Element::BombFalling => self.update_bomb_falling(pos),
                    Element::ExitClosed => self.update_exit(pos),
                    Element::Firefly(h) => self.update_firefly(pos, h),
                    Element::Butterfly(h) => self.update_butterfly(pos, h),
                    Element::Orange(h) => self.update_orange(pos, h),
                    Element::WallMagicDormant
                    | Element::WallMagicOn
                    | Element::WallMagicExpired => {
                        self.update_magic_wall(pos)
                    }
                    Element::Blob => self.update_blob(pos),
                    Element::ExplosionDiamond
                    | Element::ExplosionBoulder
                    | Element::ExplosionEmpty => self.update_explosion(pos),
                    _ => {}
                }
            }
        }

        self.finish_tick();
    }

    /// Start-of-scan bookkeeping.
    fn begin_tick(&mut self) {
        if let Some(steps) = &mut self.steps_remaining {
            *steps -= 1;
        }
        self.current_reward = 0;
        self.blob_size = 0;
        self.blob_enclosed = true;
        self.reward_signal = RewardFlags::empty();
        self.board.clear_updated();
    }

    /// End-of-scan bookkeeping: decide the blob's fate and age the magic
    /// wall.
    fn finish_tick(&mut self) {
        if self.blob_swap.is_none() {
            if self.blob_enclosed {
                self.blob_swap = Some(Element::Diamond);
            } else if f64::from(self.blob_size) > self.blob_max_size {
                self.blob_swap = Some(Element::Stone);
            }
        }
        if self.magic_active {
            self.magic_wall_steps = (self.magic_wall_steps - 1).max(0);
            self.magic_active = self.magic_wall_steps > 0;
        }
    }

    fn out_of_time(&self) -> bool {
        self.steps_remaining.is_some_and(|s| s <= 0)
    }

    /// The game is over when the tick budget is spent or no agent is left
    /// on the board (it died or entered the exit).
    pub fn is_terminal(&self) -> bool {
        self.out_of_time() || !self.board.exists(Element::Agent)
    }

    /// Solved when the agent reached the exit before running out of time.
    pub fn is_solution(&self) -> bool {
        !self.out_of_time() && self.board.exists(Element::AgentInExit)
    }

    pub fn legal_actions(&self) -> Vec<Action> {
        if self.is_terminal() {
            Vec::new()
        } else {
            Action::ALL.to_vec()
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Ticks left, `None` when unbounded.
    pub fn steps_remaining(&self) -> Option<i64> {
        self.steps_remaining
    }

    pub fn gems_collected(&self) -> u32 {
        self.gems_collected
    }

    pub fn gems_required(&self) -> u32 {
        self.gems_required
    }

    /// Points accrued during the latest tick.
    pub fn current_reward(&self) -> i64 {
        self.current_reward
    }

    /// Event bitflags accrued during the latest tick.
    pub fn reward_signal(&self) -> RewardFlags {
        self.reward_signal
    }
}
