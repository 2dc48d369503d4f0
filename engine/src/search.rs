use std::hash::{Hash, Hasher};

use anyhow::Result;
use world::Action;

use crate::{GameState, Observation, Params, RewardFlags};

/// How search nodes are deduplicated.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Equality {
    /// States with the same observation are the same node.
    Observation,
    /// Same observation and same remaining step count, for searches that
    /// must not conflate revisits at different depths.
    ObservationAndSteps,
}

/// A game state with cached observation identity, for use as a node in
/// deterministic tree search.
#[derive(Clone, Debug)]
pub struct SearchState {
    state: GameState,
    equality: Equality,
    obs: Observation,
}

impl SearchState {
    pub fn new(
        map: &str,
        params: &Params,
        equality: Equality,
    ) -> Result<Self> {
        Ok(Self::from_state(GameState::new(map, params)?, equality))
    }

    pub fn from_state(state: GameState, equality: Equality) -> Self {
        let obs = state.observation();
        SearchState {
            state,
            equality,
            obs,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn observation(&self) -> &Observation {
        &self.obs
    }

    pub fn apply(&mut self, action: Action) {
        self.state.apply_action(action);
        self.obs = self.state.observation();
    }

    /// The state reached by taking the action, leaving this node intact.
    pub fn child(&self, action: Action) -> SearchState {
        let mut ret = self.clone();
        ret.apply(action);
        ret
    }

    /// Actions worth expanding from this node. A state where the agent just
    /// died is a dead end, and a terminal state has no actions at all.
    pub fn successors(&self) -> Vec<Action> {
        if self
            .state
            .reward_signal()
            .contains(RewardFlags::AGENT_DIES)
        {
            Vec::new()
        } else {
            self.state.legal_actions()
        }
    }

    pub fn is_solution(&self) -> bool {
        self.state.is_solution()
    }
}

impl PartialEq for SearchState {
    fn eq(&self, other: &Self) -> bool {
        self.obs == other.obs
            && (self.equality == Equality::Observation
                || self.state.steps_remaining()
                    == other.state.steps_remaining())
    }
}

// Observation floats are whole id counts, never NaN.
impl Eq for SearchState {}

impl Hash for SearchState {
    fn hash<H: Hasher>(&self, h: &mut H) {
        h.write_u64(self.obs.digest());
        if self.equality == Equality::ObservationAndSteps {
            self.state.steps_remaining().hash(h);
        }
    }
}
