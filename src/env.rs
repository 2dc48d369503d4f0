use anyhow::Result;
use engine::{GameState, Observation, Params};
use world::Action;

/// Result of one environment step.
pub struct Step {
    pub observation: Observation,
    /// Points accrued this tick.
    pub reward: i64,
    pub done: bool,
}

/// Episodic wrapper around [`GameState`] with the usual
/// reset/step/reward-accounting surface of a reinforcement-learning
/// environment. Keeps the map string so episodes can restart.
pub struct Environment {
    map: String,
    params: Params,
    state: GameState,
    steps_taken: u64,
    cumulative_reward: i64,
}

impl Environment {
    pub fn new(map: &str, params: Params) -> Result<Self> {
        let state = GameState::new(map, &params)?;
        Ok(Environment {
            map: map.to_owned(),
            params,
            state,
            steps_taken: 0,
            cumulative_reward: 0,
        })
    }

    /// Restart the episode from the initial grid.
    pub fn reset(&mut self) -> Observation {
        log::debug!("environment reset after {} steps", self.steps_taken);
        // The map was validated at construction.
        if let Ok(state) = GameState::new(&self.map, &self.params) {
            self.state = state;
        }
        self.steps_taken = 0;
        self.cumulative_reward = 0;
        self.state.observation()
    }

    /// Apply a raw action id. Fails on ids outside `0..NUM_ACTIONS` without
    /// starting the tick.
    pub fn step(&mut self, action: usize) -> Result<Step> {
        let action = Action::try_from(action)?;
        self.state.apply_action(action);
        self.steps_taken += 1;
        let reward = self.state.current_reward();
        self.cumulative_reward += reward;
        Ok(Step {
            observation: self.state.observation(),
            reward,
            done: self.state.is_terminal(),
        })
    }

    pub fn num_actions(&self) -> usize {
        world::NUM_ACTIONS
    }

    pub fn observation_shape(&self) -> (usize, usize, usize) {
        self.state.observation_shape()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    pub fn cumulative_reward(&self) -> i64 {
        self.cumulative_reward
    }

    pub fn is_done(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn did_win(&self) -> bool {
        self.state.is_solution()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const MAP: &str = "5,5,100,0\n\
                       19,19,19,19,19\n\
                       19,2,2,2,19\n\
                       19,0,2,8,19\n\
                       19,2,2,2,19\n\
                       19,19,19,19,19";

    #[test]
    fn episode_runs_to_the_exit() {
        let mut env = Environment::new(MAP, Params::default()).unwrap();
        assert_eq!(env.num_actions(), 5);
        assert_eq!(env.observation_shape(), (34, 5, 5));

        let step = env.step(2).unwrap();
        assert!(!step.done);
        assert_eq!(step.reward, 0);

        let step = env.step(2).unwrap();
        assert!(step.done);
        assert!(env.did_win());
        // Walking through the exit pays out the remaining tick budget.
        assert_eq!(step.reward, 98);
        assert_eq!(env.cumulative_reward(), 98);
        assert_eq!(env.steps_taken(), 2);
    }

    #[test]
    fn bad_action_ids_are_rejected() {
        let mut env = Environment::new(MAP, Params::default()).unwrap();
        assert!(env.step(5).is_err());
        assert!(env.step(99).is_err());
        // The failed calls did not burn ticks.
        assert_eq!(env.state().steps_remaining(), Some(100));
    }

    #[test]
    fn reset_restarts_the_episode() {
        let mut env = Environment::new(MAP, Params::default()).unwrap();
        let initial = env.state().observation();
        env.step(2).unwrap();
        env.step(2).unwrap();
        assert!(env.is_done());

        let obs = env.reset();
        assert_eq!(obs, initial);
        assert!(!env.is_done());
        assert_eq!(env.cumulative_reward(), 0);
        assert_eq!(env.steps_taken(), 0);
    }
}
