use std::hash::Hasher;

use world::NUM_TILE_CHANNELS;

use crate::GameState;

/// Visible-channel projection of the board as a dense float tensor of shape
/// (channels, rows, cols), the format downstream learners consume.
///
/// Exactly one channel is set per (row, col). Cells hold 1.0, or the cell id
/// when the state was built with `obs_show_ids`.
#[derive(Clone, PartialEq, Debug)]
pub struct Observation {
    channels: usize,
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Observation {
    fn zeros(channels: usize, rows: usize, cols: usize) -> Self {
        Observation {
            channels,
            rows,
            cols,
            data: vec![0.0; channels * rows * cols],
        }
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.channels, self.rows, self.cols)
    }

    pub fn get(&self, channel: usize, row: usize, col: usize) -> f32 {
        self.data[(channel * self.rows + row) * self.cols + col]
    }

    fn set(&mut self, channel: usize, row: usize, col: usize, value: f32) {
        self.data[(channel * self.rows + row) * self.cols + col] = value;
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Stable content digest, used as state identity in search
    /// deduplication.
    pub fn digest(&self) -> u64 {
        let mut h = twox_hash::XxHash64::default();
        for v in &self.data {
            h.write(&v.to_le_bytes());
        }
        h.finish()
    }
}

impl GameState {
    /// Project the hidden board onto visible channels.
    pub fn observation(&self) -> Observation {
        let mut obs = Observation::zeros(
            NUM_TILE_CHANNELS,
            self.board.rows(),
            self.board.cols(),
        );
        for pos in self.board.scan_order() {
            let cell = self.board.cell(pos);
            let value = if self.show_ids { cell.id as f32 } else { 1.0 };
            obs.set(
                cell.kind.tile().channel(),
                pos.y as usize,
                pos.x as usize,
                value,
            );
        }
        obs
    }

    pub fn observation_shape(&self) -> (usize, usize, usize) {
        (NUM_TILE_CHANNELS, self.board.rows(), self.board.cols())
    }

    /// Content hash of the current observation.
    pub fn digest(&self) -> u64 {
        self.observation().digest()
    }
}
