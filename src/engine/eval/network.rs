//! Value network
//!
//! A small integer network over the mover-relative square encoding:
//! - Input: 64 squares * 12 slot codes = 768 sparse one-hot features
//! - Hidden: `HIDDEN_SIZE` accumulators (ClippedReLU activation)
//! - Output: 1 neuron, centipawns for the side to move
//!
//! All arithmetic is integer, so scores are bit-for-bit reproducible no
//! matter how positions are batched or which worker scores them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::features::{Features, NUM_CODES, NUM_SQUARES, feature_index};
use super::ScoringModel;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::search::{MATE_SCORE, Score};

pub const INPUT_SIZE: usize = NUM_SQUARES * NUM_CODES;

pub const HIDDEN_SIZE: usize = 8;

/// Upper clip of the hidden activation.
pub const ACTIVATION_LIMIT: i32 = 16384;

/// Output accumulator is divided by this before clamping.
pub const OUTPUT_SCALE: i32 = (HIDDEN_SIZE / 2) as i32;

const PIECE_VALUES: [i16; 6] = [100, 320, 330, 500, 900, 0]; // P, N, B, R, Q, K

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueNetwork {
    /// Input -> hidden weights [INPUT_SIZE][HIDDEN_SIZE]
    pub input_weights: Vec<Vec<i16>>,
    /// Hidden biases [HIDDEN_SIZE]
    pub hidden_biases: Vec<i32>,
    /// Hidden -> output weights [HIDDEN_SIZE]
    pub output_weights: Vec<i16>,
    pub output_bias: i32,
}

impl ValueNetwork {
    /// Built-in weights: the first half of the hidden layer sums the
    /// mover's material and piece placement, the second half the
    /// opponent's, and the output takes the difference.
    pub fn new() -> Self {
        let half = HIDDEN_SIZE / 2;
        let mut input_weights = vec![vec![0i16; HIDDEN_SIZE]; INPUT_SIZE];

        for sq in 0..NUM_SQUARES {
            for code in 1..=NUM_CODES as u8 {
                let role = (code as usize - 1) % 6;
                let ours = code > 6;
                let value = PIECE_VALUES[role] + placement_bonus(role, sq);
                let neurons = if ours { 0..half } else { half..HIDDEN_SIZE };
                for h in neurons {
                    input_weights[feature_index(sq, code)][h] = value;
                }
            }
        }

        let output_weights = (0..HIDDEN_SIZE)
            .map(|h| if h < half { 1 } else { -1 })
            .collect();

        ValueNetwork {
            input_weights,
            hidden_biases: vec![0; HIDDEN_SIZE],
            output_weights,
            output_bias: 0,
        }
    }

    /// Load weights from a JSON file produced by the training pipeline.
    pub fn from_json_file(path: &Path) -> EngineResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> EngineResult<Self> {
        let network: ValueNetwork = serde_json::from_str(text)?;
        network.validate()?;
        Ok(network)
    }

    fn validate(&self) -> EngineResult<()> {
        check_len("input_weights", INPUT_SIZE, self.input_weights.len())?;
        for row in &self.input_weights {
            check_len("input_weights row", HIDDEN_SIZE, row.len())?;
        }
        check_len("hidden_biases", HIDDEN_SIZE, self.hidden_biases.len())?;
        check_len("output_weights", HIDDEN_SIZE, self.output_weights.len())
    }

    #[inline]
    fn clipped_relu(x: i64) -> i64 {
        x.clamp(0, ACTIVATION_LIMIT as i64)
    }

    /// Score one encoded position.
    ///
    /// Accumulates in `i64`: loaded weights may take any `i16`/`i32` value.
    pub fn forward(&self, features: &Features) -> Score {
        let mut hidden: Vec<i64> = self.hidden_biases.iter().map(|&b| b as i64).collect();

        for (sq, &code) in features.iter().enumerate() {
            if code == 0 {
                continue;
            }
            let row = &self.input_weights[feature_index(sq, code)];
            for (acc, &w) in hidden.iter_mut().zip(row) {
                *acc += w as i64;
            }
        }

        let mut output = 0i64;
        for (&acc, &w) in hidden.iter().zip(&self.output_weights) {
            output += Self::clipped_relu(acc) * w as i64;
        }
        let output = output / OUTPUT_SCALE as i64 + self.output_bias as i64;
        let limit = (MATE_SCORE - 1) as i64;
        output.clamp(-limit, limit) as Score
    }
}

impl Default for ValueNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringModel for ValueNetwork {
    fn score_batch(&self, batch: &[Features]) -> EngineResult<Vec<Score>> {
        Ok(batch.iter().map(|f| self.forward(f)).collect())
    }
}

/// Centre bonus for pawns and minor pieces, symmetric under a board flip.
fn placement_bonus(role: usize, sq: usize) -> i16 {
    if role > 2 {
        return 0;
    }
    let file = (sq % 8) as i16;
    let rank = (sq / 8) as i16;
    let center_dist = ((2 * file - 7).abs() + (2 * rank - 7).abs()) / 2;
    (7 - center_dist) * 2
}

fn check_len(layer: &'static str, expected: usize, actual: usize) -> EngineResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(EngineError::DimensionMismatch {
            layer,
            expected,
            actual,
        })
    }
}
