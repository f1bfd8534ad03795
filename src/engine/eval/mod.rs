//! Position evaluation
//!
//! [`Evaluator`] is the contract the search consumes: a batch of positions
//! in, one score per position out, same order. [`BatchEvaluator`] is the
//! chess implementation: it encodes positions, cuts the input into
//! sub-batches and scores them on rayon workers.

pub mod features;
pub mod network;

use rayon::prelude::*;
use shakmaty::Chess;
use std::sync::Arc;

use super::error::{EngineError, EngineResult};
use super::search::Score;

pub use features::{Features, encode};
pub use network::ValueNetwork;

pub const DEFAULT_EVAL_BATCH_SIZE: usize = 32;

/// Scores positions from the side to move's point of view.
pub trait Evaluator<P>: Send + Sync {
    fn evaluate(&self, positions: &[P]) -> EngineResult<Vec<Score>>;
}

/// A loaded learned scoring function over encoded positions.
pub trait ScoringModel: Send + Sync {
    fn score_batch(&self, batch: &[Features]) -> EngineResult<Vec<Score>>;
}

pub struct BatchEvaluator<M = ValueNetwork> {
    model: Option<Arc<M>>,
    batch_size: usize,
}

impl<M: ScoringModel> BatchEvaluator<M> {
    pub fn new(model: M, batch_size: usize) -> Self {
        BatchEvaluator {
            model: Some(Arc::new(model)),
            batch_size: batch_size.max(1),
        }
    }

    /// An evaluator with no model; every call fails with `EvaluatorUnavailable`.
    pub fn unloaded(batch_size: usize) -> Self {
        BatchEvaluator {
            model: None,
            batch_size: batch_size.max(1),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Same model, different sub-batch size.
    pub fn with_batch_size(&self, batch_size: usize) -> Self {
        BatchEvaluator {
            model: self.model.clone(),
            batch_size: batch_size.max(1),
        }
    }

    fn score_chunk(model: &M, chunk: &[Chess]) -> EngineResult<Vec<Score>> {
        let features: Vec<Features> = chunk.iter().map(encode).collect();
        let scores = model.score_batch(&features)?;
        if scores.len() != chunk.len() {
            return Err(EngineError::EvaluatorOutput {
                expected: chunk.len(),
                actual: scores.len(),
            });
        }
        Ok(scores)
    }
}

impl BatchEvaluator<ValueNetwork> {
    pub fn with_default_network(batch_size: usize) -> Self {
        Self::new(ValueNetwork::default(), batch_size)
    }
}

impl<M: ScoringModel> Evaluator<Chess> for BatchEvaluator<M> {
    fn evaluate(&self, positions: &[Chess]) -> EngineResult<Vec<Score>> {
        let model = self.model.as_deref().ok_or(EngineError::EvaluatorUnavailable)?;

        if positions.len() <= self.batch_size {
            return Self::score_chunk(model, positions);
        }

        let chunks: Vec<Vec<Score>> = positions
            .par_chunks(self.batch_size)
            .map(|chunk| Self::score_chunk(model, chunk))
            .collect::<EngineResult<_>>()?;

        Ok(chunks.into_iter().flatten().collect())
    }
}
