//! Scores, ranking parameters, stats, and constants.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Centipawns from the side to move's point of view.
pub type Score = i32;

pub const INFINITY: Score = 30000;
pub const MATE_SCORE: Score = 29000;
pub const DRAW_SCORE: Score = 0;

/// Parameters of one `rank` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankParams {
    /// Number of ranked moves to return.
    pub num_results: usize,
    /// Root moves handed to each worker.
    pub batch_size: usize,
    /// Search depth in plies, counted from the root position.
    pub depth: u32,
    /// Concurrent batch workers.
    pub parallelism: usize,
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            num_results: 1,
            batch_size: 32,
            depth: 2,
            parallelism: 4,
        }
    }
}

impl RankParams {
    /// Clamp counts to at least one so every call has a worker and a batch.
    pub fn normalized(&self) -> Self {
        Self {
            num_results: self.num_results.max(1),
            batch_size: self.batch_size.max(1),
            depth: self.depth,
            parallelism: self.parallelism.max(1),
        }
    }
}

/// How positions without legal moves are scored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminalScoring {
    /// Hand terminal positions to the evaluator like any leaf.
    #[default]
    Evaluator,
    /// Checkmate is `-MATE_SCORE`, any other finished game is a draw.
    Canonical,
}

/// Oracle classification of a root move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Capture,
    Castle,
    Quiet,
}

/// A root move with its final score.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedMove<M> {
    pub mv: M,
    pub score: Score,
    pub kind: MoveKind,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub leaf_evals: u64,
    pub cache_hits: u64,
    pub cutoffs: u64,
}

impl AddAssign for SearchStats {
    fn add_assign(&mut self, other: Self) {
        self.nodes += other.nodes;
        self.leaf_evals += other.leaf_evals;
        self.cache_hits += other.cache_hits;
        self.cutoffs += other.cutoffs;
    }
}
