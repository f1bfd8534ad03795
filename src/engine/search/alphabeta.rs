//! Negamax with alpha-beta pruning over the position oracle.

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::eval::Evaluator;
use crate::engine::oracle::GamePosition;
use crate::engine::tt::CacheMode;

use super::searcher::Searcher;
use super::types::{DRAW_SCORE, INFINITY, MATE_SCORE, Score, TerminalScoring};

impl<P: GamePosition, E: Evaluator<P>> Searcher<'_, P, E> {
    /// Score `pos` from the mover's point of view, searching `depth` plies.
    ///
    /// Fail-hard at the top: a child score at or above `beta` returns
    /// `beta` without visiting the remaining siblings.
    pub fn search(&mut self, pos: &P, depth: u32, mut alpha: Score, beta: Score) -> EngineResult<Score> {
        self.stats.nodes += 1;

        let key = pos.canonical_key();
        if let Some(score) = self.cache.get(&key, depth) {
            self.stats.cache_hits += 1;
            return Ok(score);
        }

        if self.terminal == TerminalScoring::Canonical && pos.is_terminal() {
            let score = Self::canonical_terminal_score(pos);
            self.cache.put(key, depth, score);
            return Ok(score);
        }

        if depth == 0 {
            let score = self.evaluate_leaf(pos)?;
            self.cache.put(key, depth, score);
            return Ok(score);
        }

        let moves = pos.legal_moves();
        if moves.is_empty() {
            let score = self.evaluate_leaf(pos)?;
            self.cache.put(key, depth, score);
            return Ok(score);
        }

        let alpha_orig = alpha;
        let mut best_score = -INFINITY;

        for mv in &moves {
            let child = pos.apply(mv)?;
            let score = -self.search(&child, depth - 1, -beta, -alpha)?;

            if score >= beta {
                self.stats.cutoffs += 1;
                return Ok(beta);
            }
            if score > best_score {
                best_score = score;
                if score > alpha {
                    alpha = score;
                }
            }
        }

        // A fail-low score is only an upper bound.
        if self.cache.mode() == CacheMode::PositionOnly || best_score > alpha_orig {
            self.cache.put(key, depth, best_score);
        }

        Ok(best_score)
    }

    /// Single-position evaluator call.
    pub(super) fn evaluate_leaf(&mut self, pos: &P) -> EngineResult<Score> {
        self.stats.leaf_evals += 1;
        let scores = self.evaluator.evaluate(std::slice::from_ref(pos))?;
        scores
            .first()
            .copied()
            .ok_or(EngineError::EvaluatorOutput {
                expected: 1,
                actual: 0,
            })
    }

    fn canonical_terminal_score(pos: &P) -> Score {
        if pos.is_checkmate() { -MATE_SCORE } else { DRAW_SCORE }
    }
}
