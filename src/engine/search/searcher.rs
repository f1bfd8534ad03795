//! Searcher: one sequential negamax worker bound to a shared evaluator and cache.

use crate::engine::eval::Evaluator;
use crate::engine::oracle::GamePosition;
use crate::engine::tt::TranspositionCache;

use super::types::{SearchStats, TerminalScoring};

pub struct Searcher<'a, P: GamePosition, E> {
    pub(super) evaluator: &'a E,
    pub(super) cache: &'a TranspositionCache<P::Key>,
    pub(super) terminal: TerminalScoring,
    pub(super) stats: SearchStats,
}

impl<'a, P: GamePosition, E: Evaluator<P>> Searcher<'a, P, E> {
    pub fn new(evaluator: &'a E, cache: &'a TranspositionCache<P::Key>) -> Self {
        Searcher {
            evaluator,
            cache,
            terminal: TerminalScoring::default(),
            stats: SearchStats::default(),
        }
    }

    pub fn with_terminal_scoring(mut self, terminal: TerminalScoring) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn into_stats(self) -> SearchStats {
        self.stats
    }
}
