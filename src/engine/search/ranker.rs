//! Move ranking: batched, parallel root search with a refinement pass.

use log::{debug, trace};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

use crate::engine::error::EngineResult;
use crate::engine::eval::Evaluator;
use crate::engine::oracle::GamePosition;
use crate::engine::tt::TranspositionCache;

use super::ordering::{RootMove, classify, order_captures, order_quiet, partition};
use super::searcher::Searcher;
use super::types::{INFINITY, RankParams, RankedMove, Score, SearchStats, TerminalScoring};

struct ScoredMove<M> {
    root: RootMove<M>,
    score: Score,
}

struct BatchOutcome<M> {
    scored: Vec<ScoredMove<M>>,
    stats: SearchStats,
}

/// Ranks the root moves of a position. Owns shared handles to the
/// evaluator and the session's transposition cache; each worker gets
/// its own [`Searcher`] over them.
pub struct Ranker<P: GamePosition, E> {
    evaluator: Arc<E>,
    cache: Arc<TranspositionCache<P::Key>>,
    terminal: TerminalScoring,
}

impl<P: GamePosition, E: Evaluator<P>> Ranker<P, E> {
    pub fn new(evaluator: Arc<E>, cache: Arc<TranspositionCache<P::Key>>) -> Self {
        Ranker {
            evaluator,
            cache,
            terminal: TerminalScoring::default(),
        }
    }

    pub fn with_terminal_scoring(mut self, terminal: TerminalScoring) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn set_terminal_scoring(&mut self, terminal: TerminalScoring) {
        self.terminal = terminal;
    }

    pub fn terminal_scoring(&self) -> TerminalScoring {
        self.terminal
    }

    pub fn evaluator(&self) -> &Arc<E> {
        &self.evaluator
    }

    pub fn cache(&self) -> &Arc<TranspositionCache<P::Key>> {
        &self.cache
    }

    /// A sequential searcher over this ranker's evaluator and cache.
    pub fn searcher(&self) -> Searcher<'_, P, E> {
        Searcher::new(&*self.evaluator, &*self.cache).with_terminal_scoring(self.terminal)
    }

    /// Ranked root moves, best first. Empty when `pos` has no legal moves.
    pub fn rank(&self, pos: &P, params: &RankParams) -> EngineResult<Vec<RankedMove<P::Move>>> {
        self.rank_with_stats(pos, params).map(|(ranked, _)| ranked)
    }

    pub fn rank_with_stats(
        &self,
        pos: &P,
        params: &RankParams,
    ) -> EngineResult<(Vec<RankedMove<P::Move>>, SearchStats)> {
        let params = params.normalized();
        let start = Instant::now();

        let roots: Vec<RootMove<P::Move>> = pos
            .legal_moves()
            .into_iter()
            .enumerate()
            .map(|(index, mv)| RootMove {
                index,
                kind: classify(pos, &mv),
                mv,
            })
            .collect();

        if roots.is_empty() {
            debug!("no legal moves to rank");
            return Ok((Vec::new(), SearchStats::default()));
        }

        let batches: Vec<Vec<RootMove<P::Move>>> = roots
            .chunks(params.batch_size)
            .map(<[_]>::to_vec)
            .collect();
        debug!(
            "ranking {} moves in {} batches (depth {}, parallelism {})",
            roots.len(),
            batches.len(),
            params.depth,
            params.parallelism
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(params.parallelism)
            .thread_name(|i| format!("ares-rank-{i}"))
            .build()?;

        let outcomes: Vec<BatchOutcome<P::Move>> = pool.install(|| {
            batches
                .into_par_iter()
                .map(|batch| self.score_batch(pos, batch, params.depth))
                .collect::<EngineResult<_>>()
        })?;

        let mut stats = SearchStats::default();
        let mut merged = Vec::with_capacity(roots.len());
        for outcome in outcomes {
            stats += outcome.stats;
            merged.extend(outcome.scored);
        }
        sort_ranked(&mut merged);
        merged.truncate(params.num_results);

        let refine_depth = params.depth.saturating_sub(1);
        let refined: Vec<(ScoredMove<P::Move>, SearchStats)> = pool.install(|| {
            merged
                .into_par_iter()
                .map(|scored| {
                    let mut searcher = self.searcher();
                    let child = pos.apply(&scored.root.mv)?;
                    let refinement = -searcher.search(&child, refine_depth, -INFINITY, INFINITY)?;
                    trace!(
                        "refined move #{}: {} -> {}",
                        scored.root.index,
                        scored.score,
                        refinement
                    );
                    let score = average(scored.score, refinement);
                    Ok((ScoredMove { score, ..scored }, searcher.into_stats()))
                })
                .collect::<EngineResult<_>>()
        })?;

        let mut top = Vec::with_capacity(refined.len());
        for (scored, refine_stats) in refined {
            stats += refine_stats;
            top.push(scored);
        }
        sort_ranked(&mut top);

        debug!(
            "ranked {} moves in {:?}: {} nodes, {} leaf evals, {} cache hits, {} cutoffs, {} cache entries",
            roots.len(),
            start.elapsed(),
            stats.nodes,
            stats.leaf_evals,
            stats.cache_hits,
            stats.cutoffs,
            self.cache.len()
        );

        let ranked = top
            .into_iter()
            .map(|scored| RankedMove {
                mv: scored.root.mv,
                score: scored.score,
                kind: scored.root.kind,
            })
            .collect();
        Ok((ranked, stats))
    }

    /// Score one batch on the current worker: captures at full depth first,
    /// then quiet moves in static-eval order at reduced depth.
    fn score_batch(
        &self,
        pos: &P,
        batch: Vec<RootMove<P::Move>>,
        depth: u32,
    ) -> EngineResult<BatchOutcome<P::Move>> {
        let mut searcher = self.searcher();
        let full_depth = depth.saturating_sub(1);
        let reduced_depth = depth.saturating_sub(2);

        let (mut captures, quiet) = partition(batch);
        order_captures(pos, &mut captures);

        let mut scored = Vec::with_capacity(captures.len() + quiet.len());
        for root in captures {
            let child = pos.apply(&root.mv)?;
            let score = -searcher.search(&child, full_depth, -INFINITY, INFINITY)?;
            scored.push(ScoredMove { root, score });
        }

        for (root, child) in order_quiet(pos, quiet, &*self.evaluator)? {
            let score = -searcher.search(&child, reduced_depth, -INFINITY, INFINITY)?;
            scored.push(ScoredMove { root, score });
        }

        trace!(
            "batch of {} moves done: {} nodes",
            scored.len(),
            searcher.stats().nodes
        );
        Ok(BatchOutcome {
            scored,
            stats: searcher.into_stats(),
        })
    }
}

/// Descending by score; equal scores keep root generation order.
fn sort_ranked<M>(moves: &mut [ScoredMove<M>]) {
    moves.sort_by(|a, b| b.score.cmp(&a.score).then(a.root.index.cmp(&b.root.index)));
}

fn average(a: Score, b: Score) -> Score {
    (a + b).div_euclid(2)
}
