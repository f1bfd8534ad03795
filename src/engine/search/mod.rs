//! Search: negamax with alpha-beta, root move ordering, batched ranking.

mod alphabeta;
mod ordering;
mod ranker;
mod searcher;
mod types;

pub use ranker::Ranker;
pub use searcher::Searcher;
pub use types::{
    DRAW_SCORE, INFINITY, MATE_SCORE, MoveKind, RankParams, RankedMove, Score, SearchStats,
    TerminalScoring,
};
