//! Engine components
//!
//! - Position oracle over shakmaty
//! - Batched value-network evaluation
//! - Shared transposition cache
//! - Negamax search and parallel move ranking

pub mod error;
pub mod eval;
pub mod oracle;
pub mod search;
pub mod tt;

pub use error::{EngineError, EngineResult};
pub use eval::{BatchEvaluator, Evaluator, ScoringModel, ValueNetwork};
pub use oracle::{GamePosition, PositionKey};
pub use search::{RankParams, RankedMove, Ranker, Score, Searcher, TerminalScoring};
pub use tt::{CacheMode, TranspositionCache};
