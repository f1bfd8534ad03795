pub mod config;
pub mod engine;
pub mod play;
pub mod session;
pub mod uci;

pub use config::EngineConfig;
pub use engine::{
    BatchEvaluator, EngineError, EngineResult, Evaluator, GamePosition, RankParams, RankedMove,
    Ranker,
};
pub use session::GameSession;
pub use shakmaty;
pub use uci::UCI;
