//! Game session: the current game, its transposition cache, and the
//! evaluation history shown to the player.
//!
//! The cache lives exactly as long as one game. It is shared by every
//! ranking call of the session and cleared by [`GameSession::new_game`].

use log::{debug, info};
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, File, Move, Position, Rank, Square};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::engine::{
    CacheMode, EngineError, EngineResult, Evaluator, GamePosition, PositionKey, RankParams,
    RankedMove, Ranker, Score, TerminalScoring, TranspositionCache,
};

/// Scores over the course of a game, from White's point of view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvalHistory {
    points: Vec<(u32, Score)>,
}

impl EvalHistory {
    pub fn record(&mut self, ply: u32, score: Score) {
        self.points.push((ply, score));
    }

    pub fn points(&self) -> &[(u32, Score)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Midpoints of adjacent points once there are at least two, otherwise the raw points.
    pub fn smoothed(&self) -> Vec<(f32, f32)> {
        if self.points.len() < 2 {
            return self
                .points
                .iter()
                .map(|&(ply, score)| (ply as f32, score as f32))
                .collect();
        }
        self.points
            .windows(2)
            .map(|pair| {
                let (p0, s0) = pair[0];
                let (p1, s1) = pair[1];
                ((p0 + p1) as f32 / 2.0, (s0 + s1) as f32 / 2.0)
            })
            .collect()
    }
}

pub struct GameSession<E> {
    position: Chess,
    played: Vec<Move>,
    ranker: Ranker<Chess, E>,
    history: EvalHistory,
}

impl<E: Evaluator<Chess>> GameSession<E> {
    pub fn new(evaluator: Arc<E>, cache_mode: CacheMode, terminal: TerminalScoring) -> Self {
        let cache = Arc::new(TranspositionCache::new(cache_mode));
        GameSession {
            position: Chess::default(),
            played: Vec::new(),
            ranker: Ranker::new(evaluator, cache).with_terminal_scoring(terminal),
            history: EvalHistory::default(),
        }
    }

    pub fn from_config(evaluator: Arc<E>, config: &EngineConfig) -> Self {
        Self::new(evaluator, config.cache.mode, config.search.terminal_scoring)
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn played(&self) -> &[Move] {
        &self.played
    }

    pub fn history(&self) -> &EvalHistory {
        &self.history
    }

    pub fn ranker(&self) -> &Ranker<Chess, E> {
        &self.ranker
    }

    pub fn cache(&self) -> &TranspositionCache<PositionKey> {
        self.ranker.cache()
    }

    /// Back to the initial position with an empty cache and history.
    pub fn new_game(&mut self) {
        self.position = Chess::default();
        self.played.clear();
        self.history.clear();
        self.ranker.cache().clear();
        info!("new game");
    }

    /// Replace the cache with an empty one keyed the new way.
    pub fn set_cache_mode(&mut self, mode: CacheMode) {
        if self.ranker.cache().mode() == mode {
            return;
        }
        let evaluator = Arc::clone(self.ranker.evaluator());
        let terminal = self.ranker.terminal_scoring();
        self.ranker = Ranker::new(evaluator, Arc::new(TranspositionCache::new(mode)))
            .with_terminal_scoring(terminal);
        debug!("cache mode set to {mode:?}");
    }

    /// Swap the evaluator; the cache is kept.
    pub fn set_evaluator(&mut self, evaluator: Arc<E>) {
        let cache = Arc::clone(self.ranker.cache());
        let terminal = self.ranker.terminal_scoring();
        self.ranker = Ranker::new(evaluator, cache).with_terminal_scoring(terminal);
    }

    pub fn set_terminal_scoring(&mut self, terminal: TerminalScoring) {
        self.ranker.set_terminal_scoring(terminal);
    }

    /// Jump to `pos` within the same game; the cache is kept.
    pub fn set_position(&mut self, pos: Chess) {
        self.position = pos;
        self.played.clear();
    }

    pub fn play(&mut self, mv: &Move) -> EngineResult<()> {
        self.position = GamePosition::apply(&self.position, mv)?;
        self.played.push(mv.clone());
        Ok(())
    }

    pub fn play_uci(&mut self, text: &str) -> EngineResult<Move> {
        let invalid = || EngineError::InvalidMove(text.to_string());
        let uci: UciMove = text.parse().map_err(|_| invalid())?;
        let mv = uci.to_move(&self.position).map_err(|_| invalid())?;
        self.play(&mv)?;
        Ok(mv)
    }

    pub fn play_san(&mut self, text: &str) -> EngineResult<Move> {
        let invalid = || EngineError::InvalidMove(text.to_string());
        let san: SanPlus = text.parse().map_err(|_| invalid())?;
        let mv = san.san.to_move(&self.position).map_err(|_| invalid())?;
        self.play(&mv)?;
        Ok(mv)
    }

    /// Rank the current position and record the best score in the history.
    pub fn suggest(&mut self, params: &RankParams) -> EngineResult<Vec<RankedMove<Move>>> {
        let ranked = self.ranker.rank(&self.position, params)?;
        if let Some(best) = ranked.first() {
            let white_score = match self.position.turn() {
                Color::White => best.score,
                Color::Black => -best.score,
            };
            self.history.record(self.played.len() as u32, white_score);
        }
        Ok(ranked)
    }

    /// Evaluator score of the current position for the side to move.
    pub fn static_eval(&self) -> EngineResult<Score> {
        let scores = self
            .ranker
            .evaluator()
            .evaluate(std::slice::from_ref(&self.position))?;
        scores.first().copied().ok_or(EngineError::EvaluatorOutput {
            expected: 1,
            actual: 0,
        })
    }
}

pub fn move_to_uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

/// Text diagram, rank 8 at the top, White pieces in upper case.
pub fn board_diagram(pos: &Chess) -> String {
    let board = pos.board();
    let mut out = String::new();
    for rank in (0..8).rev() {
        out.push_str(&format!("{} ", rank + 1));
        for file in 0..8 {
            let sq = Square::from_coords(File::new(file), Rank::new(rank));
            let c = board.piece_at(sq).map(|p| p.char()).unwrap_or('.');
            out.push(c);
            out.push(' ');
        }
        out.push('\n');
    }
    out.push_str("  a b c d e f g h\n");
    out
}
