//! Position oracle: the narrow view of the game rules the search consumes.
//!
//! The search never inspects a board directly. Everything it needs
//! (move generation, successor derivation, classification, cache keys)
//! goes through [`GamePosition`], which is implemented for
//! `shakmaty::Chess` here and for synthetic trees in the tests.

use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position, Role};
use std::fmt::Debug;
use std::hash::Hash;

use super::error::{EngineError, EngineResult};

pub trait GamePosition: Clone + Send + Sync {
    type Move: Clone + PartialEq + Debug + Send + Sync;
    type Key: Clone + Eq + Hash + Debug + Send + Sync;

    /// Legal moves in generation order.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Successor position; the receiver is left untouched.
    fn apply(&self, mv: &Self::Move) -> EngineResult<Self>;

    fn is_capture(&self, mv: &Self::Move) -> bool;

    fn is_castling(&self, mv: &Self::Move) -> bool;

    /// Checkmate, stalemate, or any other finished game.
    fn is_terminal(&self) -> bool;

    fn is_checkmate(&self) -> bool;

    /// Identical game state must give identical keys; distinct states never share one.
    fn canonical_key(&self) -> Self::Key;

    /// Ordering hint among captures, higher first.
    fn order_hint(&self, _mv: &Self::Move) -> i32 {
        0
    }
}

/// Exact chess position key: piece placement, side to move, castling
/// rights and the legal en passant square. Move counters are left out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PositionKey {
    placement: [u64; 8],
    castling: u64,
    ep_square: Option<u8>,
    white_to_move: bool,
}

impl PositionKey {
    pub fn of(pos: &Chess) -> Self {
        let board = pos.board();
        PositionKey {
            placement: [
                board.white().0,
                board.black().0,
                board.pawns().0,
                board.knights().0,
                board.bishops().0,
                board.rooks().0,
                board.queens().0,
                board.kings().0,
            ],
            castling: pos.castles().castling_rights().0,
            ep_square: pos.ep_square(EnPassantMode::Legal).map(|sq| sq as u8),
            white_to_move: pos.turn() == Color::White,
        }
    }
}

impl GamePosition for Chess {
    type Move = Move;
    type Key = PositionKey;

    fn legal_moves(&self) -> Vec<Move> {
        Position::legal_moves(self).into_iter().collect()
    }

    fn apply(&self, mv: &Move) -> EngineResult<Chess> {
        self.clone()
            .play(mv)
            .map_err(|_| EngineError::InvalidMove(mv.to_uci(CastlingMode::Standard).to_string()))
    }

    fn is_capture(&self, mv: &Move) -> bool {
        mv.is_capture()
    }

    fn is_castling(&self, mv: &Move) -> bool {
        mv.is_castle()
    }

    fn is_terminal(&self) -> bool {
        Position::is_game_over(self)
    }

    fn is_checkmate(&self) -> bool {
        Position::is_checkmate(self)
    }

    fn canonical_key(&self) -> PositionKey {
        PositionKey::of(self)
    }

    fn order_hint(&self, mv: &Move) -> i32 {
        mvv_lva(mv)
    }
}

/// Most valuable victim, least valuable attacker.
pub fn mvv_lva(mv: &Move) -> i32 {
    let victim = mv.capture().map(role_value).unwrap_or(0);
    let attacker = role_value(mv.role());
    victim * 10 - attacker
}

pub fn role_value(role: Role) -> i32 {
    match role {
        Role::Pawn => 100,
        Role::Knight => 320,
        Role::Bishop => 330,
        Role::Rook => 500,
        Role::Queen => 900,
        Role::King => 20000,
    }
}
