//! Feature encoding for the value network.
//!
//! One slot per square, a1 = 0. A slot holds 0 for an empty square, the
//! role (pawn = 1 .. king = 6) for an opponent piece, and role + 6 for a
//! piece of the side to move. The encoding is always relative to the
//! mover, so the network's output is the mover's score.

use shakmaty::{Chess, Position, Square};

pub const NUM_SQUARES: usize = 64;

/// Distinct non-empty slot values.
pub const NUM_CODES: usize = 12;

pub type Features = [u8; NUM_SQUARES];

pub fn encode(pos: &Chess) -> Features {
    let mut features = [0u8; NUM_SQUARES];
    let board = pos.board();
    let turn = pos.turn();

    for (idx, slot) in features.iter_mut().enumerate() {
        if let Some(piece) = board.piece_at(Square::new(idx as u32)) {
            let mover = if piece.color == turn { 6 } else { 0 };
            *slot = piece.role as u8 + mover;
        }
    }

    features
}

/// Sparse input index for a non-empty slot.
#[inline]
pub fn feature_index(square: usize, code: u8) -> usize {
    square * NUM_CODES + (code as usize - 1)
}
