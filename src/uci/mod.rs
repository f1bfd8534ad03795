//! UCI front end
//!
//! Speaks the subset of the Universal Chess Interface a GUI needs to ask
//! for ranked moves, plus a few debugging commands (`d`, `eval`, `history`).

pub mod protocol;

pub use protocol::{UCI, format_score};
