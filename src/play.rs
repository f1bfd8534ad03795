//! Interactive terminal game: the engine suggests, the player moves.

use log::warn;
use shakmaty::san::San;
use shakmaty::{Chess, Color, Position};
use std::io::{self, BufRead, Write};
use std::time::Instant;

use crate::engine::{Evaluator, RankParams};
use crate::session::{GameSession, board_diagram};
use crate::uci::format_score;

/// Run until the game ends, the input is exhausted, or the player types `quit`.
pub fn run<E, R, W>(
    session: &mut GameSession<E>,
    params: &RankParams,
    mut input: R,
    mut out: W,
) -> io::Result<()>
where
    E: Evaluator<Chess>,
    R: BufRead,
    W: Write,
{
    loop {
        writeln!(out, "\n{}", board_diagram(session.position()))?;

        if session.position().is_game_over() {
            writeln!(out, "{}", game_over_message(session.position()))?;
            return Ok(());
        }

        let Some(depth) = prompt_depth(&mut input, &mut out, params.depth)? else {
            return Ok(());
        };
        let params = RankParams {
            depth,
            ..params.clone()
        };

        let start = Instant::now();
        match session.suggest(&params) {
            Ok(ranked) => {
                writeln!(out, "Suggestions ({:.2?}):", start.elapsed())?;
                for (i, rm) in ranked.iter().enumerate() {
                    let san = San::from_move(session.position(), &rm.mv);
                    writeln!(out, "{:>3}. {} ({})", i + 1, san, format_score(rm.score))?;
                }
            }
            Err(err) => {
                warn!("ranking failed: {err}");
                writeln!(out, "No suggestions: {err}")?;
            }
        }

        loop {
            write!(out, "Your move: ")?;
            out.flush()?;
            let Some(line) = read_line(&mut input)? else {
                return Ok(());
            };
            if line == "quit" {
                return Ok(());
            }
            match session.play_san(&line) {
                Ok(_) => break,
                Err(_) => writeln!(out, "Invalid move!")?,
            }
        }
    }
}

fn prompt_depth<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    default: u32,
) -> io::Result<Option<u32>> {
    loop {
        write!(out, "Depth [{default}]: ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        if line.is_empty() {
            return Ok(Some(default));
        }
        match line.parse::<u32>() {
            Ok(depth) => return Ok(Some(depth)),
            Err(_) => writeln!(out, "Invalid depth!")?,
        }
    }
}

/// Next trimmed line, or `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub fn game_over_message(pos: &Chess) -> String {
    if pos.is_checkmate() {
        let winner = match pos.turn() {
            Color::White => "Black",
            Color::Black => "White",
        };
        format!("Checkmate! {winner} wins.")
    } else if pos.is_stalemate() {
        "Stalemate!".to_string()
    } else {
        "Draw.".to_string()
    }
}
