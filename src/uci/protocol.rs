use log::{debug, warn};
use shakmaty::{CastlingMode, Chess, Color, Move, Position, fen::Fen};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use vampirc_uci::{UciMessage, parser};

use crate::config::EngineConfig;
use crate::engine::{
    BatchEvaluator, CacheMode, EngineResult, RankParams, RankedMove, Score,
    TerminalScoring,
};
use crate::session::{GameSession, board_diagram, move_to_uci};

const MAX_MULTI_PV: usize = 64;
const MAX_DEPTH: u32 = 16;
const MAX_THREADS: usize = 256;

pub struct UCI {
    session: GameSession<BatchEvaluator>,
    /// Defaults for `go`; `go depth N` / `go multipv N` override per call.
    params: RankParams,
}

impl UCI {
    pub fn new(evaluator: BatchEvaluator, config: &EngineConfig) -> Self {
        let evaluator = Arc::new(evaluator);
        UCI {
            session: GameSession::from_config(evaluator, config),
            params: config.rank.clone(),
        }
    }

    pub fn session(&self) -> &GameSession<BatchEvaluator> {
        &self.session
    }

    pub fn params(&self) -> &RankParams {
        &self.params
    }

    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;
            if !self.handle_line(&line, &mut stdout)? {
                break;
            }
            stdout.flush()?;
        }
        Ok(())
    }

    /// Handle one command line. Returns `false` on `quit`.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(true);
        }

        match parser::parse_one(line) {
            UciMessage::Uci => self.cmd_uci(out)?,
            UciMessage::IsReady => writeln!(out, "readyok")?,
            UciMessage::SetOption { name, value } => {
                self.apply_setoption(name.trim(), value.as_deref());
            }
            UciMessage::UciNewGame => self.session.new_game(),
            UciMessage::Position {
                startpos,
                fen,
                moves,
            } => {
                let fen_str = fen.as_ref().map(|f| f.as_str());
                let move_strs: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
                let refs: Vec<&str> = move_strs.iter().map(String::as_str).collect();
                self.apply_position(startpos, fen_str, &refs);
            }
            UciMessage::Go { search_control, .. } => {
                let depth = search_control.as_ref().and_then(|sc| sc.depth).map(u32::from);
                let params = self.go_params(line, depth);
                self.do_go(&params, out)?;
            }
            // Ranking runs to completion; there is nothing to interrupt.
            UciMessage::Stop => {}
            UciMessage::Quit => return Ok(false),
            UciMessage::Unknown(ref s, _) => {
                let parts: Vec<&str> = s.split_whitespace().collect();
                match parts.first().copied() {
                    Some("d") | Some("display") => self.cmd_display(out)?,
                    Some("eval") => self.cmd_eval(out)?,
                    Some("history") => self.cmd_history(out)?,
                    // vampirc rejects `go ... multipv N`
                    Some("go") => {
                        let params = self.go_params(line, None);
                        self.do_go(&params, out)?;
                    }
                    _ => debug!("ignoring unknown command: {s}"),
                }
            }
            _ => {}
        }
        Ok(true)
    }

    fn cmd_uci(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "id name Ares {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "id author Ares developers")?;
        writeln!(out)?;
        writeln!(
            out,
            "option name MultiPV type spin default {} min 1 max {MAX_MULTI_PV}",
            self.params.num_results
        )?;
        writeln!(
            out,
            "option name Depth type spin default {} min 0 max {MAX_DEPTH}",
            self.params.depth
        )?;
        writeln!(
            out,
            "option name BatchSize type spin default {} min 1 max 256",
            self.params.batch_size
        )?;
        writeln!(
            out,
            "option name Threads type spin default {} min 1 max {MAX_THREADS}",
            self.params.parallelism
        )?;
        writeln!(
            out,
            "option name EvalBatchSize type spin default {} min 1 max 4096",
            self.session.ranker().evaluator().batch_size()
        )?;
        writeln!(
            out,
            "option name CacheMode type combo default depth-tagged var depth-tagged var position-only"
        )?;
        writeln!(
            out,
            "option name TerminalScoring type combo default evaluator var evaluator var canonical"
        )?;
        writeln!(out, "option name Clear Cache type button")?;
        writeln!(out, "uciok")
    }

    /// Apply setoption by name and value.
    pub fn apply_setoption(&mut self, name: &str, value: Option<&str>) {
        let opt = name.to_lowercase().replace([' ', '_'], "");
        let value = value.unwrap_or("").trim();
        match opt.as_str() {
            "multipv" => {
                if let Ok(n) = value.parse::<usize>() {
                    self.params.num_results = n.clamp(1, MAX_MULTI_PV);
                }
            }
            "depth" => {
                if let Ok(d) = value.parse::<u32>() {
                    self.params.depth = d.min(MAX_DEPTH);
                }
            }
            "batchsize" => {
                if let Ok(n) = value.parse::<usize>() {
                    self.params.batch_size = n.max(1);
                }
            }
            "threads" => {
                if let Ok(n) = value.parse::<usize>() {
                    self.params.parallelism = n.clamp(1, MAX_THREADS);
                }
            }
            "evalbatchsize" => {
                if let Ok(n) = value.parse::<usize>() {
                    let evaluator = self.session.ranker().evaluator().with_batch_size(n);
                    self.session.set_evaluator(Arc::new(evaluator));
                }
            }
            "cachemode" => match value.to_lowercase().as_str() {
                "depth-tagged" => self.session.set_cache_mode(CacheMode::DepthTagged),
                "position-only" => self.session.set_cache_mode(CacheMode::PositionOnly),
                other => warn!("unknown CacheMode value: {other}"),
            },
            "terminalscoring" => match value.to_lowercase().as_str() {
                "evaluator" => self.session.set_terminal_scoring(TerminalScoring::Evaluator),
                "canonical" => self.session.set_terminal_scoring(TerminalScoring::Canonical),
                other => warn!("unknown TerminalScoring value: {other}"),
            },
            "clearcache" => self.session.cache().clear(),
            _ => debug!("ignoring unknown option: {name}"),
        }
    }

    fn apply_position(&mut self, startpos: bool, fen: Option<&str>, move_strs: &[&str]) {
        if startpos {
            self.session.set_position(Chess::default());
        } else if let Some(fen_str) = fen {
            match parse_fen(fen_str) {
                Some(pos) => self.session.set_position(pos),
                None => {
                    warn!("rejecting unparsable FEN: {fen_str}");
                    return;
                }
            }
        }

        for &s in move_strs {
            if let Err(err) = self.session.play_uci(s) {
                warn!("position command stopped at {s}: {err}");
                break;
            }
        }
    }

    /// Stored defaults overridden by the `depth` and `multipv` of a `go` line.
    fn go_params(&self, line: &str, depth: Option<u32>) -> RankParams {
        let mut params = self.params.clone();
        if let Some(d) = depth.or_else(|| parse_number_after(line, "depth")) {
            params.depth = d.min(MAX_DEPTH);
        }
        if let Some(n) = parse_number_after::<usize>(line, "multipv") {
            params.num_results = n.clamp(1, MAX_MULTI_PV);
        }
        params
    }

    fn do_go(&mut self, params: &RankParams, out: &mut impl Write) -> io::Result<()> {
        match self.session.suggest(params) {
            Ok(ranked) => {
                report_ranking(params.depth, &ranked, out)?;
                match ranked.first() {
                    Some(best) => writeln!(out, "bestmove {}", move_to_uci(&best.mv)),
                    None => writeln!(out, "bestmove 0000"),
                }
            }
            Err(err) => {
                warn!("search failed: {err}");
                writeln!(out, "info string search failed: {err}")?;
                writeln!(out, "bestmove 0000")
            }
        }
    }

    fn cmd_display(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "\n{}", board_diagram(self.session.position()))
    }

    fn cmd_eval(&self, out: &mut impl Write) -> io::Result<()> {
        let score: EngineResult<Score> = self.session.static_eval();
        match score {
            Ok(score) => {
                writeln!(out, "Evaluation: {} cp", score)?;
                let side = match self.session.position().turn() {
                    Color::White => "White",
                    Color::Black => "Black",
                };
                writeln!(out, "(Positive = {side} advantage)")
            }
            Err(err) => writeln!(out, "Evaluation unavailable: {err}"),
        }
    }

    fn cmd_history(&self, out: &mut impl Write) -> io::Result<()> {
        for (ply, score) in self.session.history().smoothed() {
            writeln!(out, "ply {ply:.1} score {score:.1}")?;
        }
        Ok(())
    }
}

fn parse_fen(fen: &str) -> Option<Chess> {
    let f: Fen = fen.parse().ok()?;
    f.into_position(CastlingMode::Standard).ok()
}

/// UCI score field. Always centipawns: ranked scores carry no mate
/// distance, and refinement averages a mate bound with a shallower score.
pub fn format_score(score: Score) -> String {
    format!("cp {score}")
}

fn report_ranking(depth: u32, ranked: &[RankedMove<Move>], out: &mut impl Write) -> io::Result<()> {
    for (i, rm) in ranked.iter().enumerate() {
        writeln!(
            out,
            "info depth {} multipv {} score {} pv {}",
            depth,
            i + 1,
            format_score(rm.score),
            move_to_uci(&rm.mv)
        )?;
    }
    Ok(())
}

/// First number following `keyword` in `line`, if any.
fn parse_number_after<T: std::str::FromStr>(line: &str, keyword: &str) -> Option<T> {
    let line = line.to_lowercase();
    let mut rest = line.as_str();
    while let Some(idx) = rest.find(keyword) {
        rest = rest[idx + keyword.len()..].trim_start();
        if let Some(n) = rest.split_whitespace().next().and_then(|s| s.parse().ok()) {
            return Some(n);
        }
    }
    None
}
