//! Ares: ranks candidate moves for a chess position.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use ares_chess::config::EngineConfig;
use ares_chess::play;
use ares_chess::session::GameSession;
use ares_chess::uci::UCI;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Value network weights (JSON); overrides the configuration
    #[arg(short, long)]
    weights: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Speak UCI on stdin/stdout (default)
    Uci,
    /// Play an interactive game in the terminal
    Play {
        /// Number of suggestions shown per move
        #[arg(short = 'n', long)]
        results: Option<usize>,
        /// Default search depth
        #[arg(long)]
        depth: Option<u32>,
        /// Root moves per batch
        #[arg(long)]
        batch_size: Option<usize>,
        /// Worker threads
        #[arg(short, long)]
        threads: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the UCI stream; logs go to stderr.
    let log_level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .target(env_logger::Target::Stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(weights) = cli.weights {
        config.evaluator.weights = Some(weights);
    }

    let evaluator = config
        .build_evaluator()
        .context("failed to load value network")?;

    match cli.mode.unwrap_or(Mode::Uci) {
        Mode::Uci => {
            let mut uci = UCI::new(evaluator, &config);
            uci.run()?;
        }
        Mode::Play {
            results,
            depth,
            batch_size,
            threads,
        } => {
            let mut params = config.rank.clone();
            if let Some(n) = results {
                params.num_results = n;
            }
            if let Some(d) = depth {
                params.depth = d;
            }
            if let Some(n) = batch_size {
                params.batch_size = n;
            }
            if let Some(n) = threads {
                params.parallelism = n;
            }

            println!("Ares {} - interactive game", env!("CARGO_PKG_VERSION"));
            println!("Enter moves in SAN (e.g. e4, Nf3, O-O); 'quit' to exit");
            let mut session = GameSession::from_config(Arc::new(evaluator), &config);
            play::run(&mut session, &params, io::stdin().lock(), io::stdout())?;
        }
    }
    Ok(())
}
