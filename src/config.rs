//! Engine configuration
//!
//! Every field has a default, so an empty TOML file (or none at all) is a
//! valid configuration. Example:
//!
//! ```toml
//! [rank]
//! num_results = 3
//! batch_size = 20
//! depth = 2
//! parallelism = 4
//!
//! [evaluator]
//! batch_size = 32
//! weights = "models/value.json"
//!
//! [cache]
//! mode = "depth-tagged"
//!
//! [search]
//! terminal_scoring = "evaluator"
//! ```

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::eval::DEFAULT_EVAL_BATCH_SIZE;
use crate::engine::{
    BatchEvaluator, CacheMode, EngineResult, RankParams, TerminalScoring, ValueNetwork,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rank: RankParams,
    pub evaluator: EvaluatorConfig,
    pub cache: CacheConfig,
    pub search: SearchConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Positions per evaluator sub-batch.
    pub batch_size: usize,
    /// JSON weights file; the built-in network is used when unset.
    pub weights: Option<PathBuf>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_EVAL_BATCH_SIZE,
            weights: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub mode: CacheMode,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub terminal_scoring: TerminalScoring,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Evaluator over the configured weights, or the built-in network.
    pub fn build_evaluator(&self) -> EngineResult<BatchEvaluator> {
        let network = match &self.evaluator.weights {
            Some(path) => {
                info!("loading value network weights from {}", path.display());
                ValueNetwork::from_json_file(path)?
            }
            None => ValueNetwork::default(),
        };
        Ok(BatchEvaluator::new(network, self.evaluator.batch_size))
    }
}
