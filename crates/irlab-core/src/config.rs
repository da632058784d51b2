//! Production configuration constants and the experiment configuration file.
//!
//! Constants here define the on-disk layout shared by the batch runner and the
//! evaluation tools. [`ExperimentConfig`] is the TOML document describing one
//! experiment matrix (collection, tracks, models, operators).
//!
//! # Example
//!
//! ```toml
//! collection_root = "/data/clueweb09"
//! corpus = "corpus.jsonl"
//! index_tag = "KStem"
//! fallback_doc_id = "clueweb09-en0000-00-00000"
//! models = ["BM25k1.2b0.75", "PL2c1.0", "DPH"]
//! operators = ["OR"]
//! num_hits = 1000
//!
//! [[tracks]]
//! name = "WT11"
//! topics = "topics/topics.web.101-150.txt"
//! qrels = "topics/qrels.web.101-150.txt"
//! ```

use crate::error::ConfigError;
use crate::scoring::ScoringModel;
use crate::search::Operator;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// Layout
// =============================================================================

/// Indexed field searched by every run.
pub const FIELD_CONTENTS: &str = "contents";

/// Folder (under the collection root) holding run files.
pub const RUNS_FOLDER: &str = "runs";

/// Folder (under the collection root) holding verbose diagnostic runs.
pub const VERBOSE_RUNS_FOLDER: &str = "verbose_runs";

/// Folder (under the collection root) holding per-query effectiveness scores.
pub const EVALS_FOLDER: &str = "ltr_evals";

/// File extension of run, verbose and score files.
pub const RUN_FILE_EXTENSION: &str = "txt";

// =============================================================================
// Retrieval
// =============================================================================

/// Default evaluation depth (hits retrieved per query).
pub const DEFAULT_NUM_HITS: usize = 1000;

/// Default effectiveness measure used to locate score files.
pub const DEFAULT_METRIC: &str = "nDCG20";

/// Significance level used for labelling comparisons.
pub const SIGNIFICANCE_ALPHA: f64 = 0.05;

/// Sentinel document returned for empty ClueWeb09 result lists.
pub const CLUEWEB09_NO_DOCUMENT: &str = "clueweb09-en0000-00-00000";

/// Sentinel document returned for empty ClueWeb12 result lists.
pub const CLUEWEB12_NO_DOCUMENT: &str = "clueweb12-000000-00-00000";

/// Sentinel document returned for empty GOV2 result lists.
pub const GOV2_NO_DOCUMENT: &str = "GX000-00-0000000";

/// Empirical normalization factor of the M-measure.
///
/// Not derived analytically; raw values above it produce negative scores.
pub const M_MEASURE_NORMALIZATION: f64 = 16.1892089799257;

/// Returns the default worker count (available parallelism, at least 1).
pub fn default_num_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

// =============================================================================
// Experiment configuration
// =============================================================================

/// One query set of the experiment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackConfig {
    /// Track name, used as a directory name (e.g. `WT11`)
    pub name: String,
    /// Topics file (`<id>:<query text>` per line)
    pub topics: PathBuf,
    /// Optional TREC qrels file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qrels: Option<PathBuf>,
}

/// Experiment matrix loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Collection root; relative paths below are resolved against it
    pub collection_root: PathBuf,

    /// Corpus file (JSONL, one `{"doc_id", "text"}` object per line)
    pub corpus: PathBuf,

    /// Index tag, used in run tags and output directories
    #[serde(default = "default_index_tag")]
    pub index_tag: String,

    /// Sentinel document written when a query returns no hits
    #[serde(default = "default_fallback_doc_id")]
    pub fallback_doc_id: String,

    /// Folder for run files
    #[serde(default = "default_runs_folder")]
    pub runs_folder: String,

    /// Query sets
    pub tracks: Vec<TrackConfig>,

    /// Ranking models by run-tag name
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Default conjunction operators to run
    #[serde(default = "default_operators")]
    pub operators: Vec<Operator>,

    /// Query parts (0 = whole query)
    #[serde(default = "default_parts")]
    pub parts: Vec<usize>,

    /// Hits retrieved per query
    #[serde(default = "default_num_hits")]
    pub num_hits: usize,

    /// Worker threads
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

fn default_index_tag() -> String {
    "Simple".to_string()
}

fn default_fallback_doc_id() -> String {
    CLUEWEB09_NO_DOCUMENT.to_string()
}

fn default_runs_folder() -> String {
    RUNS_FOLDER.to_string()
}

fn default_models() -> Vec<String> {
    vec!["BM25k1.2b0.75".to_string()]
}

fn default_operators() -> Vec<Operator> {
    vec![Operator::Or]
}

fn default_parts() -> Vec<usize> {
    vec![0]
}

fn default_num_hits() -> usize {
    DEFAULT_NUM_HITS
}

impl ExperimentConfig {
    /// Loads and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&content, path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a config document without validating paths.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            line: 0,
            message: e.to_string(),
        })
    }

    /// Resolves a path relative to the collection root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.collection_root.join(path)
        }
    }

    /// Parses the configured model names.
    pub fn scoring_models(&self) -> Result<Vec<ScoringModel>, ConfigError> {
        self.models.iter().map(|m| m.parse()).collect()
    }

    /// Checks value ranges and that every referenced input exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_hits == 0 {
            return Err(ConfigError::InvalidValue {
                field: "num_hits",
                message: "must be at least 1".to_string(),
            });
        }
        if self.num_threads == 0 {
            return Err(ConfigError::InvalidValue {
                field: "num_threads",
                message: "must be at least 1".to_string(),
            });
        }
        if self.tracks.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "tracks",
                message: "at least one track is required".to_string(),
            });
        }
        if self.operators.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "operators",
                message: "at least one operator is required".to_string(),
            });
        }
        if self.fallback_doc_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "fallback_doc_id",
                message: "must not be empty".to_string(),
            });
        }
        self.scoring_models()?;

        if !self.collection_root.is_dir() {
            return Err(ConfigError::MissingPath(self.collection_root.clone()));
        }
        let corpus = self.resolve(&self.corpus);
        if !corpus.is_file() {
            return Err(ConfigError::MissingPath(corpus));
        }
        for track in &self.tracks {
            let topics = self.resolve(&track.topics);
            if !topics.is_file() {
                return Err(ConfigError::MissingPath(topics));
            }
            if let Some(qrels) = &track.qrels {
                let qrels = self.resolve(qrels);
                if !qrels.is_file() {
                    return Err(ConfigError::MissingPath(qrels));
                }
            }
        }
        Ok(())
    }
}
