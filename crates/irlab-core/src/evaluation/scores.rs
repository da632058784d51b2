//! Per-query effectiveness scores produced by an external evaluation tool.
//!
//! One file per (model, variant, metric), located at
//! `<collection_root>/ltr_evals/<tag>/<model>.<variant>.<metric>.txt`.
//! Lines are comma-separated with the query id in the second column and the
//! score in the third. Header lines (`runid...`) and the aggregate row
//! (`amean`) are skipped.

use crate::config::EVALS_FOLDER;
use crate::error::EvaluationError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path of the score file for one combination.
pub fn score_file_path(
    collection_root: &Path,
    tag: &str,
    model: &str,
    variant: &str,
    metric: &str,
) -> PathBuf {
    collection_root
        .join(EVALS_FOLDER)
        .join(tag)
        .join(format!("{model}.{variant}.{metric}.txt"))
}

/// Parses the contents of a score file into `query id -> score`.
///
/// `path` is only used for error messages.
pub fn parse_scores(content: &str, path: &Path) -> Result<BTreeMap<u32, f64>, EvaluationError> {
    let mut scores = BTreeMap::new();

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("runid") || line.contains("amean") {
            continue;
        }

        let malformed = |message: String| EvaluationError::Malformed {
            path: path.to_path_buf(),
            line: i + 1,
            message,
        };

        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < 3 {
            return Err(malformed(format!(
                "expected at least 3 comma-separated columns, found {}",
                parts.len()
            )));
        }

        let query_id: u32 = parts[1]
            .trim()
            .parse()
            .map_err(|_| malformed(format!("bad query id {:?}", parts[1])))?;
        let score: f64 = parts[2]
            .trim()
            .parse()
            .map_err(|_| malformed(format!("bad score {:?}", parts[2])))?;

        if scores.insert(query_id, score).is_some() {
            return Err(malformed(format!("duplicate query id {query_id}")));
        }
    }

    Ok(scores)
}

/// Reads one score file. A missing file is an error, never an empty table.
pub fn read_scores(path: &Path) -> Result<BTreeMap<u32, f64>, EvaluationError> {
    if !path.is_file() {
        return Err(EvaluationError::MissingScoreFile(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|e| EvaluationError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_scores(&content, path)
}

/// Scores for every loaded (model, variant) combination of one metric.
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    metric: String,
    scores: BTreeMap<(String, String), BTreeMap<u32, f64>>,
}

impl ScoreTable {
    /// Empty table for `metric`.
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            scores: BTreeMap::new(),
        }
    }

    /// Loads every `models x variants` combination for `metric`.
    ///
    /// Fails on the first missing or malformed file.
    pub fn load(
        collection_root: &Path,
        tag: &str,
        metric: &str,
        models: &[String],
        variants: &[String],
    ) -> Result<Self, EvaluationError> {
        let mut table = Self::new(metric);
        for model in models {
            for variant in variants {
                let path = score_file_path(collection_root, tag, model, variant, metric);
                let scores = read_scores(&path)?;
                debug!(
                    %model,
                    %variant,
                    queries = scores.len(),
                    path = %path.display(),
                    "Loaded scores"
                );
                table.insert(model.clone(), variant.clone(), scores);
            }
        }
        Ok(table)
    }

    /// Adds or replaces the scores of one combination.
    pub fn insert(
        &mut self,
        model: impl Into<String>,
        variant: impl Into<String>,
        scores: BTreeMap<u32, f64>,
    ) {
        self.scores.insert((model.into(), variant.into()), scores);
    }

    /// Metric name.
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Scores of one combination.
    pub fn get(&self, model: &str, variant: &str) -> Result<&BTreeMap<u32, f64>, EvaluationError> {
        self.scores
            .get(&(model.to_string(), variant.to_string()))
            .ok_or_else(|| EvaluationError::UnknownCombination {
                model: model.to_string(),
                variant: variant.to_string(),
            })
    }

    /// Number of loaded combinations.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
