//! Error types for irlab-core.
//!
//! Configuration problems are fatal and surface before any search task is
//! scheduled. Task-level failures are collected by the batch orchestrator and
//! reported together once every task has had its chance to run.

use crate::search::TaskFailure;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration, topics, judgments or corpora.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A required file or directory does not exist
    #[error("Path does not exist or is not readable: {}", .0.display())]
    MissingPath(PathBuf),
    /// Reading a file failed
    #[error("Failed to read {}: {message}", path.display())]
    Read {
        /// File being read
        path: PathBuf,
        /// Underlying I/O message
        message: String,
    },
    /// A file could not be parsed
    #[error("Failed to parse {}: line {line}: {message}", path.display())]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// 1-based line number (0 when the whole document is invalid)
        line: usize,
        /// Parser message
        message: String,
    },
    /// Model name does not match any known ranking model
    #[error("Unknown scoring model: {0}")]
    UnknownModel(String),
    /// Operator name is neither AND nor OR
    #[error("Unknown boolean operator: {0}")]
    UnknownOperator(String),
    /// A configuration value is out of range
    #[error("Invalid configuration value for {field}: {message}")]
    InvalidValue {
        /// Configuration key
        field: &'static str,
        /// Why the value was rejected
        message: String,
    },
}

/// Errors that can occur while executing one search task.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// Writing the run or verbose file failed
    #[error("I/O error: {0}")]
    Io(String),
    /// Two components disagree about data that must match
    #[error("Data consistency check failed: {0}")]
    DataConsistency(String),
    /// The task observed the cancellation flag
    #[error("Search task cancelled")]
    Cancelled,
    /// A count does not fit the index's 32-bit statistics
    #[error("{what} {value} exceeds the 32-bit index limit")]
    IndexOverflow {
        /// Which statistic overflowed
        what: &'static str,
        /// The offending count
        value: usize,
    },
}

impl From<std::io::Error> for SearchError {
    fn from(err: std::io::Error) -> Self {
        SearchError::Io(err.to_string())
    }
}

/// Outcome errors of a whole batch run.
#[derive(Debug, Clone, Error)]
pub enum BatchError {
    /// Invalid configuration detected before scheduling
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Output directories could not be prepared or workers could not be spawned
    #[error("I/O error: {0}")]
    Io(String),
    /// The run was cancelled from outside
    #[error("Interrupted after {completed} of {submitted} search tasks")]
    Interrupted {
        /// Number of tasks scheduled
        submitted: usize,
        /// Number of tasks that completed successfully
        completed: usize,
    },
    /// Some tasks did not complete
    #[error(
        "Total task count = {submitted} is not equal to completed task count = {completed} ({} failed)",
        failures.len()
    )]
    Incomplete {
        /// Number of tasks scheduled
        submitted: usize,
        /// Number of tasks that completed successfully
        completed: usize,
        /// Identity and cause of every failed task
        failures: Vec<TaskFailure>,
    },
}

/// Errors raised while reading a run file back.
#[derive(Debug, Clone, Error)]
pub enum RunFileError {
    /// The file could not be read
    #[error("Failed to read run file {}: {message}", path.display())]
    Read {
        /// Run file path
        path: PathBuf,
        /// Underlying I/O message
        message: String,
    },
    /// A line does not follow the six-column run format
    #[error("Malformed run file line {line}: {message}")]
    Malformed {
        /// 1-based line number
        line: usize,
        /// What was wrong with it
        message: String,
    },
}

/// Fatal consistency failures while comparing two ranked lists.
#[derive(Debug, Clone, Error)]
pub enum ComparisonError {
    /// After restricting both lists to common documents their sizes differ
    #[error("List sizes are not equal after intersection: reference {reference}, alternate {alternate}")]
    SizeMismatch {
        /// Restricted reference size
        reference: usize,
        /// Restricted alternate size
        alternate: usize,
    },
    /// A metric name that matches no known list metric
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}

/// Errors raised by the significance evaluator.
#[derive(Debug, Clone, Error)]
pub enum EvaluationError {
    /// The score file for a requested model/variant combination is missing
    #[error("{} does not exist or is not a regular file", .0.display())]
    MissingScoreFile(PathBuf),
    /// The score file could not be read
    #[error("Failed to read {}: {message}", path.display())]
    Read {
        /// Score file path
        path: PathBuf,
        /// Underlying I/O message
        message: String,
    },
    /// A score line could not be parsed
    #[error("Malformed score line {line} in {}: {message}", path.display())]
    Malformed {
        /// Score file path
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What was wrong with it
        message: String,
    },
    /// Model/variant combination was never loaded into the table
    #[error("No scores loaded for model {model} variant {variant}")]
    UnknownCombination {
        /// Model short name
        model: String,
        /// Variant name
        variant: String,
    },
    /// Not enough paired observations to run a paired test
    #[error("Only {pairs} paired queries for {model} {baseline} vs {variant}; need at least 2")]
    InsufficientPairs {
        /// Model short name
        model: String,
        /// Baseline variant
        baseline: String,
        /// Alternate variant
        variant: String,
        /// Number of queries present on both sides
        pairs: usize,
    },
}
