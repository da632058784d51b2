//! Query execution and run output.
//!
//! ## Modules
//!
//! - [`types`] - Queries, operators, query parts, hits and ranked lists
//! - [`track`] - Topics and qrels loading
//! - [`searcher`] - Term-at-a-time retrieval over an [`Index`](crate::index::Index)
//! - [`run`] - Run tags, the run writer (with the empty-result fallback) and the run-file reader
//! - [`explanation`] - Per-term score breakdowns for verbose runs
//! - [`batch`] - Concurrent batch orchestrator
//!
//! ## Data flow
//!
//! ```text
//! Track ──► AnalyzedQuery ──► Searcher ──► Vec<Hit> ──► RunWriter ──► <runTag>.txt
//!                                 │
//!                                 └──► ExplanationExtractor ──► VerboseWriter
//! ```

pub mod batch;
pub mod explanation;
pub mod run;
pub mod searcher;
pub mod track;
pub mod types;

pub use batch::{
    BatchConfig, BatchProgress, BatchReport, BatchSearch, CancelFlag, OutputMode, SearchTask,
    TaskFailure, TaskOutcome,
};
pub use explanation::{Explanation, ExplanationExtractor, TermContribution, VerboseWriter};
pub use run::{QueryRecords, RunFile, RunTag, RunWriter};
pub use searcher::Searcher;
pub use track::Track;
pub use types::{AnalyzedQuery, Hit, Operator, Query, QueryPart, QueryTerm, RankedEntry, RankedList};
