//! Concurrent batch search.
//!
//! Fans a `tracks × models × operators × parts` workload out over a fixed
//! pool of worker threads. Every task writes its own run file, so tasks never
//! contend for output; the index is the only shared resource and is read-only.
//!
//! # Failure policy
//!
//! - Invalid configuration is rejected before any task is scheduled.
//! - A failing (or panicking) task is logged with its run tag and track and
//!   does not stop its siblings.
//! - Once every worker has been joined, the number of completed tasks must
//!   equal the number submitted. Any difference is returned as
//!   [`BatchError::Incomplete`] (or [`BatchError::Interrupted`] after
//!   cancellation) carrying the identity of each failed task.
//!
//! # Example
//!
//! ```ignore
//! let batch = BatchSearch::new(index, Arc::new(SimpleAnalyzer), config)?;
//! let tasks = batch.plan(&tracks, &models, &[Operator::Or], &[QueryPart::ALL], OutputMode::Run);
//! let report = batch.run(&tasks, &CancelFlag::new(), &|p| println!("{}/{}", p.completed, p.total))?;
//! ```

use super::explanation::{ExplanationExtractor, VerboseWriter};
use super::run::{QueryRecords, RunTag, RunWriter};
use super::searcher::Searcher;
use super::track::Track;
use super::types::{AnalyzedQuery, Operator, Query, QueryPart, RankedEntry};
use crate::config::{self, ExperimentConfig, FIELD_CONTENTS};
use crate::error::{BatchError, ConfigError, SearchError};
use crate::index::{Analyzer, Index};
use crate::scoring::ScoringModel;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::BufWriter;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

// =============================================================================
// Configuration and task types
// =============================================================================

/// Settings shared by every task of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Collection root; outputs go below it
    pub collection_root: PathBuf,
    /// Folder for run files (verbose runs always use `verbose_runs`)
    pub runs_folder: String,
    /// Index tag, part of run tags and output paths
    pub index_tag: String,
    /// Sentinel document for empty result lists
    pub fallback_doc_id: String,
    /// Hits retrieved per query
    pub num_hits: usize,
    /// Worker threads
    pub num_threads: usize,
}

impl BatchConfig {
    /// Takes the batch settings from an experiment config.
    pub fn from_experiment(config: &ExperimentConfig) -> Self {
        Self {
            collection_root: config.collection_root.clone(),
            runs_folder: config.runs_folder.clone(),
            index_tag: config.index_tag.clone(),
            fallback_doc_id: config.fallback_doc_id.clone(),
            num_hits: config.num_hits,
            num_threads: config.num_threads,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
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
        if self.fallback_doc_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "fallback_doc_id",
                message: "must not be empty".to_string(),
            });
        }
        if !self.collection_root.is_dir() {
            return Err(ConfigError::MissingPath(self.collection_root.clone()));
        }
        Ok(())
    }
}

/// What a task writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OutputMode {
    /// TREC run file
    Run,
    /// Verbose per-term diagnostic file
    Verbose,
}

/// One (track, model, operator, part) unit of work.
#[derive(Debug, Clone)]
pub struct SearchTask {
    /// Query set
    pub track: Arc<Track>,
    /// Ranking model
    pub model: ScoringModel,
    /// Default conjunction
    pub operator: Operator,
    /// Query part
    pub part: QueryPart,
    /// Output kind
    pub mode: OutputMode,
}

impl SearchTask {
    /// Run tag of this task for `index_tag`.
    pub fn run_tag(&self, index_tag: &str) -> RunTag {
        RunTag::new(&self.model, FIELD_CONTENTS, index_tag, self.operator, self.part)
    }
}

/// Identity and cause of a task that did not complete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskFailure {
    /// Run tag of the task
    pub run_tag: String,
    /// Track name
    pub track: String,
    /// Error or panic message
    pub message: String,
}

/// Summary of one completed task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskOutcome {
    /// Run tag
    pub run_tag: String,
    /// Track name
    pub track: String,
    /// Output file
    pub path: PathBuf,
    /// Queries searched
    pub queries: usize,
    /// Records written (fallback lines included)
    pub records: usize,
    /// Queries answered with the fallback document
    pub fallbacks: usize,
    /// Queries without a token for the requested part
    pub skipped: usize,
}

/// Progress snapshot passed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    /// Tasks submitted
    pub total: usize,
    /// Tasks completed successfully
    pub completed: usize,
    /// Tasks that failed or were cancelled
    pub failed: usize,
}

/// Result of a fully successful batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// Tasks submitted
    pub submitted: usize,
    /// Tasks completed (always equal to `submitted`)
    pub completed: usize,
    /// One entry per task, ordered by output path
    pub outcomes: Vec<TaskOutcome>,
    /// Wall-clock time in milliseconds
    pub elapsed_ms: u64,
}

/// Shared cancellation flag, checked between tasks and between queries.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of outstanding work.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Runs search tasks concurrently against one shared index.
pub struct BatchSearch {
    searcher: Searcher,
    analyzer: Arc<dyn Analyzer>,
    config: BatchConfig,
}

impl BatchSearch {
    /// Creates an orchestrator, validating `config` up front.
    pub fn new(
        index: Arc<dyn Index>,
        analyzer: Arc<dyn Analyzer>,
        config: BatchConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            "Opened index {} with {} documents",
            config.index_tag,
            index.num_docs()
        );
        Ok(Self {
            searcher: Searcher::new(index),
            analyzer,
            config,
        })
    }

    /// Batch settings.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Directory receiving the outputs of `track` in `mode`.
    pub fn output_dir(&self, track: &str, mode: OutputMode) -> PathBuf {
        let folder = match mode {
            OutputMode::Run => self.config.runs_folder.as_str(),
            OutputMode::Verbose => config::VERBOSE_RUNS_FOLDER,
        };
        self.config
            .collection_root
            .join(folder)
            .join(&self.config.index_tag)
            .join(track)
    }

    /// Output file of `task`.
    pub fn output_path(&self, task: &SearchTask) -> PathBuf {
        self.output_dir(&task.track.name, task.mode)
            .join(task.run_tag(&self.config.index_tag).file_name())
    }

    /// Expands the experiment matrix into tasks (track-major order).
    pub fn plan(
        &self,
        tracks: &[Arc<Track>],
        models: &[ScoringModel],
        operators: &[Operator],
        parts: &[QueryPart],
        mode: OutputMode,
    ) -> Vec<SearchTask> {
        let mut tasks =
            Vec::with_capacity(tracks.len() * models.len() * operators.len() * parts.len());
        for track in tracks {
            for model in models {
                for &operator in operators {
                    for &part in parts {
                        tasks.push(SearchTask {
                            track: Arc::clone(track),
                            model: *model,
                            operator,
                            part,
                            mode,
                        });
                    }
                }
            }
        }
        tasks
    }

    /// Runs every task and enforces the submitted == completed invariant.
    pub fn run(
        &self,
        tasks: &[SearchTask],
        cancel: &CancelFlag,
        on_progress: &(dyn Fn(BatchProgress) + Sync),
    ) -> Result<BatchReport, BatchError> {
        let start = Instant::now();
        let submitted = tasks.len();

        let mut paths = HashSet::new();
        let mut dirs = BTreeSet::new();
        for task in tasks {
            let path = self.output_path(task);
            if !paths.insert(path.clone()) {
                return Err(ConfigError::InvalidValue {
                    field: "tasks",
                    message: format!("two tasks write {}", path.display()),
                }
                .into());
            }
            dirs.insert(self.output_dir(&task.track.name, task.mode));
        }
        for dir in &dirs {
            std::fs::create_dir_all(dir).map_err(|e| {
                BatchError::Io(format!("failed to create {}: {}", dir.display(), e))
            })?;
        }

        info!("There are {} tasks to process", submitted);

        let cursor = AtomicUsize::new(0);
        let completed = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);
        let outcomes: Mutex<Vec<TaskOutcome>> = Mutex::new(Vec::with_capacity(submitted));
        let failures: Mutex<Vec<TaskFailure>> = Mutex::new(Vec::new());

        let worker = || loop {
            if cancel.is_cancelled() {
                break;
            }
            let i = cursor.fetch_add(1, Ordering::SeqCst);
            let Some(task) = tasks.get(i) else {
                break;
            };
            let run_tag = task.run_tag(&self.config.index_tag);

            let result = panic::catch_unwind(AssertUnwindSafe(|| self.run_task(task, cancel)));
            let failure = match result {
                Ok(Ok(outcome)) => {
                    completed.fetch_add(1, Ordering::SeqCst);
                    outcomes
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .push(outcome);
                    None
                }
                Ok(Err(SearchError::Cancelled)) => {
                    debug!("{} on track {} cancelled", run_tag, task.track.name);
                    Some(SearchError::Cancelled.to_string())
                }
                Ok(Err(e)) => {
                    error!("{} on track {} failed: {}", run_tag, task.track.name, e);
                    Some(e.to_string())
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!("{} on track {} panicked: {}", run_tag, task.track.name, message);
                    Some(format!("panicked: {message}"))
                }
            };
            if let Some(message) = failure {
                failed.fetch_add(1, Ordering::SeqCst);
                failures
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(TaskFailure {
                        run_tag: run_tag.to_string(),
                        track: task.track.name.clone(),
                        message,
                    });
            }
            on_progress(BatchProgress {
                total: submitted,
                completed: completed.load(Ordering::SeqCst),
                failed: failed.load(Ordering::SeqCst),
            });
        };

        let num_workers = self.config.num_threads.min(submitted);
        let spawned: std::io::Result<()> = std::thread::scope(|s| {
            for i in 0..num_workers {
                std::thread::Builder::new()
                    .name(format!("irlab-search-{i}"))
                    .spawn_scoped(s, &worker)?;
            }
            Ok(())
        });
        if let Err(e) = spawned {
            return Err(BatchError::Io(format!("failed to spawn search worker: {e}")));
        }

        let completed = completed.load(Ordering::SeqCst);
        let mut failures = failures.into_inner().unwrap_or_else(|e| e.into_inner());
        failures.sort_by(|a, b| (&a.track, &a.run_tag).cmp(&(&b.track, &b.run_tag)));

        if cancel.is_cancelled() && completed != submitted {
            warn!("Interrupted after {} of {} tasks", completed, submitted);
            return Err(BatchError::Interrupted {
                submitted,
                completed,
            });
        }
        if completed != submitted {
            return Err(BatchError::Incomplete {
                submitted,
                completed,
                failures,
            });
        }

        let mut outcomes = outcomes.into_inner().unwrap_or_else(|e| e.into_inner());
        outcomes.sort_by(|a, b| a.path.cmp(&b.path));
        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!("Completed {} tasks in {}ms", completed, elapsed_ms);

        Ok(BatchReport {
            submitted,
            completed,
            outcomes,
            elapsed_ms,
        })
    }

    /// Executes one task, writing its output file.
    #[instrument(skip_all, fields(run_tag = %task.run_tag(&self.config.index_tag), track = %task.track.name))]
    pub fn run_task(
        &self,
        task: &SearchTask,
        cancel: &CancelFlag,
    ) -> Result<TaskOutcome, SearchError> {
        let run_tag = task.run_tag(&self.config.index_tag);
        let path = self.output_path(task);
        let file = BufWriter::new(File::create(&path)?);

        let mut outcome = TaskOutcome {
            run_tag: run_tag.to_string(),
            track: task.track.name.clone(),
            path: path.clone(),
            queries: 0,
            records: 0,
            fallbacks: 0,
            skipped: 0,
        };

        match task.mode {
            OutputMode::Run => {
                let mut writer = RunWriter::new(file, run_tag, self.config.fallback_doc_id.clone());
                self.each_query(task, cancel, &mut outcome, |query, analyzed, outcome| {
                    let hits = self.searcher.search(
                        analyzed,
                        &task.model,
                        task.operator,
                        self.config.num_hits,
                    )?;
                    let entries = hits
                        .iter()
                        .map(|hit| {
                            let doc_id = self.searcher.index().external_id(hit.doc).ok_or_else(|| {
                                SearchError::DataConsistency(format!(
                                    "document {} has no external id",
                                    hit.doc.as_u32()
                                ))
                            })?;
                            Ok(RankedEntry {
                                doc_id: doc_id.to_string(),
                                score: hit.score,
                            })
                        })
                        .collect::<Result<Vec<_>, SearchError>>()?;
                    match writer.write_query(query.id, &entries)? {
                        QueryRecords::Ranked(n) => outcome.records += n,
                        QueryRecords::Fallback => {
                            outcome.records += 1;
                            outcome.fallbacks += 1;
                        }
                    }
                    Ok(())
                })?;
            }
            OutputMode::Verbose => {
                let mut writer = VerboseWriter::new(file, &task.model);
                let extractor =
                    ExplanationExtractor::new(&self.searcher, task.model, task.operator);
                self.each_query(task, cancel, &mut outcome, |query, analyzed, outcome| {
                    let hits = self.searcher.search(
                        analyzed,
                        &task.model,
                        task.operator,
                        self.config.num_hits,
                    )?;
                    for (i, hit) in hits.iter().enumerate() {
                        let Some(doc_id) = self.searcher.index().external_id(hit.doc) else {
                            warn!(
                                "Query {}: document {} has no external id, skipping",
                                query.id,
                                hit.doc.as_u32()
                            );
                            continue;
                        };
                        let explanation = extractor.extract(analyzed, hit)?;
                        writer.write_record(
                            query,
                            i + 1,
                            hit,
                            doc_id,
                            explanation.as_ref(),
                            analyzed.word_count,
                        )?;
                        outcome.records += 1;
                    }
                    Ok(())
                })?;
            }
        }

        debug!(
            "Wrote {} records for {} queries ({} fallbacks, {} skipped)",
            outcome.records, outcome.queries, outcome.fallbacks, outcome.skipped
        );
        Ok(outcome)
    }

    fn each_query<F>(
        &self,
        task: &SearchTask,
        cancel: &CancelFlag,
        outcome: &mut TaskOutcome,
        mut per_query: F,
    ) -> Result<(), SearchError>
    where
        F: FnMut(&Query, &AnalyzedQuery, &mut TaskOutcome) -> Result<(), SearchError>,
    {
        for query in &task.track.queries {
            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }
            let Some(analyzed) = AnalyzedQuery::analyze(query, self.analyzer.as_ref(), task.part)
            else {
                outcome.skipped += 1;
                continue;
            };
            outcome.queries += 1;
            per_query(query, &analyzed, outcome)?;
        }
        Ok(())
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{
        CollectionStatistics, DocNum, DocumentStatistics, Posting, SimpleAnalyzer, TermStatistics,
    };
    use crate::test_utils::{fixture_index, fixture_track};
    use tempfile::TempDir;

    fn batch(dir: &TempDir, index: Arc<dyn Index>, num_hits: usize) -> BatchSearch {
        BatchSearch::new(
            index,
            Arc::new(SimpleAnalyzer),
            BatchConfig {
                collection_root: dir.path().to_path_buf(),
                runs_folder: config::RUNS_FOLDER.to_string(),
                index_tag: "Simple".to_string(),
                fallback_doc_id: config::CLUEWEB09_NO_DOCUMENT.to_string(),
                num_hits,
                num_threads: 3,
            },
        )
        .unwrap()
    }

    fn no_progress(_: BatchProgress) {}

    #[test]
    fn test_new_rejects_bad_config() {
        let dir = TempDir::new().unwrap();
        let mut config = BatchConfig {
            collection_root: dir.path().to_path_buf(),
            runs_folder: "runs".to_string(),
            index_tag: "Simple".to_string(),
            fallback_doc_id: "GX000-00-0000000".to_string(),
            num_hits: 0,
            num_threads: 1,
        };
        let invalid = BatchSearch::new(fixture_index(), Arc::new(SimpleAnalyzer), config.clone());
        assert!(invalid.is_err());

        config.num_hits = 10;
        config.collection_root = dir.path().join("missing");
        assert!(matches!(
            BatchSearch::new(fixture_index(), Arc::new(SimpleAnalyzer), config),
            Err(ConfigError::MissingPath(_))
        ));
    }

    #[test]
    fn test_output_layout() {
        let dir = TempDir::new().unwrap();
        let batch = batch(&dir, fixture_index(), 10);
        let tasks = batch.plan(
            &[Arc::new(fixture_track())],
            &[ScoringModel::DPH],
            &[Operator::Or],
            &[QueryPart::ALL],
            OutputMode::Run,
        );
        assert_eq!(
            batch.output_path(&tasks[0]),
            dir.path()
                .join("runs")
                .join("Simple")
                .join("FIX")
                .join("DPH_contents_Simple_OR_all.txt")
        );
        let verbose = SearchTask {
            mode: OutputMode::Verbose,
            ..tasks[0].clone()
        };
        assert!(batch
            .output_path(&verbose)
            .starts_with(dir.path().join("verbose_runs")));
    }

    #[test]
    fn test_run_all_models_complete() {
        let dir = TempDir::new().unwrap();
        let batch = batch(&dir, fixture_index(), 10);
        let tasks = batch.plan(
            &[Arc::new(fixture_track())],
            &ScoringModel::standard_set(),
            &[Operator::Or, Operator::And],
            &[QueryPart::ALL],
            OutputMode::Run,
        );
        let report = batch.run(&tasks, &CancelFlag::new(), &no_progress).unwrap();
        assert_eq!(report.submitted, 16);
        assert_eq!(report.completed, 16);
        for outcome in &report.outcomes {
            assert!(outcome.path.is_file());
        }
    }

    #[test]
    fn test_duplicate_tasks_rejected() {
        let dir = TempDir::new().unwrap();
        let batch = batch(&dir, fixture_index(), 10);
        let tasks = batch.plan(
            &[Arc::new(fixture_track())],
            &[ScoringModel::DPH, ScoringModel::DPH],
            &[Operator::Or],
            &[QueryPart::ALL],
            OutputMode::Run,
        );
        assert!(matches!(
            batch.run(&tasks, &CancelFlag::new(), &no_progress),
            Err(BatchError::Config(_))
        ));
    }

    #[test]
    fn test_cancelled_before_start() {
        let dir = TempDir::new().unwrap();
        let batch = batch(&dir, fixture_index(), 10);
        let tasks = batch.plan(
            &[Arc::new(fixture_track())],
            &[ScoringModel::DPH, ScoringModel::DFRee],
            &[Operator::Or],
            &[QueryPart::ALL],
            OutputMode::Run,
        );
        let cancel = CancelFlag::new();
        cancel.cancel();
        match batch.run(&tasks, &cancel, &no_progress) {
            Err(BatchError::Interrupted {
                submitted,
                completed,
            }) => {
                assert_eq!(submitted, 2);
                assert_eq!(completed, 0);
            }
            other => panic!("expected Interrupted, got {other:?}"),
        }
    }

    /// Index whose postings point at a document it cannot describe.
    struct BrokenIndex {
        postings: Vec<Posting>,
    }

    impl Index for BrokenIndex {
        fn collection_stats(&self) -> CollectionStatistics {
            CollectionStatistics {
                doc_count: 1,
                total_terms: 3,
            }
        }
        fn term_stats(&self, _term: &str) -> Option<TermStatistics> {
            Some(TermStatistics {
                doc_freq: 1,
                total_term_freq: 1,
            })
        }
        fn postings(&self, _term: &str) -> &[Posting] {
            &self.postings
        }
        fn document_stats(&self, _doc: DocNum) -> Option<DocumentStatistics> {
            None
        }
        fn external_id(&self, _doc: DocNum) -> Option<&str> {
            None
        }
        fn num_docs(&self) -> usize {
            1
        }
    }

    #[test]
    fn test_failed_task_reported_as_incomplete() {
        let dir = TempDir::new().unwrap();
        let index: Arc<dyn Index> = Arc::new(BrokenIndex {
            postings: vec![Posting {
                doc: DocNum::from_u32(0),
                freq: 1,
            }],
        });
        let batch = batch(&dir, index, 10);
        let track = Arc::new(Track::new("BROKEN", vec![Query::new(1, "anything")]));
        let tasks = batch.plan(
            &[track],
            &[ScoringModel::DPH],
            &[Operator::Or],
            &[QueryPart::ALL],
            OutputMode::Run,
        );
        match batch.run(&tasks, &CancelFlag::new(), &no_progress) {
            Err(BatchError::Incomplete {
                submitted,
                completed,
                failures,
            }) => {
                assert_eq!(submitted, 1);
                assert_eq!(completed, 0);
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].track, "BROKEN");
                assert_eq!(failures[0].run_tag, "DPH_contents_Simple_OR_all");
            }
            other => panic!("expected Incomplete, got {other:?}"),
        }
    }

    #[test]
    fn test_progress_reports_every_task() {
        let dir = TempDir::new().unwrap();
        let batch = batch(&dir, fixture_index(), 10);
        let tasks = batch.plan(
            &[Arc::new(fixture_track())],
            &[ScoringModel::DPH, ScoringModel::DLH13, ScoringModel::LGD_DEFAULT],
            &[Operator::Or],
            &[QueryPart::ALL, QueryPart::new(1)],
            OutputMode::Run,
        );
        let calls = AtomicUsize::new(0);
        let max_completed = AtomicUsize::new(0);
        let report = batch
            .run(&tasks, &CancelFlag::new(), &|p: BatchProgress| {
                calls.fetch_add(1, Ordering::SeqCst);
                max_completed.fetch_max(p.completed, Ordering::SeqCst);
                assert_eq!(p.total, 6);
            })
            .unwrap();
        assert_eq!(report.completed, 6);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert_eq!(max_completed.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_verbose_mode_writes_breakdown() {
        let dir = TempDir::new().unwrap();
        let batch = batch(&dir, fixture_index(), 3);
        let tasks = batch.plan(
            &[Arc::new(fixture_track())],
            &[ScoringModel::DPH],
            &[Operator::And],
            &[QueryPart::ALL],
            OutputMode::Verbose,
        );
        let report = batch.run(&tasks, &CancelFlag::new(), &no_progress).unwrap();
        let content = std::fs::read_to_string(&report.outcomes[0].path).unwrap();
        assert!(!content.is_empty());
        for line in content.lines() {
            let fields: Vec<&str> = line.split('\t').collect();
            assert!(fields.len() >= 8, "{line}");
            assert_eq!(fields[5], "DPH");
            assert!(fields[7].contains('(') && fields[7].contains(")="));
        }
    }
}
