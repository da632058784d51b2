//! Search command implementation.
//!
//! Loads the corpus and tracks, expands the experiment matrix and runs it on
//! the core orchestrator. The batch runs on a blocking thread; Ctrl-C sets
//! the shared cancel flag and the interrupted batch is reported as an error.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use irlab_core::config::ExperimentConfig;
use irlab_core::index::{load_jsonl_corpus, Index, SimpleAnalyzer};
use irlab_core::search::{
    BatchConfig, BatchProgress, BatchReport, BatchSearch, CancelFlag, OutputMode, QueryPart, Track,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Runs every task of `config` in `mode`.
pub async fn execute(
    config: ExperimentConfig,
    mode: OutputMode,
    show_progress: bool,
) -> Result<BatchReport> {
    let cancel = CancelFlag::new();
    let worker_cancel = cancel.clone();
    let mut handle = tokio::task::spawn_blocking(move || {
        run_batch(&config, mode, show_progress, &worker_cancel)
    });

    let joined = tokio::select! {
        joined = &mut handle => joined,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupt received, cancelling outstanding tasks");
            cancel.cancel();
            handle.await
        }
    };
    joined.context("Search worker panicked")?
}

fn run_batch(
    config: &ExperimentConfig,
    mode: OutputMode,
    show_progress: bool,
    cancel: &CancelFlag,
) -> Result<BatchReport> {
    let models = config.scoring_models()?;

    let corpus = config.resolve(&config.corpus);
    info!("Loading corpus {}", corpus.display());
    let index: Arc<dyn Index> = Arc::new(
        load_jsonl_corpus(&corpus, SimpleAnalyzer)
            .with_context(|| format!("Failed to load corpus: {}", corpus.display()))?,
    );

    let tracks = config
        .tracks
        .iter()
        .map(|t| {
            let topics = config.resolve(&t.topics);
            let qrels = t.qrels.as_ref().map(|q| config.resolve(q));
            Track::load(&t.name, &topics, qrels.as_deref())
                .map(Arc::new)
                .with_context(|| format!("Failed to load track {}", t.name))
        })
        .collect::<Result<Vec<_>>>()?;

    let batch = BatchSearch::new(
        index,
        Arc::new(SimpleAnalyzer),
        BatchConfig::from_experiment(config),
    )?;
    let parts: Vec<QueryPart> = config.parts.iter().map(|&p| QueryPart::new(p)).collect();
    let tasks = batch.plan(&tracks, &models, &config.operators, &parts, mode);

    let pb = if show_progress {
        ProgressBar::new(tasks.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(ProgressStyle::default_bar().template("{msg} [{bar:40}] {pos}/{len}")?);
    pb.set_message(match mode {
        OutputMode::Run => "Runs",
        OutputMode::Verbose => "Verbose runs",
    });

    let on_progress = |p: BatchProgress| {
        pb.set_position((p.completed + p.failed) as u64);
        if p.failed > 0 {
            pb.set_message(format!("Tasks ({} failed)", p.failed));
        }
    };
    let report = batch.run(&tasks, cancel, &on_progress);
    pb.finish_and_clear();

    Ok(report?)
}
