//! irlab Evaluation Tool
//!
//! Compares ranked lists of two TREC runs and tests whether variant
//! representations significantly improve a baseline.
//!
//! # Usage
//!
//! ```bash
//! # Similarity of two runs, per-metric means
//! irlab-eval compare runs/BM25.txt runs/DPH.txt
//! irlab-eval compare a.txt b.txt --metrics overlap,jaccard,rdc --qrels qrels.txt --per-query
//!
//! # Paired tests over per-query effectiveness scores
//! irlab-eval significance --root /data/CW09B --tag KStem \
//!     --models BM25,PL2 --variants title,body,anchor
//!
//! # Output JSON for analysis
//! irlab-eval significance ... --json
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use irlab_core::comparison::{
    format_row, AssumeRelevant, JudgedRelevance, ListMetric, RelevanceOracle,
    ResultListComparator, RunComparison,
};
use irlab_core::config::DEFAULT_METRIC;
use irlab_core::evaluation::{interpret_effect_size, SignificanceEvaluator, SignificanceResult};
use irlab_core::search::track::{load_qrels, load_topics};
use irlab_core::search::{Query, RunFile};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

// =============================================================================
// CLI
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "irlab-eval")]
#[command(about = "Compare TREC runs and test variants for significance")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare the ranked lists of two run files
    Compare {
        /// Reference run file
        reference: PathBuf,

        /// Alternate run file
        alternate: PathBuf,

        /// Metrics to compute (comma-separated, default: all)
        #[arg(long, value_delimiter = ',')]
        metrics: Option<Vec<ListMetric>>,

        /// TREC qrels used as the RDC relevance check (default: everything relevant)
        #[arg(long)]
        qrels: Option<PathBuf>,

        /// Show per-query rows
        #[arg(long)]
        per_query: bool,
    },

    /// Paired significance tests of variants against a baseline variant
    Significance {
        /// Collection root holding `ltr_evals/`
        #[arg(long)]
        root: PathBuf,

        /// Evaluation tag (sub-folder of `ltr_evals/`)
        #[arg(long)]
        tag: String,

        /// Effectiveness metric
        #[arg(long, default_value = DEFAULT_METRIC)]
        metric: String,

        /// Models (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        models: Vec<String>,

        /// Variants, baseline first (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        variants: Vec<String>,

        /// Topics file restricting the query set
        #[arg(long)]
        topics: Option<PathBuf>,

        /// Print per-query improvement labels
        #[arg(long)]
        labels: bool,
    },
}

// =============================================================================
// Output Types
// =============================================================================

#[derive(Debug, Serialize)]
struct CompareReport {
    reference: String,
    alternate: String,
    queries: usize,
    comparison: RunComparison,
}

#[derive(Debug, Serialize)]
struct SignificanceReport {
    tag: String,
    metric: String,
    baseline: String,
    results: Vec<SignificanceResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<BTreeMap<String, BTreeMap<u32, u8>>>,
}

// =============================================================================
// Commands
// =============================================================================

fn run_compare(
    reference: &Path,
    alternate: &Path,
    metrics: Option<Vec<ListMetric>>,
    qrels: Option<&Path>,
) -> Result<CompareReport> {
    let reference_run = RunFile::read(reference)
        .with_context(|| format!("Failed to read run file: {}", reference.display()))?;
    let alternate_run = RunFile::read(alternate)
        .with_context(|| format!("Failed to read run file: {}", alternate.display()))?;

    let oracle: Box<dyn RelevanceOracle> = match qrels {
        Some(path) => {
            let judgments = load_qrels(path)
                .with_context(|| format!("Failed to read qrels: {}", path.display()))?;
            Box::new(JudgedRelevance::new(judgments.into_iter().map(|(id, docs)| {
                let mut query = Query::new(id, "");
                query.judgments = docs;
                query
            })))
        }
        None => Box::new(AssumeRelevant),
    };

    let metrics = metrics.unwrap_or_else(|| ListMetric::all().to_vec());
    let comparator = ResultListComparator::new(metrics);
    info!(
        "Comparing {} queries of {} against {}",
        reference_run.lists.len(),
        reference_run.run_tag,
        alternate_run.run_tag
    );
    let comparison = comparator.compare_runs(&reference_run, &alternate_run, oracle.as_ref())?;

    Ok(CompareReport {
        reference: reference_run.run_tag,
        alternate: alternate_run.run_tag,
        queries: comparison.rows.len(),
        comparison,
    })
}

fn run_significance(
    root: &Path,
    tag: &str,
    metric: &str,
    models: Vec<String>,
    variants: Vec<String>,
    topics: Option<&Path>,
    with_labels: bool,
) -> Result<SignificanceReport> {
    if variants.len() < 2 {
        bail!("At least two variants are required: a baseline and one alternate");
    }

    let mut evaluator = SignificanceEvaluator::load(root, tag, metric, models, variants)?;
    if let Some(path) = topics {
        let queries = load_topics(path)
            .with_context(|| format!("Failed to read topics: {}", path.display()))?;
        info!("Restricting to {} topics from {}", queries.len(), path.display());
        evaluator = evaluator.with_queries(queries.iter().map(|q| q.id));
    }

    let results = evaluator.compare_all()?;

    let labels = if with_labels {
        let mut labels = BTreeMap::new();
        for model in evaluator.models() {
            for variant in evaluator.variants() {
                labels.insert(
                    format!("{}_{}", model, variant),
                    evaluator.labels(model, variant)?,
                );
            }
        }
        Some(labels)
    } else {
        None
    };

    Ok(SignificanceReport {
        tag: tag.to_string(),
        metric: metric.to_string(),
        baseline: evaluator.baseline().to_string(),
        results,
        labels,
    })
}

// =============================================================================
// Output
// =============================================================================

fn print_compare(report: &CompareReport, per_query: bool) {
    println!("\n{}", "=".repeat(80));
    println!("RESULT LIST COMPARISON");
    println!("{}", "=".repeat(80));
    println!(
        "\nReference: {}\nAlternate: {}\nQueries: {}",
        report.reference, report.alternate, report.queries
    );

    let names: Vec<&str> = report.comparison.metrics.iter().map(|m| m.name()).collect();

    if per_query {
        println!("\n{}", "-".repeat(70));
        println!("PER-QUERY");
        println!("qid\t{}", names.join("\t"));
        for row in &report.comparison.rows {
            println!("{}\t{}", row.query_id, format_row(&row.values));
        }
    }

    println!("\n{}", "-".repeat(70));
    println!("MEANS");
    for (name, mean) in &report.comparison.means {
        println!("{:<18} {:>10.5}", name, mean);
    }
    println!("{}\n", "=".repeat(80));
}

fn print_significance(report: &SignificanceReport) {
    println!("\n{}", "=".repeat(80));
    println!("SIGNIFICANCE vs {} ({})", report.baseline, report.metric);
    println!("{}", "=".repeat(80));

    println!(
        "{:<12} {:<12} {:>6} {:>8} {:>8} {:>12} {:>12} {:>8}",
        "Model", "Variant", "Pairs", "Base", "Alt", "t-test p", "Wilcoxon p", "Effect"
    );
    for r in &report.results {
        println!(
            "{:<12} {:<12} {:>6} {:>8.4} {:>8.4} {:>12.6} {:>12.6} {:>8.3} {}",
            r.model,
            r.variant,
            r.pairs,
            r.mean_baseline,
            r.mean_alternate,
            r.t_p,
            r.wilcoxon_p,
            r.effect_size,
            interpret_effect_size(r.effect_size)
        );
        if !r.skipped.is_empty() {
            println!("{:<12} skipped queries: {:?}", "", r.skipped);
        }
    }

    println!("\n{}", "-".repeat(70));
    println!("SUMMARY (* = not significant)");
    let mut current: Option<&str> = None;
    let mut line = String::new();
    for r in &report.results {
        if current != Some(r.model.as_str()) {
            if !line.is_empty() {
                println!("{}", line.trim_end());
            }
            line.clear();
            current = Some(r.model.as_str());
        }
        line.push_str(&format!("{} ", r));
    }
    if !line.is_empty() {
        println!("{}", line.trim_end());
    }

    if let Some(labels) = &report.labels {
        println!("\n{}", "-".repeat(70));
        println!("LABELS (1 = variant improves baseline)");
        for (name, per_query) in labels {
            let improved = per_query.values().filter(|&&l| l == 1).count();
            println!("{}: {}/{}", name, improved, per_query.len());
            for (qid, label) in per_query {
                println!("  {}\t{}", qid, label);
            }
        }
    }

    println!("{}\n", "=".repeat(80));
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Compare {
            reference,
            alternate,
            metrics,
            qrels,
            per_query,
        } => {
            let report = run_compare(&reference, &alternate, metrics, qrels.as_deref())?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_compare(&report, per_query);
            }
        }
        Command::Significance {
            root,
            tag,
            metric,
            models,
            variants,
            topics,
            labels,
        } => {
            let report = run_significance(
                &root,
                &tag,
                &metric,
                models,
                variants,
                topics.as_deref(),
                labels,
            )?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_significance(&report);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_compare_identical_runs() {
        let dir = TempDir::new().unwrap();
        let run = "1\tQ0\ta\t1\t2.0\tr\n1\tQ0\tb\t2\t1.0\tr\n";
        let a = write(dir.path(), "a.txt", run);
        let b = write(dir.path(), "b.txt", run);

        let report = run_compare(
            &a,
            &b,
            Some(vec![ListMetric::Overlap, ListMetric::FMeasure]),
            None,
        )
        .unwrap();
        assert_eq!(report.queries, 1);
        assert_eq!(report.comparison.means[0].1, 1.0);
        assert_eq!(report.comparison.means[1].1, 1.0);
    }

    #[test]
    fn test_compare_with_qrels() {
        let dir = TempDir::new().unwrap();
        let a = write(dir.path(), "a.txt", "1 Q0 a 1 2 r\n1 Q0 b 2 1 r\n");
        let b = write(dir.path(), "b.txt", "1 Q0 b 1 2 x\n1 Q0 a 2 1 x\n");
        let qrels = write(dir.path(), "qrels.txt", "1 0 a 1\n1 0 b 0\n");

        let report = run_compare(&a, &b, Some(vec![ListMetric::Rdc]), Some(&qrels)).unwrap();
        assert_eq!(report.comparison.rows[0].values, vec![-2.0]);
    }

    #[test]
    fn test_significance_requires_two_variants() {
        let dir = TempDir::new().unwrap();
        let err = run_significance(
            dir.path(),
            "T",
            "nDCG20",
            vec!["BM25".to_string()],
            vec!["title".to_string()],
            None,
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("two variants"));
    }

    #[test]
    fn test_significance_with_topics_and_labels() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "ltr_evals/T/BM25.title.nDCG20.txt",
            "runid,topic,ndcg\nx,1,0.1\nx,2,0.2\nx,3,0.3\nx,4,0.9\n",
        );
        write(
            dir.path(),
            "ltr_evals/T/BM25.body.nDCG20.txt",
            "runid,topic,ndcg\nx,1,0.4\nx,2,0.5\nx,3,0.9\nx,4,0.1\n",
        );
        let topics = write(dir.path(), "topics.txt", "1:a\n2:b\n3:c\n");

        let report = run_significance(
            dir.path(),
            "T",
            "nDCG20",
            vec!["BM25".to_string()],
            vec!["title".to_string(), "body".to_string()],
            Some(&topics),
            true,
        )
        .unwrap();
        assert_eq!(report.baseline, "title");
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].pairs, 3);

        let labels = report.labels.unwrap();
        let labels = &labels["BM25_body"];
        assert_eq!(labels.len(), 3);
        assert!(labels.values().all(|&l| l == 1));
    }
}
