//! Significance testing over externally computed effectiveness scores.
//!
//! An external evaluation tool writes one score file per
//! (model, variant, metric). This module loads them into a [`ScoreTable`],
//! pairs each alternate variant with the baseline variant query by query,
//! and runs paired tests.
//!
//! | Test | Reported as |
//! |------|-------------|
//! | Paired t-test | one-sided p (two-tailed p halved) |
//! | Wilcoxon signed-rank | two-tailed p, normal approximation |
//!
//! A comparison counts as significant when either p is below
//! [`SIGNIFICANCE_ALPHA`](crate::config::SIGNIFICANCE_ALPHA).
//!
//! # Example
//!
//! ```ignore
//! let evaluator = SignificanceEvaluator::load(
//!     root, "KStem", "nDCG20",
//!     vec!["BM25".into(), "PL2".into()],
//!     vec!["title".into(), "body".into()],
//! )?;
//! for result in evaluator.compare_all()? {
//!     print!("{result} ");
//! }
//! ```

pub mod scores;
pub mod significance;
pub mod stats;

pub use scores::{parse_scores, read_scores, score_file_path, ScoreTable};
pub use significance::{PairedScores, SignificanceEvaluator, SignificanceResult};
pub use stats::{
    interpret_effect_size, paired_effect_size, paired_ttest, wilcoxon_signed_rank, TTestResult,
    WilcoxonResult,
};
