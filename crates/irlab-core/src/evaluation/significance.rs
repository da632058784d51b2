//! Baseline-versus-variant significance over per-query score tables.

use super::scores::ScoreTable;
use super::stats::{mean, paired_effect_size, paired_ttest, wilcoxon_signed_rank};
use crate::config::SIGNIFICANCE_ALPHA;
use crate::error::EvaluationError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Scores of the queries present on both sides, in query-id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PairedScores {
    /// Paired query ids
    pub query_ids: Vec<u32>,
    /// Baseline score per paired query
    pub baseline: Vec<f64>,
    /// Alternate score per paired query
    pub alternate: Vec<f64>,
    /// Queries missing from at least one side
    pub skipped: Vec<u32>,
}

impl PairedScores {
    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.query_ids.len()
    }

    /// Whether no query is paired.
    pub fn is_empty(&self) -> bool {
        self.query_ids.is_empty()
    }
}

/// Outcome of one baseline-versus-variant comparison.
#[derive(Debug, Clone, Serialize)]
pub struct SignificanceResult {
    /// Model short name
    pub model: String,
    /// Baseline variant
    pub baseline: String,
    /// Alternate variant
    pub variant: String,
    /// Paired queries
    pub pairs: usize,
    /// Queries excluded for missing scores
    pub skipped: Vec<u32>,
    /// Mean baseline score over paired queries
    pub mean_baseline: f64,
    /// Mean alternate score over paired queries
    pub mean_alternate: f64,
    /// Paired t statistic (positive favours the variant)
    pub t_statistic: f64,
    /// One-sided t-test p-value
    pub t_p: f64,
    /// Wilcoxon signed-rank p-value
    pub wilcoxon_p: f64,
    /// Mean difference over its standard deviation
    pub effect_size: f64,
    /// Either p-value under the significance level
    pub significant: bool,
}

impl fmt::Display for SignificanceResult {
    /// `model_variant(tp:...; wp:...)`, starred when not significant.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.significant {
            f.write_str("*")?;
        }
        write!(
            f,
            "{}_{}(tp:{:.10}; wp:{:.10})",
            self.model, self.variant, self.t_p, self.wilcoxon_p
        )
    }
}

/// Compares every alternate variant of every model against the baseline variant.
#[derive(Debug, Clone)]
pub struct SignificanceEvaluator {
    table: ScoreTable,
    models: Vec<String>,
    baseline: String,
    variants: Vec<String>,
    queries: Option<Vec<u32>>,
    alpha: f64,
}

impl SignificanceEvaluator {
    /// Wraps an already loaded table.
    ///
    /// `variants[0]` is the baseline; the remaining variants are compared
    /// against it.
    pub fn new(table: ScoreTable, models: Vec<String>, variants: Vec<String>) -> Self {
        let mut variants = variants.into_iter();
        let baseline = variants.next().unwrap_or_default();
        Self {
            table,
            models,
            baseline,
            variants: variants.collect(),
            queries: None,
            alpha: SIGNIFICANCE_ALPHA,
        }
    }

    /// Loads every `models x variants` score file for `metric` under `tag`.
    pub fn load(
        collection_root: &Path,
        tag: &str,
        metric: &str,
        models: Vec<String>,
        variants: Vec<String>,
    ) -> Result<Self, EvaluationError> {
        let table = ScoreTable::load(collection_root, tag, metric, &models, &variants)?;
        Ok(Self::new(table, models, variants))
    }

    /// Restricts the query universe (e.g. to the ids of a topics file).
    ///
    /// Without it, the universe is the union of both sides' query ids.
    pub fn with_queries(mut self, queries: impl IntoIterator<Item = u32>) -> Self {
        let mut ids: Vec<u32> = queries.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        self.queries = Some(ids);
        self
    }

    /// Overrides the significance level.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Baseline variant.
    pub fn baseline(&self) -> &str {
        &self.baseline
    }

    /// Alternate variants.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Models.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Pairs baseline and `variant` scores of `model`.
    ///
    /// A query missing from either side is skipped, never read as zero.
    pub fn paired(&self, model: &str, variant: &str) -> Result<PairedScores, EvaluationError> {
        let base = self.table.get(model, &self.baseline)?;
        let alt = self.table.get(model, variant)?;

        let universe: Vec<u32> = match &self.queries {
            Some(ids) => ids.clone(),
            None => {
                let mut ids: Vec<u32> = base.keys().chain(alt.keys()).copied().collect();
                ids.sort_unstable();
                ids.dedup();
                ids
            }
        };

        let mut paired = PairedScores::default();
        for qid in universe {
            match (base.get(&qid), alt.get(&qid)) {
                (Some(&b), Some(&a)) => {
                    paired.query_ids.push(qid);
                    paired.baseline.push(b);
                    paired.alternate.push(a);
                }
                (b, a) => {
                    debug!(
                        %model,
                        %variant,
                        query = qid,
                        in_baseline = b.is_some(),
                        in_variant = a.is_some(),
                        "Skipping query with missing score"
                    );
                    paired.skipped.push(qid);
                }
            }
        }
        Ok(paired)
    }

    /// Runs both paired tests for one model and variant.
    pub fn compare(
        &self,
        model: &str,
        variant: &str,
    ) -> Result<SignificanceResult, EvaluationError> {
        let paired = self.paired(model, variant)?;
        if paired.len() < 2 {
            return Err(EvaluationError::InsufficientPairs {
                model: model.to_string(),
                baseline: self.baseline.clone(),
                variant: variant.to_string(),
                pairs: paired.len(),
            });
        }

        let t = paired_ttest(&paired.baseline, &paired.alternate);
        let w = wilcoxon_signed_rank(&paired.baseline, &paired.alternate);
        let t_p = t.one_sided_p();

        Ok(SignificanceResult {
            model: model.to_string(),
            baseline: self.baseline.clone(),
            variant: variant.to_string(),
            pairs: paired.len(),
            mean_baseline: mean(&paired.baseline),
            mean_alternate: mean(&paired.alternate),
            t_statistic: t.t_statistic,
            t_p,
            wilcoxon_p: w.p_value,
            effect_size: paired_effect_size(&paired.baseline, &paired.alternate),
            significant: t_p < self.alpha || w.p_value < self.alpha,
            skipped: paired.skipped,
        })
    }

    /// Every model against every alternate variant, models outermost.
    pub fn compare_all(&self) -> Result<Vec<SignificanceResult>, EvaluationError> {
        let mut results = Vec::with_capacity(self.models.len() * self.variants.len());
        for model in &self.models {
            for variant in &self.variants {
                results.push(self.compare(model, variant)?);
            }
        }
        Ok(results)
    }

    /// Per-query labels: 1 when the variant beats the baseline, else 0.
    pub fn labels(&self, model: &str, variant: &str) -> Result<BTreeMap<u32, u8>, EvaluationError> {
        let paired = self.paired(model, variant)?;
        Ok(paired
            .query_ids
            .iter()
            .zip(paired.baseline.iter().zip(&paired.alternate))
            .map(|(&qid, (b, a))| (qid, u8::from(a > b)))
            .collect())
    }
}
