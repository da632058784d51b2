//! Result-list comparison.
//!
//! Quantifies how similar two rankings for the same query are. Only document
//! identifiers matter; scores are ignored.
//!
//! # Metrics
//!
//! | Name | Range | Meaning |
//! |------|-------|---------|
//! | `overlap` | [0, 1] | Share of reference documents also retrieved by the alternate |
//! | `jaccard` | [0, 1] | Intersection over union |
//! | `f_measure` | [0, 1] | 1 - normalized footrule over common documents |
//! | `g_measure` | [0, 1] | Footrule extension penalizing one-sided documents |
//! | `m_measure` | (-inf, 1] | Reciprocal-rank divergence, empirical normalization |
//! | `doc_contribution` | [0, 1] | Common documents weighted by reference rank |
//! | `rdc` | integer | Signed rank displacement of common documents |
//!
//! # Example
//!
//! ```ignore
//! let comparator = ResultListComparator::new(ListMetric::all().to_vec());
//! let values = comparator.compare(101, &reference, &alternate, &AssumeRelevant)?;
//! println!("{}", format_row(&values));
//! ```

pub mod metrics;

use crate::error::ComparisonError;
use crate::search::{Query, RankedList, RunFile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Relevance predicate used by the rank displacement coefficient.
pub trait RelevanceOracle: Send + Sync {
    /// Whether `doc_id` is relevant to `query_id`.
    fn is_relevant(&self, query_id: u32, doc_id: &str) -> bool;
}

/// Treats every document as relevant.
///
/// This is the default until judgments are wired in for RDC.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeRelevant;

impl RelevanceOracle for AssumeRelevant {
    fn is_relevant(&self, _query_id: u32, _doc_id: &str) -> bool {
        true
    }
}

/// Relevance from loaded judgments: grade > 0 is relevant.
#[derive(Debug, Clone, Default)]
pub struct JudgedRelevance {
    queries: BTreeMap<u32, Query>,
}

impl JudgedRelevance {
    /// Indexes `queries` by id.
    pub fn new(queries: impl IntoIterator<Item = Query>) -> Self {
        Self {
            queries: queries.into_iter().map(|q| (q.id, q)).collect(),
        }
    }
}

impl RelevanceOracle for JudgedRelevance {
    fn is_relevant(&self, query_id: u32, doc_id: &str) -> bool {
        self.queries
            .get(&query_id)
            .map(|q| q.judge(doc_id) > 0)
            .unwrap_or(false)
    }
}

/// A comparison measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMetric {
    /// Overlapping documents over reference size
    Overlap,
    /// Jaccard coefficient
    Jaccard,
    /// Normalized footrule
    FMeasure,
    /// Extended footrule
    GMeasure,
    /// Reciprocal-rank divergence
    MMeasure,
    /// Document contribution
    DocContribution,
    /// Rank displacement coefficient
    Rdc,
}

impl ListMetric {
    /// Every metric, in report order.
    pub fn all() -> &'static [ListMetric] {
        &[
            ListMetric::Overlap,
            ListMetric::Jaccard,
            ListMetric::FMeasure,
            ListMetric::GMeasure,
            ListMetric::MMeasure,
            ListMetric::DocContribution,
            ListMetric::Rdc,
        ]
    }

    /// Stable name.
    pub fn name(&self) -> &'static str {
        match self {
            ListMetric::Overlap => "overlap",
            ListMetric::Jaccard => "jaccard",
            ListMetric::FMeasure => "f_measure",
            ListMetric::GMeasure => "g_measure",
            ListMetric::MMeasure => "m_measure",
            ListMetric::DocContribution => "doc_contribution",
            ListMetric::Rdc => "rdc",
        }
    }

    /// Computes this metric for one query.
    pub fn compute(
        &self,
        query_id: u32,
        reference: &[&str],
        alternate: &[&str],
        oracle: &dyn RelevanceOracle,
    ) -> Result<f64, ComparisonError> {
        Ok(match self {
            ListMetric::Overlap => metrics::overlap(reference, alternate),
            ListMetric::Jaccard => metrics::jaccard(reference, alternate),
            ListMetric::FMeasure => metrics::f_measure(reference, alternate)?,
            ListMetric::GMeasure => metrics::g_measure(reference, alternate),
            ListMetric::MMeasure => metrics::m_measure(reference, alternate),
            ListMetric::DocContribution => metrics::doc_contribution(reference, alternate),
            ListMetric::Rdc => metrics::rdc(reference, alternate, |doc| {
                oracle.is_relevant(query_id, doc)
            })?,
        })
    }
}

impl fmt::Display for ListMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ListMetric {
    type Err = ComparisonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ListMetric::all()
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ComparisonError::UnknownMetric(s.to_string()))
    }
}

/// Formats metric values as `%.5f` columns separated by tabs.
pub fn format_row(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.5}"))
        .collect::<Vec<_>>()
        .join("\t")
}

/// Computes a fixed set of metrics.
#[derive(Debug, Clone)]
pub struct ResultListComparator {
    metrics: Vec<ListMetric>,
}

impl ResultListComparator {
    /// Creates a comparator computing `metrics` in the given order.
    pub fn new(metrics: Vec<ListMetric>) -> Self {
        Self { metrics }
    }

    /// Configured metrics.
    pub fn metrics(&self) -> &[ListMetric] {
        &self.metrics
    }

    /// Compares two lists for one query; values follow [`Self::metrics`].
    pub fn compare(
        &self,
        query_id: u32,
        reference: &RankedList,
        alternate: &RankedList,
        oracle: &dyn RelevanceOracle,
    ) -> Result<Vec<f64>, ComparisonError> {
        let r = reference.doc_ids();
        let a = alternate.doc_ids();
        self.metrics
            .iter()
            .map(|m| m.compute(query_id, &r, &a, oracle))
            .collect()
    }

    /// Compares two runs query by query.
    ///
    /// Every query of the reference run is compared; a query missing from
    /// the alternate run is compared against an empty list.
    pub fn compare_runs(
        &self,
        reference: &RunFile,
        alternate: &RunFile,
        oracle: &dyn RelevanceOracle,
    ) -> Result<RunComparison, ComparisonError> {
        let empty = RankedList::default();
        let mut rows = Vec::with_capacity(reference.lists.len());
        for (&query_id, list) in &reference.lists {
            let other = alternate.list(query_id).unwrap_or(&empty);
            rows.push(QueryComparison {
                query_id,
                values: self.compare(query_id, list, other, oracle)?,
            });
        }

        let means = self
            .metrics
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let mean = if rows.is_empty() {
                    0.0
                } else {
                    rows.iter().map(|r| r.values[i]).sum::<f64>() / rows.len() as f64
                };
                (m.name().to_string(), mean)
            })
            .collect();

        Ok(RunComparison {
            metrics: self.metrics.clone(),
            rows,
            means,
        })
    }
}

/// Metric values for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryComparison {
    /// Query id
    pub query_id: u32,
    /// One value per metric
    pub values: Vec<f64>,
}

/// Per-query values and per-metric means for two runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunComparison {
    /// Metrics, in column order
    pub metrics: Vec<ListMetric>,
    /// Rows ordered by query id
    pub rows: Vec<QueryComparison>,
    /// Mean of every metric over the rows
    pub means: Vec<(String, f64)>,
}
