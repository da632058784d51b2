//! Per-term score breakdowns for verbose diagnostic runs.
//!
//! A verbose record is one tab-separated line per hit:
//!
//! ```text
//! <qid>  <docid>  <docLength>  <rank>  <score>  <model>  <judgment>  <term>(<freq>)=<weight> ...
//! ```
//!
//! Single-term queries print their one tuple without a trailing tab; longer
//! queries terminate every tuple with a tab.

use super::searcher::Searcher;
use super::types::{AnalyzedQuery, Hit, Operator, Query};
use crate::error::SearchError;
use crate::index::DocNum;
use crate::scoring::ScoringModel;
use serde::Serialize;
use std::io::Write;
use tracing::warn;

/// Weight contributed by one query term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermContribution {
    /// Analyzed term
    pub term: String,
    /// Occurrences in the document
    pub freq: u32,
    /// Weight after query-term-frequency scaling
    pub weight: f64,
}

/// Score of one document decomposed by term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    /// Explained document
    pub doc: DocNum,
    /// Document length in tokens
    pub doc_length: u32,
    /// Sum of the contributions
    pub score: f64,
    /// Matching terms in query order
    pub contributions: Vec<TermContribution>,
}

/// Explains hits and enforces the conjunctive consistency check.
pub struct ExplanationExtractor<'a> {
    searcher: &'a Searcher,
    model: ScoringModel,
    operator: Operator,
}

impl<'a> ExplanationExtractor<'a> {
    /// Creates an extractor for one (model, operator) run.
    pub fn new(searcher: &'a Searcher, model: ScoringModel, operator: Operator) -> Self {
        Self {
            searcher,
            model,
            operator,
        }
    }

    /// Explains `hit`.
    ///
    /// Returns `Ok(None)` when the breakdown cannot be computed for this
    /// document; the failure is logged and the caller moves on. Under AND
    /// every distinct query term must contribute, otherwise the run stops
    /// with [`SearchError::DataConsistency`].
    pub fn extract(
        &self,
        query: &AnalyzedQuery,
        hit: &Hit,
    ) -> Result<Option<Explanation>, SearchError> {
        let explanation = match self.searcher.explain(query, &self.model, hit.doc) {
            Ok(explanation) => explanation,
            Err(e) => {
                warn!(
                    "Skipping explanation for query {} document {}: {}",
                    query.id,
                    hit.doc.as_u32(),
                    e
                );
                return Ok(None);
            }
        };

        if self.operator == Operator::And && explanation.contributions.len() != query.terms.len() {
            return Err(SearchError::DataConsistency(format!(
                "explanation array size mismatch: {} exp: {}",
                query.terms.len(),
                explanation.contributions.len()
            )));
        }
        Ok(Some(explanation))
    }
}

/// Writes verbose diagnostic records.
pub struct VerboseWriter<W: Write> {
    out: W,
    model_name: String,
}

impl<W: Write> VerboseWriter<W> {
    /// Creates a writer labelling every record with `model`.
    pub fn new(out: W, model: &ScoringModel) -> Self {
        Self {
            out,
            model_name: model.name(),
        }
    }

    /// Writes one hit; `explanation` is `None` when the breakdown was skipped.
    pub fn write_record(
        &mut self,
        query: &Query,
        rank: usize,
        hit: &Hit,
        doc_id: &str,
        explanation: Option<&Explanation>,
        word_count: usize,
    ) -> std::io::Result<()> {
        let doc_length = explanation.map(|e| e.doc_length).unwrap_or(0);
        write!(
            self.out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t",
            query.id,
            doc_id,
            doc_length,
            rank,
            hit.score,
            self.model_name,
            query.judge(doc_id)
        )?;

        if let Some(explanation) = explanation {
            if word_count == 1 {
                if let Some(c) = explanation.contributions.first() {
                    write!(self.out, "{}({})={}", c.term, c.freq, explanation.score)?;
                }
            } else {
                for c in &explanation.contributions {
                    write!(self.out, "{}({})={}\t", c.term, c.freq, c.weight)?;
                }
            }
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}
