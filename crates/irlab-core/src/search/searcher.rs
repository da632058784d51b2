//! Term-at-a-time query execution over an [`Index`].
//!
//! Scores are accumulated per document across the query's postings lists,
//! each term weighted by the active [`ScoringModel`] and multiplied by its
//! query-term frequency. Under [`Operator::And`] only documents matching
//! every distinct term survive.
//!
//! Results are ordered by score descending, then by document number
//! ascending, so identical inputs always produce identical rankings.

use super::explanation::{Explanation, TermContribution};
use super::types::{AnalyzedQuery, Hit, Operator};
use crate::error::SearchError;
use crate::index::{DocNum, DocumentStatistics, Index};
use crate::scoring::{BackgroundStatistics, ScoringContext, ScoringModel};
use std::collections::HashMap;
use std::sync::Arc;

/// Executes analyzed queries against a shared read-only index.
#[derive(Clone)]
pub struct Searcher {
    index: Arc<dyn Index>,
}

impl Searcher {
    /// Creates a searcher over `index`.
    pub fn new(index: Arc<dyn Index>) -> Self {
        Self { index }
    }

    /// The underlying index.
    pub fn index(&self) -> &dyn Index {
        self.index.as_ref()
    }

    fn document_stats(&self, doc: DocNum) -> Result<DocumentStatistics, SearchError> {
        self.index.document_stats(doc).ok_or_else(|| {
            SearchError::DataConsistency(format!(
                "postings reference document {} outside the index",
                doc.as_u32()
            ))
        })
    }

    /// Returns the top `k` hits for `query`.
    pub fn search(
        &self,
        query: &AnalyzedQuery,
        model: &ScoringModel,
        operator: Operator,
        k: usize,
    ) -> Result<Vec<Hit>, SearchError> {
        if query.terms.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let collection = self.index.collection_stats();
        let ctx = ScoringContext::for_query(query.word_count);
        let mut accumulators: HashMap<DocNum, (f64, usize)> = HashMap::new();

        for qt in &query.terms {
            let Some(term) = self.index.term_stats(&qt.term) else {
                if operator == Operator::And {
                    return Ok(Vec::new());
                }
                continue;
            };
            let background = BackgroundStatistics { term, collection };
            for posting in self.index.postings(&qt.term) {
                let stats = self.document_stats(posting.doc)?;
                let weight = model.score(f64::from(posting.freq), &stats, &background, &ctx)
                    * f64::from(qt.qtf);
                let acc = accumulators.entry(posting.doc).or_insert((0.0, 0));
                acc.0 += weight;
                acc.1 += 1;
            }
        }

        let required = query.terms.len();
        let mut hits: Vec<Hit> = accumulators
            .into_iter()
            .filter(|(_, (_, matched))| operator == Operator::Or || *matched == required)
            .map(|(doc, (score, _))| Hit { doc, score })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.doc.cmp(&b.doc)));
        hits.truncate(k);
        Ok(hits)
    }

    /// Breaks the score of `doc` down into per-term contributions.
    ///
    /// Only terms occurring in the document are listed, in query order.
    pub fn explain(
        &self,
        query: &AnalyzedQuery,
        model: &ScoringModel,
        doc: DocNum,
    ) -> Result<Explanation, SearchError> {
        let collection = self.index.collection_stats();
        let stats = self.document_stats(doc)?;
        let ctx = ScoringContext::for_query(query.word_count);

        let mut contributions = Vec::new();
        for qt in &query.terms {
            let freq = self.index.term_frequency(&qt.term, doc);
            if freq == 0 {
                continue;
            }
            let term = self.index.term_stats(&qt.term).ok_or_else(|| {
                SearchError::DataConsistency(format!(
                    "term {:?} has postings but no statistics",
                    qt.term
                ))
            })?;
            let background = BackgroundStatistics { term, collection };
            let weight =
                model.score(f64::from(freq), &stats, &background, &ctx) * f64::from(qt.qtf);
            contributions.push(TermContribution {
                term: qt.term.clone(),
                freq,
                weight,
            });
        }

        Ok(Explanation {
            doc,
            doc_length: stats.length,
            score: contributions.iter().map(|c| c.weight).sum(),
            contributions,
        })
    }
}
