//! Index and analyzer collaborators.
//!
//! The searcher only needs read access to term statistics, postings and
//! per-document statistics. Anything that can answer those questions can
//! implement [`Index`]; [`InMemoryIndex`] is the reference implementation used
//! by the CLI (built from a JSONL corpus) and by tests.
//!
//! An index is opened once, never written during an experiment, and shared
//! across worker threads through an `Arc<dyn Index>`.

pub mod analyzer;
pub mod corpus;
pub mod memory;

pub use analyzer::{Analyzer, SimpleAnalyzer};
pub use corpus::{load_jsonl_corpus, CorpusDocument};
pub use memory::{InMemoryIndex, InMemoryIndexBuilder};

use serde::{Deserialize, Serialize};

/// Internal document number, dense and assigned in insertion order.
///
/// Postings are sorted by this number, which also serves as the
/// deterministic tie-break between equally scored documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocNum(u32);

impl DocNum {
    /// Creates a document number from its raw value.
    pub fn from_u32(n: u32) -> Self {
        Self(n)
    }

    /// Returns the raw value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub(crate) fn as_index(&self) -> usize {
        self.0 as usize
    }
}

/// Collection-wide statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollectionStatistics {
    /// Number of documents
    pub doc_count: u64,
    /// Total number of tokens across all documents
    pub total_terms: u64,
}

impl CollectionStatistics {
    /// Average document length in tokens (0 for an empty collection).
    pub fn avg_doc_length(&self) -> f64 {
        if self.doc_count == 0 {
            0.0
        } else {
            self.total_terms as f64 / self.doc_count as f64
        }
    }
}

/// Statistics of one term across the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermStatistics {
    /// Number of documents containing the term
    pub doc_freq: u64,
    /// Total occurrences of the term in the collection
    pub total_term_freq: u64,
}

/// Statistics of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStatistics {
    /// Length in tokens
    pub length: u32,
    /// Number of distinct terms
    pub unique_terms: u32,
}

/// One entry of a postings list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Document containing the term
    pub doc: DocNum,
    /// Occurrences of the term in the document
    pub freq: u32,
}

/// Read-only view of an inverted index.
pub trait Index: Send + Sync {
    /// Collection-wide statistics.
    fn collection_stats(&self) -> CollectionStatistics;

    /// Statistics for `term`, or `None` if the term never occurs.
    fn term_stats(&self, term: &str) -> Option<TermStatistics>;

    /// Postings for `term`, sorted ascending by document number.
    fn postings(&self, term: &str) -> &[Posting];

    /// Statistics for `doc`, or `None` if the number is out of range.
    fn document_stats(&self, doc: DocNum) -> Option<DocumentStatistics>;

    /// External (collection) identifier of `doc`.
    fn external_id(&self, doc: DocNum) -> Option<&str>;

    /// Number of documents in the index.
    fn num_docs(&self) -> usize;

    /// Frequency of `term` in `doc` (0 if absent).
    fn term_frequency(&self, term: &str, doc: DocNum) -> u32 {
        let postings = self.postings(term);
        postings
            .binary_search_by_key(&doc, |p| p.doc)
            .map(|i| postings[i].freq)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avg_doc_length() {
        let stats = CollectionStatistics {
            doc_count: 4,
            total_terms: 10,
        };
        assert!((stats.avg_doc_length() - 2.5).abs() < 1e-9);

        let empty = CollectionStatistics {
            doc_count: 0,
            total_terms: 0,
        };
        assert_eq!(empty.avg_doc_length(), 0.0);
    }

    #[test]
    fn test_doc_num_ordering() {
        assert!(DocNum::from_u32(1) < DocNum::from_u32(2));
        assert_eq!(DocNum::from_u32(7).as_u32(), 7);
    }
}
