//! In-memory inverted index.
//!
//! Documents are analyzed once at build time. Document numbers follow
//! insertion order, so postings lists are sorted by construction.
//!
//! # Example
//!
//! ```ignore
//! let mut builder = InMemoryIndexBuilder::new(SimpleAnalyzer);
//! builder.add_document("doc-1", "the quick brown fox")?;
//! builder.add_document("doc-2", "the lazy dog")?;
//! let index = builder.build();
//! assert_eq!(index.num_docs(), 2);
//! ```

use super::{
    Analyzer, CollectionStatistics, DocNum, DocumentStatistics, Index, Posting, TermStatistics,
};
use crate::error::SearchError;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct StoredDocument {
    external_id: String,
    stats: DocumentStatistics,
}

/// Immutable inverted index held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndex {
    documents: Vec<StoredDocument>,
    postings: HashMap<String, Vec<Posting>>,
    term_stats: HashMap<String, TermStatistics>,
    total_terms: u64,
}

impl Index for InMemoryIndex {
    fn collection_stats(&self) -> CollectionStatistics {
        CollectionStatistics {
            doc_count: self.documents.len() as u64,
            total_terms: self.total_terms,
        }
    }

    fn term_stats(&self, term: &str) -> Option<TermStatistics> {
        self.term_stats.get(term).copied()
    }

    fn postings(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    fn document_stats(&self, doc: DocNum) -> Option<DocumentStatistics> {
        self.documents.get(doc.as_index()).map(|d| d.stats)
    }

    fn external_id(&self, doc: DocNum) -> Option<&str> {
        self.documents
            .get(doc.as_index())
            .map(|d| d.external_id.as_str())
    }

    fn num_docs(&self) -> usize {
        self.documents.len()
    }
}

/// Accumulates documents for an [`InMemoryIndex`].
pub struct InMemoryIndexBuilder<A: Analyzer> {
    analyzer: A,
    index: InMemoryIndex,
}

impl<A: Analyzer> InMemoryIndexBuilder<A> {
    /// Creates an empty builder using `analyzer` for every document.
    pub fn new(analyzer: A) -> Self {
        Self {
            analyzer,
            index: InMemoryIndex::default(),
        }
    }

    /// Analyzes and adds one document, returning its document number.
    ///
    /// Fails if the document count or the document's length does not fit
    /// in 32 bits; the index is left unchanged.
    pub fn add_document(
        &mut self,
        external_id: impl Into<String>,
        text: &str,
    ) -> Result<DocNum, SearchError> {
        let doc = DocNum::from_u32(checked_u32(self.index.documents.len(), "document count")?);
        let tokens = self.analyzer.analyze(text);
        // term frequencies and distinct terms are bounded by the length
        let length = checked_u32(tokens.len(), "document length")?;

        // Preserve first-occurrence order so builds are reproducible.
        let mut counts: Vec<(String, u32)> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for token in &tokens {
            match positions.get(token.as_str()) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    positions.insert(token.as_str(), counts.len());
                    counts.push((token.clone(), 1));
                }
            }
        }

        let unique_terms = checked_u32(counts.len(), "distinct terms")?;

        for (term, freq) in &counts {
            self.index
                .postings
                .entry(term.clone())
                .or_default()
                .push(Posting { doc, freq: *freq });
            let stats = self
                .index
                .term_stats
                .entry(term.clone())
                .or_insert(TermStatistics {
                    doc_freq: 0,
                    total_term_freq: 0,
                });
            stats.doc_freq += 1;
            stats.total_term_freq += u64::from(*freq);
        }

        self.index.total_terms += u64::from(length);
        self.index.documents.push(StoredDocument {
            external_id: external_id.into(),
            stats: DocumentStatistics {
                length,
                unique_terms,
            },
        });
        Ok(doc)
    }

    /// Number of documents added so far.
    pub fn len(&self) -> usize {
        self.index.documents.len()
    }

    /// Returns `true` if no document was added.
    pub fn is_empty(&self) -> bool {
        self.index.documents.is_empty()
    }

    /// Finishes the build.
    pub fn build(self) -> InMemoryIndex {
        self.index
    }
}

fn checked_u32(value: usize, what: &'static str) -> Result<u32, SearchError> {
    u32::try_from(value).map_err(|_| SearchError::IndexOverflow { what, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SimpleAnalyzer;

    fn small_index() -> InMemoryIndex {
        let mut builder = InMemoryIndexBuilder::new(SimpleAnalyzer);
        builder.add_document("d0", "apple banana apple").unwrap();
        builder.add_document("d1", "banana cherry").unwrap();
        builder.add_document("d2", "").unwrap();
        builder.build()
    }

    #[test]
    fn test_collection_and_term_stats() {
        let index = small_index();
        let stats = index.collection_stats();
        assert_eq!(stats.doc_count, 3);
        assert_eq!(stats.total_terms, 5);

        let banana = index.term_stats("banana").unwrap();
        assert_eq!(banana.doc_freq, 2);
        assert_eq!(banana.total_term_freq, 2);
        assert!(index.term_stats("durian").is_none());
    }

    #[test]
    fn test_postings_sorted_and_frequencies() {
        let index = small_index();
        let postings = index.postings("banana");
        assert_eq!(postings.len(), 2);
        assert!(postings[0].doc < postings[1].doc);
        assert_eq!(index.term_frequency("apple", DocNum::from_u32(0)), 2);
        assert_eq!(index.term_frequency("apple", DocNum::from_u32(1)), 0);
        assert!(index.postings("durian").is_empty());
    }

    #[test]
    fn test_document_stats_and_ids() {
        let index = small_index();
        let d0 = index.document_stats(DocNum::from_u32(0)).unwrap();
        assert_eq!(d0.length, 3);
        assert_eq!(d0.unique_terms, 2);
        assert_eq!(index.external_id(DocNum::from_u32(1)), Some("d1"));
        assert_eq!(index.document_stats(DocNum::from_u32(2)).unwrap().length, 0);
        assert!(index.external_id(DocNum::from_u32(9)).is_none());
    }

    #[test]
    fn test_add_document_returns_sequential_numbers() {
        let mut builder = InMemoryIndexBuilder::new(SimpleAnalyzer);
        assert_eq!(builder.add_document("a", "x").unwrap(), DocNum::from_u32(0));
        assert_eq!(builder.add_document("b", "y").unwrap(), DocNum::from_u32(1));
        assert_eq!(builder.len(), 2);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_counts_beyond_u32_are_rejected() {
        assert_eq!(checked_u32(7, "document length").unwrap(), 7);
        let too_long = u32::MAX as usize + 1;
        match checked_u32(too_long, "document length") {
            Err(SearchError::IndexOverflow { what, value }) => {
                assert_eq!(what, "document length");
                assert_eq!(value, too_long);
            }
            other => panic!("expected overflow, got {other:?}"),
        }
    }
}
