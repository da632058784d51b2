//! JSONL corpus loading.
//!
//! One JSON object per line: `{"doc_id": "clueweb09-en0000-00-00001", "text": "..."}`.
//! Blank lines are ignored; duplicate document identifiers are rejected.

use super::{Analyzer, InMemoryIndex, InMemoryIndexBuilder};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, instrument};

/// One corpus record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusDocument {
    /// External document identifier
    pub doc_id: String,
    /// Raw document text
    pub text: String,
}

/// Reads a JSONL corpus and builds an in-memory index from it.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_jsonl_corpus<A: Analyzer>(
    path: &Path,
    analyzer: A,
) -> Result<InMemoryIndex, ConfigError> {
    let file = std::fs::File::open(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut builder = InMemoryIndexBuilder::new(analyzer);
    let mut seen = HashSet::new();

    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: CorpusDocument = serde_json::from_str(&line).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            line: i + 1,
            message: e.to_string(),
        })?;
        if !seen.insert(doc.doc_id.clone()) {
            return Err(ConfigError::Parse {
                path: path.to_path_buf(),
                line: i + 1,
                message: format!("duplicate doc_id {}", doc.doc_id),
            });
        }
        builder
            .add_document(doc.doc_id, &doc.text)
            .map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                line: i + 1,
                message: e.to_string(),
            })?;
    }

    info!("Indexed {} documents", builder.len());
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Index, SimpleAnalyzer};
    use tempfile::TempDir;

    #[test]
    fn test_load_corpus() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corpus.jsonl");
        std::fs::write(
            &path,
            "{\"doc_id\":\"a\",\"text\":\"red fish\"}\n\n{\"doc_id\":\"b\",\"text\":\"blue fish\"}\n",
        )
        .unwrap();

        let index = load_jsonl_corpus(&path, SimpleAnalyzer).unwrap();
        assert_eq!(index.num_docs(), 2);
        assert_eq!(index.term_stats("fish").unwrap().doc_freq, 2);
    }

    #[test]
    fn test_duplicate_doc_id_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corpus.jsonl");
        std::fs::write(
            &path,
            "{\"doc_id\":\"a\",\"text\":\"x\"}\n{\"doc_id\":\"a\",\"text\":\"y\"}\n",
        )
        .unwrap();

        let err = load_jsonl_corpus(&path, SimpleAnalyzer).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_missing_corpus() {
        let err = load_jsonl_corpus(Path::new("/nonexistent/corpus.jsonl"), SimpleAnalyzer)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
