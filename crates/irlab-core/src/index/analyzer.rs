//! Text analysis.

/// Maps raw text to a token sequence.
///
/// The same analyzer must be used for documents and queries.
pub trait Analyzer: Send + Sync {
    /// Tokenizes `text`.
    fn analyze(&self, text: &str) -> Vec<String>;
}

/// Lowercases and splits on every non-alphanumeric character.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleAnalyzer;

impl Analyzer for SimpleAnalyzer {
    fn analyze(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect()
    }
}
