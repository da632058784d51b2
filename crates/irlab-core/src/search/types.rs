use crate::error::ConfigError;
use crate::index::{Analyzer, DocNum};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// One information need: identifier, raw text and optional judgments.
///
/// Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Topic number
    pub id: u32,
    /// Raw query text
    pub text: String,
    /// Relevance grades by external document id (empty if unjudged)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub judgments: HashMap<String, i32>,
}

impl Query {
    /// Creates an unjudged query.
    pub fn new(id: u32, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            judgments: HashMap::new(),
        }
    }

    /// Relevance grade of `doc_id`; unjudged documents grade 0.
    pub fn judge(&self, doc_id: &str) -> i32 {
        self.judgments.get(doc_id).copied().unwrap_or(0)
    }
}

/// Default conjunction between query terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Every term must match
    #[serde(rename = "AND")]
    And,
    /// Any term may match
    #[serde(rename = "OR")]
    Or,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::And => f.write_str("AND"),
            Operator::Or => f.write_str("OR"),
        }
    }
}

impl FromStr for Operator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Operator::And),
            "OR" => Ok(Operator::Or),
            _ => Err(ConfigError::UnknownOperator(s.to_string())),
        }
    }
}

/// Which slice of the query to search: the whole query, or its n-th token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryPart(usize);

impl QueryPart {
    /// The whole query.
    pub const ALL: QueryPart = QueryPart(0);

    /// Part `n`; `0` means the whole query, `n >= 1` the n-th token.
    pub fn new(n: usize) -> Self {
        Self(n)
    }

    /// Raw part number.
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl fmt::Display for QueryPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            f.write_str("all")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A distinct query term with its frequency in the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTerm {
    /// Analyzed term
    pub term: String,
    /// Occurrences in the query
    pub qtf: u32,
}

/// Query after analysis, ready to be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedQuery {
    /// Topic number
    pub id: u32,
    /// Distinct terms in first-occurrence order
    pub terms: Vec<QueryTerm>,
    /// Number of analyzed tokens (duplicates included)
    pub word_count: usize,
}

impl AnalyzedQuery {
    /// Analyzes `query` and selects `part`.
    ///
    /// Returns `None` when the query has no token for the requested part.
    pub fn analyze(query: &Query, analyzer: &dyn Analyzer, part: QueryPart) -> Option<Self> {
        let tokens = analyzer.analyze(&query.text);
        let selected: Vec<String> = match part.as_usize() {
            0 => tokens,
            n => vec![tokens.into_iter().nth(n - 1)?],
        };

        let mut terms: Vec<QueryTerm> = Vec::new();
        for token in &selected {
            match terms.iter_mut().find(|t| &t.term == token) {
                Some(existing) => existing.qtf += 1,
                None => terms.push(QueryTerm {
                    term: token.clone(),
                    qtf: 1,
                }),
            }
        }

        Some(Self {
            id: query.id,
            terms,
            word_count: selected.len(),
        })
    }
}

/// One retrieved document before it is resolved to an external id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Internal document number
    pub doc: DocNum,
    /// Retrieval score
    pub score: f64,
}

/// One entry of a ranked list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// External document identifier
    pub doc_id: String,
    /// Retrieval score
    pub score: f64,
}

/// Ranked list for one query; rank is position + 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedList {
    /// Entries in rank order
    pub entries: Vec<RankedEntry>,
}

impl RankedList {
    /// Builds a list from document ids in rank order (scores set to 0).
    pub fn from_doc_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: ids
                .into_iter()
                .map(|id| RankedEntry {
                    doc_id: id.into(),
                    score: 0.0,
                })
                .collect(),
        }
    }

    /// Document ids in rank order.
    pub fn doc_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.doc_id.as_str()).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` for an empty list.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
