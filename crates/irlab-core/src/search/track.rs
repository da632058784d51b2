//! Track loading: topics files and TREC relevance judgments.
//!
//! Topics use one `<id>:<query text>` entry per line. Blank lines and lines
//! starting with `#` or `//` are ignored, so withdrawn topics can stay in the
//! file commented out.
//!
//! Qrels use the standard four-column format `qid iter docid grade`.

use super::types::Query;
use crate::error::ConfigError;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, instrument};

/// A named query set.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Track name (also the output directory name)
    pub name: String,
    /// Queries in file order
    pub queries: Vec<Query>,
}

impl Track {
    /// Creates a track from already loaded queries.
    pub fn new(name: impl Into<String>, queries: Vec<Query>) -> Self {
        Self {
            name: name.into(),
            queries,
        }
    }

    /// Loads topics and, if given, attaches judgments from a qrels file.
    ///
    /// Judgments for topics not in the topics file are ignored.
    #[instrument(skip_all, fields(track = %name))]
    pub fn load(name: &str, topics: &Path, qrels: Option<&Path>) -> Result<Self, ConfigError> {
        let mut queries = load_topics(topics)?;
        if let Some(qrels) = qrels {
            let mut judgments = load_qrels(qrels)?;
            for query in &mut queries {
                if let Some(j) = judgments.remove(&query.id) {
                    query.judgments = j;
                }
            }
        }
        debug!("Loaded {} queries", queries.len());
        Ok(Self::new(name, queries))
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::MissingPath(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parses a topics file.
pub fn load_topics(path: &Path) -> Result<Vec<Query>, ConfigError> {
    parse_topics(&read(path)?, path)
}

/// Parses topics text; `origin` is only used in error messages.
pub fn parse_topics(content: &str, origin: &Path) -> Result<Vec<Query>, ConfigError> {
    let mut queries = Vec::new();
    let mut seen = HashSet::new();

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        let parse_err = |message: String| ConfigError::Parse {
            path: origin.to_path_buf(),
            line: i + 1,
            message,
        };
        let (id, text) = line
            .split_once(':')
            .ok_or_else(|| parse_err("expected <id>:<query text>".to_string()))?;
        let id: u32 = id
            .trim()
            .parse()
            .map_err(|_| parse_err(format!("invalid topic id {:?}", id.trim())))?;
        if !seen.insert(id) {
            return Err(parse_err(format!("duplicate topic id {id}")));
        }
        queries.push(Query::new(id, text.trim()));
    }
    Ok(queries)
}

/// Parses a qrels file into per-topic judgments.
pub fn load_qrels(path: &Path) -> Result<HashMap<u32, HashMap<String, i32>>, ConfigError> {
    parse_qrels(&read(path)?, path)
}

/// Parses qrels text; `origin` is only used in error messages.
pub fn parse_qrels(
    content: &str,
    origin: &Path,
) -> Result<HashMap<u32, HashMap<String, i32>>, ConfigError> {
    let mut qrels: HashMap<u32, HashMap<String, i32>> = HashMap::new();

    for (i, line) in content.lines().enumerate() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        let parse_err = |message: &str| ConfigError::Parse {
            path: origin.to_path_buf(),
            line: i + 1,
            message: message.to_string(),
        };
        if parts.len() != 4 {
            return Err(parse_err("expected qid iter docid grade"));
        }
        let qid: u32 = parts[0].parse().map_err(|_| parse_err("invalid qid"))?;
        let grade: i32 = parts[3].parse().map_err(|_| parse_err("invalid grade"))?;
        qrels
            .entry(qid)
            .or_default()
            .insert(parts[2].to_string(), grade);
    }
    Ok(qrels)
}
