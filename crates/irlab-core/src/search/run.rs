//! TREC run files.
//!
//! # Format
//!
//! One line per retrieved document, tab separated:
//!
//! ```text
//! <qid>  Q0  <docid>  <rank>  <score>  <runTag>
//! ```
//!
//! A query with no hits is written as a single fallback line
//! `<qid> Q0 <fallbackDocId> 1 0 <runTag>` so per-query averages stay
//! comparable across models.

use super::types::{Operator, QueryPart, RankedEntry, RankedList};
use crate::error::RunFileError;
use crate::scoring::ScoringModel;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::Write;
use std::path::Path;

/// Identifier of one (model, field, index, operator, part) run.
///
/// Used both as the file stem and as the sixth column of every record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RunTag(String);

impl RunTag {
    /// Builds `<model>_<field>_<indexTag>_<OPERATOR>_<part>`.
    pub fn new(
        model: &ScoringModel,
        field: &str,
        index_tag: &str,
        operator: Operator,
        part: QueryPart,
    ) -> Self {
        Self(format!(
            "{}_{}_{}_{}_{}",
            model.name().replace(' ', "_"),
            field,
            index_tag,
            operator,
            part
        ))
    }

    /// The tag text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<runTag>.txt`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, crate::config::RUN_FILE_EXTENSION)
    }
}

impl fmt::Display for RunTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a [`RunWriter::write_query`] call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryRecords {
    /// This many ranked records were written
    Ranked(usize),
    /// The fallback record was written
    Fallback,
}

/// Streams ranked lists into a run file.
///
/// Records are flushed one by one, so a crash leaves every completed line
/// visible on disk.
pub struct RunWriter<W: Write> {
    out: W,
    run_tag: RunTag,
    fallback_doc_id: String,
}

impl<W: Write> RunWriter<W> {
    /// Creates a writer for `run_tag`.
    pub fn new(out: W, run_tag: RunTag, fallback_doc_id: impl Into<String>) -> Self {
        Self {
            out,
            run_tag,
            fallback_doc_id: fallback_doc_id.into(),
        }
    }

    /// Writes one query's records in rank order, or the fallback record.
    pub fn write_query(
        &mut self,
        query_id: u32,
        entries: &[RankedEntry],
    ) -> std::io::Result<QueryRecords> {
        if entries.is_empty() {
            writeln!(
                self.out,
                "{}\tQ0\t{}\t1\t0\t{}",
                query_id, self.fallback_doc_id, self.run_tag
            )?;
            self.out.flush()?;
            return Ok(QueryRecords::Fallback);
        }

        for (i, entry) in entries.iter().enumerate() {
            writeln!(
                self.out,
                "{}\tQ0\t{}\t{}\t{}\t{}",
                query_id,
                entry.doc_id,
                i + 1,
                entry.score,
                self.run_tag
            )?;
            self.out.flush()?;
        }
        Ok(QueryRecords::Ranked(entries.len()))
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// A run file read back from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunFile {
    /// Run tag of the first record (empty for an empty file)
    pub run_tag: String,
    /// Ranked lists by query id, entries in file order
    pub lists: BTreeMap<u32, RankedList>,
}

impl RunFile {
    /// Reads and parses a run file.
    pub fn read(path: &Path) -> Result<Self, RunFileError> {
        let content = std::fs::read_to_string(path).map_err(|e| RunFileError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parses run-file text. Columns may be separated by any whitespace.
    pub fn parse(content: &str) -> Result<Self, RunFileError> {
        let mut run = RunFile::default();
        let mut seen: HashSet<(u32, String)> = HashSet::new();

        for (i, line) in content.lines().enumerate() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }
            let malformed = |message: String| RunFileError::Malformed {
                line: i + 1,
                message,
            };
            if parts.len() != 6 {
                return Err(malformed(format!("expected 6 columns, found {}", parts.len())));
            }
            let qid: u32 = parts[0]
                .parse()
                .map_err(|_| malformed(format!("invalid query id {:?}", parts[0])))?;
            let score: f64 = parts[4]
                .parse()
                .map_err(|_| malformed(format!("invalid score {:?}", parts[4])))?;
            if !seen.insert((qid, parts[2].to_string())) {
                return Err(malformed(format!(
                    "document {} listed twice for query {}",
                    parts[2], qid
                )));
            }
            if run.run_tag.is_empty() {
                run.run_tag = parts[5].to_string();
            }
            run.lists.entry(qid).or_default().entries.push(RankedEntry {
                doc_id: parts[2].to_string(),
                score,
            });
        }
        Ok(run)
    }

    /// The list for `query_id`, if present.
    pub fn list(&self, query_id: u32) -> Option<&RankedList> {
        self.lists.get(&query_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag() -> RunTag {
        RunTag::new(
            &ScoringModel::BM25_DEFAULT,
            "contents",
            "KStem",
            Operator::Or,
            QueryPart::ALL,
        )
    }

    fn entry(doc_id: &str, score: f64) -> RankedEntry {
        RankedEntry {
            doc_id: doc_id.to_string(),
            score,
        }
    }

    #[test]
    fn test_run_tag_format() {
        assert_eq!(tag().as_str(), "BM25k1.2b0.75_contents_KStem_OR_all");
        assert_eq!(tag().file_name(), "BM25k1.2b0.75_contents_KStem_OR_all.txt");
        let part = RunTag::new(
            &ScoringModel::DPH,
            "contents",
            "Snowball",
            Operator::And,
            QueryPart::new(2),
        );
        assert_eq!(part.as_str(), "DPH_contents_Snowball_AND_2");
    }

    #[test]
    fn test_write_ranked_and_fallback() {
        let mut writer = RunWriter::new(Vec::new(), tag(), "clueweb09-en0000-00-00000");
        let ranked = writer
            .write_query(101, &[entry("d1", 2.5), entry("d2", 1.25)])
            .unwrap();
        let fallback = writer.write_query(102, &[]).unwrap();
        assert_eq!(ranked, QueryRecords::Ranked(2));
        assert_eq!(fallback, QueryRecords::Fallback);

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "101\tQ0\td1\t1\t2.5\tBM25k1.2b0.75_contents_KStem_OR_all");
        assert_eq!(lines[1], "101\tQ0\td2\t2\t1.25\tBM25k1.2b0.75_contents_KStem_OR_all");
        assert_eq!(
            lines[2],
            "102\tQ0\tclueweb09-en0000-00-00000\t1\t0\tBM25k1.2b0.75_contents_KStem_OR_all"
        );
    }

    #[test]
    fn test_parse_preserves_file_order() {
        let run =
            RunFile::parse("5 Q0 b 1 3.0 tag\n5 Q0 a 2 2.0 tag\n\n2 Q0 c 1 1.0 tag\n").unwrap();
        assert_eq!(run.run_tag, "tag");
        assert_eq!(run.list(5).unwrap().doc_ids(), vec!["b", "a"]);
        assert_eq!(run.list(2).unwrap().len(), 1);
        assert!(run.list(9).is_none());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            RunFile::parse("5 Q0 b 1 3.0\n"),
            Err(RunFileError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            RunFile::parse("5 Q0 b 1 x tag\n"),
            Err(RunFileError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            RunFile::parse("5 Q0 b 1 1 tag\n5 Q0 b 2 1 tag\n"),
            Err(RunFileError::Malformed { line: 2, .. })
        ));
    }
}
