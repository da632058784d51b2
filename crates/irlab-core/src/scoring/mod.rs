//! Probabilistic ranking models.
//!
//! Every model is a pure function of one term's frequency in one document,
//! that document's statistics, and collection-wide background statistics.
//! Models are selected at configuration time through the [`ScoringModel`]
//! enum; there is no per-model mutable state, so one value can be shared by
//! any number of worker threads.
//!
//! # Models
//!
//! | Name | Family | Parameters |
//! |------|--------|------------|
//! | `BM25k1.2b0.75` | Okapi | k1, b |
//! | `DirichletLMc2500.0` | Language model | mu |
//! | `LGDc1.0` | Information-based (log-logistic) | c |
//! | `PL2c1.0` | DFR, Poisson + Laplace | c |
//! | `DPH` | DFR, hypergeometric, parameter-free | - |
//! | `DFIC` | Divergence from independence (chi-square) | - |
//! | `DFRee` | DFR, parameter-free | - |
//! | `DLH13` | DFR, hypergeometric, parameter-free | - |
//! | `MATF` | Multi-aspect TF | query length (from [`ScoringContext`]) |
//!
//! # Contract
//!
//! - `tf == 0` scores exactly `0.0`; the formula is never evaluated.
//! - Negative `tf`, or `tf > 0` in a zero-length document, panics. Those
//!   inputs mean the index and the caller disagree.
//! - Raw negative (or undefined) formula values are floored at `0.0`.
//!
//! # Example
//!
//! ```ignore
//! let model: ScoringModel = "PL2c1.0".parse()?;
//! let ctx = ScoringContext::for_query(3);
//! let weight = model.score(2.0, &doc_stats, &background, &ctx);
//! ```

mod classic;
mod dfr;

use crate::error::ConfigError;
use crate::index::{CollectionStatistics, DocumentStatistics, TermStatistics};
use std::fmt;
use std::str::FromStr;

/// Background statistics needed to weight one term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundStatistics {
    /// Statistics of the term being scored
    pub term: TermStatistics,
    /// Statistics of the whole collection
    pub collection: CollectionStatistics,
}

impl BackgroundStatistics {
    /// Number of documents (N).
    pub fn doc_count(&self) -> f64 {
        self.collection.doc_count as f64
    }

    /// Total tokens in the collection.
    pub fn total_terms(&self) -> f64 {
        self.collection.total_terms as f64
    }

    /// Average document length.
    pub fn avg_doc_length(&self) -> f64 {
        self.collection.avg_doc_length()
    }

    /// Documents containing the term (df).
    pub fn doc_freq(&self) -> f64 {
        self.term.doc_freq as f64
    }

    /// Collection frequency of the term (CF).
    pub fn collection_freq(&self) -> f64 {
        self.term.total_term_freq as f64
    }
}

/// Per-query state some models read.
///
/// Passed to every scoring call instead of being stored on the model, so
/// concurrent queries can never observe each other's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringContext {
    /// Number of query tokens (the overlap parameter)
    pub query_length: usize,
}

impl ScoringContext {
    /// Context for a query of `query_length` tokens.
    pub fn for_query(query_length: usize) -> Self {
        Self { query_length }
    }
}

/// A ranking formula with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoringModel {
    /// Okapi BM25
    BM25 {
        /// Term-frequency saturation
        k1: f64,
        /// Length normalization strength
        b: f64,
    },
    /// Query likelihood with Dirichlet smoothing
    DirichletLM {
        /// Smoothing mass
        mu: f64,
    },
    /// Log-logistic information-based model with normalization 2
    LGD {
        /// Length normalization parameter
        c: f64,
    },
    /// Poisson model with Laplace after-effect and normalization 2
    PL2 {
        /// Length normalization parameter
        c: f64,
    },
    /// Parameter-free hypergeometric DFR model
    DPH,
    /// Divergence from independence, chi-square saturation
    DFIC,
    /// Parameter-free DFR model
    DFRee,
    /// Parameter-free hypergeometric DFR model (Laplace-style)
    DLH13,
    /// Multi-aspect term frequency model
    MATF,
}

impl ScoringModel {
    /// BM25 with the usual parameters (k1 = 1.2, b = 0.75).
    pub const BM25_DEFAULT: ScoringModel = ScoringModel::BM25 { k1: 1.2, b: 0.75 };
    /// Dirichlet LM with mu = 2500.
    pub const DIRICHLET_DEFAULT: ScoringModel = ScoringModel::DirichletLM { mu: 2500.0 };
    /// LGD with c = 1.
    pub const LGD_DEFAULT: ScoringModel = ScoringModel::LGD { c: 1.0 };
    /// PL2 with c = 1.
    pub const PL2_DEFAULT: ScoringModel = ScoringModel::PL2 { c: 1.0 };

    /// The experiment's standard model set, in run order.
    pub fn standard_set() -> Vec<ScoringModel> {
        vec![
            Self::BM25_DEFAULT,
            Self::DIRICHLET_DEFAULT,
            Self::LGD_DEFAULT,
            Self::PL2_DEFAULT,
            ScoringModel::DPH,
            ScoringModel::DFIC,
            ScoringModel::DFRee,
            ScoringModel::DLH13,
        ]
    }

    /// Parameterized name, used as the run-tag stem (e.g. `BM25k1.2b0.75`).
    pub fn name(&self) -> String {
        match self {
            ScoringModel::BM25 { k1, b } => format!("BM25k{:?}b{:?}", k1, b),
            ScoringModel::DirichletLM { mu } => format!("DirichletLMc{:?}", mu),
            ScoringModel::LGD { c } => format!("LGDc{:?}", c),
            ScoringModel::PL2 { c } => format!("PL2c{:?}", c),
            ScoringModel::DPH => "DPH".to_string(),
            ScoringModel::DFIC => "DFIC".to_string(),
            ScoringModel::DFRee => "DFRee".to_string(),
            ScoringModel::DLH13 => "DLH13".to_string(),
            ScoringModel::MATF => "MATF".to_string(),
        }
    }

    /// Parameter-free family name used in score-file names (e.g. `Dirichlet`).
    pub fn short_name(&self) -> &'static str {
        match self {
            ScoringModel::BM25 { .. } => "BM25",
            ScoringModel::DirichletLM { .. } => "Dirichlet",
            ScoringModel::LGD { .. } => "LGD",
            ScoringModel::PL2 { .. } => "PL2",
            ScoringModel::DPH => "DPH",
            ScoringModel::DFIC => "DFIC",
            ScoringModel::DFRee => "DFRee",
            ScoringModel::DLH13 => "DLH13",
            ScoringModel::MATF => "MATF",
        }
    }

    /// Weight of one term occurring `tf` times in a document.
    ///
    /// # Panics
    ///
    /// Panics if `tf` is negative or not finite, or if `tf > 0` and the
    /// document length is zero.
    pub fn score(
        &self,
        tf: f64,
        doc: &DocumentStatistics,
        background: &BackgroundStatistics,
        ctx: &ScoringContext,
    ) -> f64 {
        assert!(
            tf.is_finite() && tf >= 0.0,
            "term frequency must be a non-negative finite number, got {tf}"
        );
        if tf == 0.0 {
            return 0.0;
        }
        assert!(
            doc.length > 0,
            "term frequency {tf} reported for a zero-length document"
        );
        assert!(
            background.term.doc_freq > 0 && background.term.total_term_freq > 0,
            "term occurs in a document but has empty collection statistics"
        );

        let dl = f64::from(doc.length);
        let raw = match *self {
            ScoringModel::BM25 { k1, b } => classic::bm25(tf, dl, background, k1, b),
            ScoringModel::DirichletLM { mu } => classic::dirichlet(tf, dl, background, mu),
            ScoringModel::LGD { c } => dfr::lgd(tf, dl, background, c),
            ScoringModel::PL2 { c } => dfr::pl2(tf, dl, background, c),
            ScoringModel::DPH => dfr::dph(tf, dl, background),
            ScoringModel::DFIC => dfr::dfic(tf, dl, background),
            ScoringModel::DFRee => dfr::dfree(tf, dl, background),
            ScoringModel::DLH13 => dfr::dlh13(tf, dl, background),
            ScoringModel::MATF => classic::matf(tf, doc, background, ctx.query_length),
        };
        floor(raw)
    }
}

fn floor(raw: f64) -> f64 {
    if raw.is_nan() || raw < 0.0 {
        0.0
    } else {
        raw
    }
}

impl fmt::Display for ScoringModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for ScoringModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let unknown = || ConfigError::UnknownModel(s.to_string());
        let param = |v: &str| -> Result<f64, ConfigError> {
            v.parse::<f64>()
                .ok()
                .filter(|x| x.is_finite() && *x >= 0.0)
                .ok_or_else(unknown)
        };

        let model = match s {
            "BM25" => Self::BM25_DEFAULT,
            "DirichletLM" | "Dirichlet" => Self::DIRICHLET_DEFAULT,
            "LGD" => Self::LGD_DEFAULT,
            "PL2" => Self::PL2_DEFAULT,
            "DPH" => ScoringModel::DPH,
            "DFIC" => ScoringModel::DFIC,
            "DFRee" => ScoringModel::DFRee,
            "DLH13" => ScoringModel::DLH13,
            "MATF" => ScoringModel::MATF,
            _ => {
                if let Some(rest) = s.strip_prefix("BM25k") {
                    let (k1, b) = rest.split_once('b').ok_or_else(unknown)?;
                    let b = param(b)?;
                    if b > 1.0 {
                        return Err(unknown());
                    }
                    ScoringModel::BM25 { k1: param(k1)?, b }
                } else if let Some(mu) = s.strip_prefix("DirichletLMc") {
                    ScoringModel::DirichletLM { mu: param(mu)? }
                } else if let Some(c) = s.strip_prefix("LGDc") {
                    ScoringModel::LGD { c: param(c)? }
                } else if let Some(c) = s.strip_prefix("PL2c") {
                    ScoringModel::PL2 { c: param(c)? }
                } else {
                    return Err(unknown());
                }
            }
        };
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn background(df: u64, cf: u64, n: u64, total: u64) -> BackgroundStatistics {
        BackgroundStatistics {
            term: TermStatistics {
                doc_freq: df,
                total_term_freq: cf,
            },
            collection: CollectionStatistics {
                doc_count: n,
                total_terms: total,
            },
        }
    }

    fn doc(length: u32, unique_terms: u32) -> DocumentStatistics {
        DocumentStatistics {
            length,
            unique_terms,
        }
    }

    fn all_models() -> Vec<ScoringModel> {
        let mut models = ScoringModel::standard_set();
        models.push(ScoringModel::MATF);
        models
    }

    #[test]
    fn test_zero_tf_scores_zero() {
        let bg = background(2, 5, 10, 100);
        let ctx = ScoringContext::for_query(2);
        for model in all_models() {
            assert_eq!(model.score(0.0, &doc(10, 5), &bg, &ctx), 0.0, "{model}");
            // Zero-length documents are fine when the term is absent.
            assert_eq!(model.score(0.0, &doc(0, 0), &bg, &ctx), 0.0, "{model}");
        }
    }

    #[test]
    fn test_scores_non_negative_and_finite() {
        let ctx = ScoringContext::for_query(3);
        let cases = [
            (1.0, doc(1, 1), background(1, 1, 1, 1)),
            (1.0, doc(50, 40), background(10, 12, 10, 500)),
            (7.0, doc(7, 1), background(3, 9, 20, 200)),
            (3.0, doc(400, 120), background(900, 5000, 1000, 100_000)),
        ];
        for model in all_models() {
            for (tf, d, bg) in &cases {
                let s = model.score(*tf, d, bg, &ctx);
                assert!(s.is_finite() && s >= 0.0, "{model} gave {s}");
            }
        }
    }

    #[test]
    fn test_df_equal_to_doc_count_is_finite() {
        // Term occurs in every document.
        let bg = background(10, 30, 10, 100);
        let ctx = ScoringContext::for_query(1);
        for model in all_models() {
            let s = model.score(3.0, &doc(10, 6), &bg, &ctx);
            assert!(s.is_finite(), "{model} gave {s}");
        }
    }

    #[test]
    fn test_bm25_known_value() {
        let bg = background(2, 4, 10, 100);
        let ctx = ScoringContext::for_query(1);
        let s = ScoringModel::BM25_DEFAULT.score(3.0, &doc(10, 5), &bg, &ctx);
        assert!((s - 2.3282357071).abs() < 1e-6, "got {s}");
    }

    #[test]
    fn test_lgd_known_value() {
        let bg = background(5, 10, 10, 80);
        let ctx = ScoringContext::for_query(1);
        let s = ScoringModel::LGD_DEFAULT.score(2.0, &doc(8, 4), &bg, &ctx);
        assert!((s - 5f64.log2()).abs() < 1e-9, "got {s}");
    }

    #[test]
    fn test_dfic_below_expectation_is_zero() {
        // expected = 10 * 10 / 100 = 1
        let bg = background(5, 10, 10, 100);
        let ctx = ScoringContext::for_query(1);
        assert_eq!(ScoringModel::DFIC.score(1.0, &doc(10, 5), &bg, &ctx), 0.0);
        let s = ScoringModel::DFIC.score(3.0, &doc(10, 5), &bg, &ctx);
        assert!((s - 5f64.log2()).abs() < 1e-9, "got {s}");
    }

    #[test]
    fn test_more_occurrences_score_higher() {
        let bg = background(20, 60, 1000, 100_000);
        let ctx = ScoringContext::for_query(2);
        for model in [
            ScoringModel::BM25_DEFAULT,
            ScoringModel::LGD_DEFAULT,
            ScoringModel::PL2_DEFAULT,
            ScoringModel::DLH13,
            ScoringModel::MATF,
        ] {
            let low = model.score(1.0, &doc(100, 60), &bg, &ctx);
            let high = model.score(4.0, &doc(100, 60), &bg, &ctx);
            assert!(high > low, "{model}: {high} <= {low}");
        }
    }

    #[test]
    fn test_matf_depends_on_query_length() {
        let bg = background(20, 60, 1000, 100_000);
        let doc = doc(300, 100);
        let short = ScoringModel::MATF.score(3.0, &doc, &bg, &ScoringContext::for_query(1));
        let long = ScoringModel::MATF.score(3.0, &doc, &bg, &ScoringContext::for_query(8));
        assert!((short - long).abs() > 1e-9);
    }

    #[test]
    fn test_dph_whole_document_term_is_zero_not_nan() {
        let bg = background(3, 9, 20, 200);
        let s = ScoringModel::DPH.score(5.0, &doc(5, 1), &bg, &ScoringContext::for_query(1));
        assert_eq!(s, 0.0);
    }

    #[test]
    #[should_panic(expected = "non-negative")]
    fn test_negative_tf_panics() {
        let bg = background(2, 5, 10, 100);
        ScoringModel::DPH.score(-1.0, &doc(10, 5), &bg, &ScoringContext::for_query(1));
    }

    #[test]
    #[should_panic(expected = "zero-length")]
    fn test_zero_length_document_panics() {
        let bg = background(2, 5, 10, 100);
        ScoringModel::PL2_DEFAULT.score(1.0, &doc(0, 0), &bg, &ScoringContext::for_query(1));
    }

    #[test]
    fn test_names() {
        assert_eq!(ScoringModel::BM25_DEFAULT.name(), "BM25k1.2b0.75");
        assert_eq!(ScoringModel::DIRICHLET_DEFAULT.name(), "DirichletLMc2500.0");
        assert_eq!(ScoringModel::LGD_DEFAULT.name(), "LGDc1.0");
        assert_eq!(ScoringModel::PL2_DEFAULT.name(), "PL2c1.0");
        assert_eq!(ScoringModel::DIRICHLET_DEFAULT.short_name(), "Dirichlet");
    }

    #[test]
    fn test_parse_names() {
        for model in all_models() {
            assert_eq!(model.name().parse::<ScoringModel>().unwrap(), model);
        }
        assert_eq!(
            "BM25k0.9b0.4".parse::<ScoringModel>().unwrap(),
            ScoringModel::BM25 { k1: 0.9, b: 0.4 }
        );
        assert_eq!("PL2".parse::<ScoringModel>().unwrap(), ScoringModel::PL2_DEFAULT);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("TFIDF".parse::<ScoringModel>().is_err());
        assert!("BM25kxb0.75".parse::<ScoringModel>().is_err());
        assert!("BM25k1.2b1.5".parse::<ScoringModel>().is_err());
        assert!("PL2c-1.0".parse::<ScoringModel>().is_err());
    }
}
