//! BM25, Dirichlet language model and the multi-aspect TF model.

use super::BackgroundStatistics;
use crate::index::DocumentStatistics;

/// Okapi BM25 with the Lucene idf.
pub(super) fn bm25(tf: f64, dl: f64, bg: &BackgroundStatistics, k1: f64, b: f64) -> f64 {
    let n = bg.doc_count();
    let df = bg.doc_freq();
    let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
    let avg_dl = bg.avg_doc_length();
    let length_norm = if avg_dl > 0.0 { dl / avg_dl } else { 1.0 };
    idf * tf * (k1 + 1.0) / (tf + k1 * (1.0 - b + b * length_norm))
}

/// Query likelihood with Dirichlet smoothing (natural log).
///
/// The collection model adds one to both counts, so unseen mass is never zero.
pub(super) fn dirichlet(tf: f64, dl: f64, bg: &BackgroundStatistics, mu: f64) -> f64 {
    let p_collection = (bg.collection_freq() + 1.0) / (bg.total_terms() + 1.0);
    (1.0 + tf / (mu * p_collection)).ln() + (mu / (dl + mu)).ln()
}

/// Multi-aspect TF (MATF).
///
/// Mixes a relative intra-document TF and a length-regularized TF, weighted
/// by the query length, then multiplies by an idf discounted by the term's
/// average elite frequency.
pub(super) fn matf(
    tf: f64,
    doc: &DocumentStatistics,
    bg: &BackgroundStatistics,
    query_length: usize,
) -> f64 {
    let dl = f64::from(doc.length);
    let unique = f64::from(doc.unique_terms.max(1));
    let avg_tf = dl / unique;

    let ritf = (1.0 + tf).log2() / (1.0 + avg_tf).log2();
    let lrtf = tf * (1.0 + bg.avg_doc_length() / dl).log2();
    let b_ritf = ritf / (1.0 + ritf);
    let b_lrtf = lrtf / (1.0 + lrtf);

    let qlen = query_length.max(1) as f64;
    let w = 2.0 / (1.0 + (1.0 + qlen).log2());
    let tff = w * b_ritf + (1.0 - w) * b_lrtf;

    let df = bg.doc_freq();
    let idf = ((bg.doc_count() + 1.0) / df).log2();
    let aef = bg.collection_freq() / df;
    let tdf = idf * aef / (1.0 + aef);

    tff * tdf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{CollectionStatistics, TermStatistics};

    fn bg(df: u64, cf: u64, n: u64, total: u64) -> BackgroundStatistics {
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

    #[test]
    fn test_bm25_b_zero_ignores_length() {
        let stats = bg(3, 6, 10, 100);
        let short = bm25(2.0, 5.0, &stats, 1.2, 0.0);
        let long = bm25(2.0, 50.0, &stats, 1.2, 0.0);
        assert!((short - long).abs() < 1e-12);
    }

    #[test]
    fn test_dirichlet_prefers_shorter_documents() {
        let stats = bg(3, 6, 10, 10_000);
        let short = dirichlet(2.0, 50.0, &stats, 2500.0);
        let long = dirichlet(2.0, 500.0, &stats, 2500.0);
        assert!(short > long);
    }

    #[test]
    fn test_matf_single_term_query_weight() {
        // |Q| = 1: w = 2 / (1 + log2 2) = 1, so only the RITF aspect counts.
        let stats = bg(10, 20, 100, 10_000);
        let doc = DocumentStatistics {
            length: 90,
            unique_terms: 30,
        };
        let s = matf(3.0, &doc, &stats, 1);
        let ritf = 4f64.log2() / 4f64.log2();
        let expected = ritf / (1.0 + ritf) * (101.0f64 / 10.0).log2() * 2.0 / 3.0;
        assert!((s - expected).abs() < 1e-12);
    }
}
