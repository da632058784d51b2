//! Divergence-from-randomness and information-based models.
//!
//! All functions receive `tf > 0` and `dl > 0`; flooring of negative or
//! undefined values happens in the caller. Logarithms are base 2.

use super::BackgroundStatistics;
use std::f64::consts::{LN_2, PI};

/// 1 / ln(2), i.e. log2(e).
const REC_LOG_2_OF_E: f64 = 1.0 / LN_2;

/// Normalization 2: term frequency rescaled to the average document length.
fn normalization_2(tf: f64, dl: f64, avg_dl: f64, c: f64) -> f64 {
    tf * (1.0 + c * avg_dl / dl).log2()
}

/// DPH: hypergeometric model with Popper normalization.
pub(super) fn dph(tf: f64, dl: f64, bg: &BackgroundStatistics) -> f64 {
    let f = tf / dl;
    let norm = (1.0 - f) * (1.0 - f) / (tf + 1.0);
    norm * (tf * ((tf * bg.avg_doc_length() / dl) * (bg.doc_count() / bg.collection_freq())).log2()
        + 0.5 * (2.0 * PI * tf * (1.0 - f)).log2())
}

/// DLH13: hypergeometric model with Laplace normalization.
pub(super) fn dlh13(tf: f64, dl: f64, bg: &BackgroundStatistics) -> f64 {
    let f = tf / dl;
    (tf * ((tf * bg.avg_doc_length() / dl) * (bg.doc_count() / bg.collection_freq())).log2()
        + 0.5 * (2.0 * PI * tf * (1.0 - f)).log2())
        / (tf + 0.5)
}

/// DFRee: parameter-free model comparing prior and posterior term probabilities.
pub(super) fn dfree(tf: f64, dl: f64, bg: &BackgroundStatistics) -> f64 {
    let prior = tf / dl;
    let posterior = (tf + 1.0) / (dl + 1.0);
    let inv_prior_collection = bg.total_terms() / bg.collection_freq();
    let norm = tf * (posterior / prior).log2();

    norm * (tf * -(prior * inv_prior_collection).log2()
        + (tf + 1.0) * (posterior * inv_prior_collection).log2()
        + 0.5 * (posterior / prior).log2())
}

/// DFIC: divergence from independence with chi-square saturation.
pub(super) fn dfic(tf: f64, dl: f64, bg: &BackgroundStatistics) -> f64 {
    let expected = bg.collection_freq() * dl / bg.total_terms();
    if tf <= expected {
        return 0.0;
    }
    let measure = (tf - expected) * (tf - expected) / expected;
    (measure + 1.0).log2()
}

/// PL2: Poisson randomness, Laplace after-effect, normalization 2.
pub(super) fn pl2(tf: f64, dl: f64, bg: &BackgroundStatistics, c: f64) -> f64 {
    let tfn = normalization_2(tf, dl, bg.avg_doc_length(), c);
    if tfn <= 0.0 {
        return 0.0;
    }
    let lambda = bg.collection_freq() / bg.doc_count();
    let norm = 1.0 / (tfn + 1.0);

    norm * (tfn * (1.0 / lambda).log2()
        + lambda * REC_LOG_2_OF_E
        + 0.5 * (2.0 * PI * tfn).log2()
        + tfn * (tfn.log2() - REC_LOG_2_OF_E))
}

/// LGD: log-logistic information model, normalization 2.
pub(super) fn lgd(tf: f64, dl: f64, bg: &BackgroundStatistics, c: f64) -> f64 {
    let tfn = normalization_2(tf, dl, bg.avg_doc_length(), c);
    let freq = bg.doc_freq() / bg.doc_count();
    ((freq + tfn) / freq).log2()
}
