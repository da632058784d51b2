//! Similarity and divergence measures between two ranked lists.
//!
//! Every function takes document ids in rank order (reference first) and
//! ignores scores. Shared conventions:
//!
//! - two empty lists agree perfectly (`1.0`), except RDC which is a
//!   displacement and returns `0.0`;
//! - measures defined over common documents return `0.0` when there are
//!   none and `1.0` when there is exactly one.
//!
//! Ranks below are 0-based positions; "rank + 1" is the 1-based rank.

use crate::config::M_MEASURE_NORMALIZATION;
use crate::error::ComparisonError;
use std::collections::{HashMap, HashSet};

/// First-occurrence position of every document.
fn positions<'a>(list: &[&'a str]) -> HashMap<&'a str, usize> {
    let mut map = HashMap::with_capacity(list.len());
    for (i, doc) in list.iter().enumerate() {
        map.entry(*doc).or_insert(i);
    }
    map
}

/// Both lists restricted to their common documents, relative order kept.
fn restrict<'a>(
    reference: &[&'a str],
    alternate: &[&'a str],
) -> Result<(Vec<&'a str>, Vec<&'a str>), ComparisonError> {
    let ref_set: HashSet<&str> = reference.iter().copied().collect();
    let alt_set: HashSet<&str> = alternate.iter().copied().collect();
    let r: Vec<&str> = reference.iter().copied().filter(|d| alt_set.contains(d)).collect();
    let a: Vec<&str> = alternate.iter().copied().filter(|d| ref_set.contains(d)).collect();
    if r.len() != a.len() {
        return Err(ComparisonError::SizeMismatch {
            reference: r.len(),
            alternate: a.len(),
        });
    }
    Ok((r, a))
}

/// Common documents in reference order, plus the documents unique to each list.
struct Partition<'a> {
    common: Vec<&'a str>,
    only_reference: Vec<&'a str>,
    only_alternate: Vec<&'a str>,
}

fn partition<'a>(reference: &[&'a str], alternate: &[&'a str]) -> Partition<'a> {
    let ref_pos = positions(reference);
    let alt_pos = positions(alternate);
    let mut seen = HashSet::new();
    let mut common = Vec::new();
    let mut only_reference = Vec::new();
    for doc in reference {
        if !seen.insert(*doc) {
            continue;
        }
        if alt_pos.contains_key(doc) {
            common.push(*doc);
        } else {
            only_reference.push(*doc);
        }
    }
    let mut seen = HashSet::new();
    let only_alternate = alternate
        .iter()
        .copied()
        .filter(|d| seen.insert(*d) && !ref_pos.contains_key(d))
        .collect();
    Partition {
        common,
        only_reference,
        only_alternate,
    }
}

/// `|R ∩ A| / |R|`, over document sets.
pub fn overlap(reference: &[&str], alternate: &[&str]) -> f64 {
    let r: HashSet<&str> = reference.iter().copied().collect();
    let a: HashSet<&str> = alternate.iter().copied().collect();
    if r.is_empty() && a.is_empty() {
        return 1.0;
    }
    if r.is_empty() {
        return 0.0;
    }
    r.intersection(&a).count() as f64 / r.len() as f64
}

/// Jaccard coefficient `|R ∩ A| / |R ∪ A|`.
pub fn jaccard(reference: &[&str], alternate: &[&str]) -> f64 {
    let r: HashSet<&str> = reference.iter().copied().collect();
    let a: HashSet<&str> = alternate.iter().copied().collect();
    if r.is_empty() && a.is_empty() {
        return 1.0;
    }
    r.intersection(&a).count() as f64 / r.union(&a).count() as f64
}

/// Normalized Spearman footrule over the common documents.
///
/// Both lists are restricted to their common documents and re-ranked; the
/// footrule distance is divided by its maximum for that size.
pub fn f_measure(reference: &[&str], alternate: &[&str]) -> Result<f64, ComparisonError> {
    if reference.is_empty() && alternate.is_empty() {
        return Ok(1.0);
    }
    let (r, a) = restrict(reference, alternate)?;
    match r.len() {
        0 => return Ok(0.0),
        1 => return Ok(1.0),
        _ => {}
    }

    let s = r.len() as f64;
    let max_fr = if r.len() % 2 == 0 {
        0.5 * s * s
    } else {
        0.5 * (s - 1.0) * (s + 1.0)
    };
    let a_pos = positions(&a);
    let fr: usize = r
        .iter()
        .enumerate()
        .map(|(i, doc)| i.abs_diff(a_pos[doc]))
        .sum();
    Ok(1.0 - fr as f64 / max_fr)
}

/// Footrule extension that also penalizes documents found in only one list.
///
/// Normalized by `k(k + 1)` with `k` the reference length. Unlike the
/// F-measure it does not reach 0 for a reversed copy of the same list.
pub fn g_measure(reference: &[&str], alternate: &[&str]) -> f64 {
    if reference.is_empty() && alternate.is_empty() {
        return 1.0;
    }
    let parts = partition(reference, alternate);
    match parts.common.len() {
        0 => return 0.0,
        1 => return 1.0,
        _ => {}
    }

    let r_pos = positions(reference);
    let a_pos = positions(alternate);
    let k = reference.len() as f64;
    let z = parts.common.len() as f64;
    let max_f = k * (k + 1.0);

    let mut f = 2.0 * (k - z) * (k + 1.0);
    for doc in &parts.common {
        f += r_pos[doc].abs_diff(a_pos[doc]) as f64;
    }
    for doc in &parts.only_reference {
        f -= (r_pos[doc] + 1) as f64;
    }
    for doc in &parts.only_alternate {
        f -= (a_pos[doc] + 1) as f64;
    }
    1.0 - f / max_f
}

/// Reciprocal-rank divergence.
///
/// Normalized by [`M_MEASURE_NORMALIZATION`], an empirical constant; raw
/// divergences above it yield negative values, which are returned as is.
pub fn m_measure(reference: &[&str], alternate: &[&str]) -> f64 {
    if reference.is_empty() && alternate.is_empty() {
        return 1.0;
    }
    let parts = partition(reference, alternate);
    match parts.common.len() {
        0 => return 0.0,
        1 => return 1.0,
        _ => {}
    }

    let r_pos = positions(reference);
    let a_pos = positions(alternate);
    let floor = 1.0 / (reference.len() as f64 + 1.0);
    let rr = |pos: usize| 1.0 / (pos as f64 + 1.0);

    let mut m = 0.0;
    for doc in &parts.common {
        m += (rr(r_pos[doc]) - rr(a_pos[doc])).abs();
    }
    for doc in &parts.only_reference {
        m += rr(r_pos[doc]) - floor;
    }
    for doc in &parts.only_alternate {
        m += rr(a_pos[doc]) - floor;
    }
    1.0 - m / M_MEASURE_NORMALIZATION
}

/// Contribution of common documents, favouring those ranked high in the reference.
///
/// Each common document adds `1 - ln(rank + 1) / ln(|R|)`; the sum is
/// averaged over the reference length.
pub fn doc_contribution(reference: &[&str], alternate: &[&str]) -> f64 {
    if reference.is_empty() && alternate.is_empty() {
        return 1.0;
    }
    let parts = partition(reference, alternate);
    match parts.common.len() {
        0 => return 0.0,
        1 => return 1.0,
        _ => {}
    }

    let r_pos = positions(reference);
    let k = reference.len() as f64;
    let q: f64 = parts
        .common
        .iter()
        .map(|doc| 1.0 - ((r_pos[doc] + 1) as f64).ln() / k.ln())
        .sum();
    q / k
}

/// Rank displacement coefficient.
///
/// Sums `rank_R - rank_A` over common documents judged relevant and
/// `rank_A - rank_R` over the others.
pub fn rdc(
    reference: &[&str],
    alternate: &[&str],
    is_relevant: impl Fn(&str) -> bool,
) -> Result<f64, ComparisonError> {
    if reference.is_empty() && alternate.is_empty() {
        return Ok(0.0);
    }
    let (common, _) = restrict(reference, alternate)?;
    let r_pos = positions(reference);
    let a_pos = positions(alternate);

    let mut seen = HashSet::new();
    let mut displacement: i64 = 0;
    for doc in common {
        if !seen.insert(doc) {
            continue;
        }
        let diff = r_pos[doc] as i64 - a_pos[doc] as i64;
        displacement += if is_relevant(doc) { diff } else { -diff };
    }
    Ok(displacement as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABCD: [&str; 4] = ["a", "b", "c", "d"];
    const DCBA: [&str; 4] = ["d", "c", "b", "a"];

    #[test]
    fn test_identical_lists_agree() {
        for list in [&ABCD[..], &["x"][..], &["p", "q", "r"][..]] {
            assert_eq!(overlap(list, list), 1.0);
            assert_eq!(jaccard(list, list), 1.0);
            assert_eq!(f_measure(list, list).unwrap(), 1.0);
            assert_eq!(g_measure(list, list), 1.0);
            assert_eq!(m_measure(list, list), 1.0);
            assert_eq!(rdc(list, list, |_| true).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_disjoint_lists() {
        let other = ["w", "x", "y", "z"];
        assert_eq!(overlap(&ABCD, &other), 0.0);
        assert_eq!(jaccard(&ABCD, &other), 0.0);
        assert_eq!(f_measure(&ABCD, &other).unwrap(), 0.0);
        assert_eq!(g_measure(&ABCD, &other), 0.0);
        assert_eq!(m_measure(&ABCD, &other), 0.0);
        assert_eq!(doc_contribution(&ABCD, &other), 0.0);
    }

    #[test]
    fn test_both_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(overlap(&empty, &empty), 1.0);
        assert_eq!(jaccard(&empty, &empty), 1.0);
        assert_eq!(f_measure(&empty, &empty).unwrap(), 1.0);
        assert_eq!(g_measure(&empty, &empty), 1.0);
        assert_eq!(m_measure(&empty, &empty), 1.0);
        assert_eq!(doc_contribution(&empty, &empty), 1.0);
        assert_eq!(rdc(&empty, &empty, |_| true).unwrap(), 0.0);
    }

    #[test]
    fn test_empty_reference_overlap_is_zero() {
        let empty: [&str; 0] = [];
        assert_eq!(overlap(&empty, &ABCD), 0.0);
        assert_eq!(jaccard(&empty, &ABCD), 0.0);
    }

    #[test]
    fn test_single_common_document() {
        let r = ["a", "b", "c"];
        let a = ["x", "a", "y"];
        assert_eq!(f_measure(&r, &a).unwrap(), 1.0);
        assert_eq!(g_measure(&r, &a), 1.0);
        assert_eq!(m_measure(&r, &a), 1.0);
        assert_eq!(doc_contribution(&r, &a), 1.0);
    }

    #[test]
    fn test_reversed_list() {
        // footrule 3 + 1 + 1 + 3 = 8 = max for S = 4
        assert!((f_measure(&ABCD, &DCBA).unwrap() - 0.0).abs() < 1e-12);
        // G: 1 - 8 / (4 * 5)
        assert!((g_measure(&ABCD, &DCBA) - 0.6).abs() < 1e-12);
        // M: |1 - 1/4| * 2 + |1/2 - 1/3| * 2 = 1.5 + 1/3
        let m = 1.5 + 1.0 / 3.0;
        assert!((m_measure(&ABCD, &DCBA) - (1.0 - m / M_MEASURE_NORMALIZATION)).abs() < 1e-12);
    }

    #[test]
    fn test_f_measure_odd_size() {
        // restricted lists [a, b, c] vs [b, a, c]: footrule 2, max 0.5 * 2 * 4 = 4
        let r = ["a", "x", "b", "c"];
        let a = ["b", "a", "c", "y"];
        assert!((f_measure(&r, &a).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_g_measure_partial_overlap() {
        // k = 3, z = 2, common a (0 vs 1) and b (1 vs 0); only_ref c at 2; only_alt x at 2
        let r = ["a", "b", "c"];
        let a = ["b", "a", "x"];
        let f = 2.0 * 1.0 * 4.0 + 1.0 + 1.0 - 3.0 - 3.0;
        assert!((g_measure(&r, &a) - (1.0 - f / 12.0)).abs() < 1e-12);
    }

    #[test]
    fn test_doc_contribution_values() {
        let r = ["a", "b", "c", "d"];
        let a = ["a", "c"];
        let expected = ((1.0 - 1f64.ln() / 4f64.ln()) + (1.0 - 3f64.ln() / 4f64.ln())) / 4.0;
        assert!((doc_contribution(&r, &a) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_overlap_and_jaccard_values() {
        let r = ["a", "b", "c", "d"];
        let a = ["c", "d", "e"];
        assert!((overlap(&r, &a) - 0.5).abs() < 1e-12);
        assert!((jaccard(&r, &a) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_rdc_sign_follows_relevance() {
        let r = ["a", "b", "c"];
        let a = ["c", "a", "b"];
        // a: 0 - 1, b: 1 - 2, c: 2 - 0
        assert_eq!(rdc(&r, &a, |_| true).unwrap(), 0.0);
        assert_eq!(rdc(&r, &a, |d| d == "c").unwrap(), 2.0 + 1.0 + 1.0);
    }

    #[test]
    fn test_duplicate_documents_are_a_consistency_failure() {
        let r = ["a", "b", "a"];
        let a = ["a", "b"];
        assert!(matches!(
            f_measure(&r, &a),
            Err(ComparisonError::SizeMismatch {
                reference: 3,
                alternate: 2
            })
        ));
        assert!(rdc(&r, &a, |_| true).is_err());
    }
}
