//! Pattern Matcher: binds logical pulse values (sync/one/zero/float) to
//! catalog pattern IDs and checks whether the resulting ID sequence occurs
//! in a raw bit-pattern string.
//!
//! A logical value is "close enough" to a catalog entry when it falls
//! within that entry's tolerance band. Several catalog entries can be
//! within tolerance of the same logical value, and several logical values
//! can appear in one needle (e.g. a sync pattern followed by a one and a
//! zero) — the matcher searches the combinations closest-first and returns
//! the first assignment whose ID sequence is a substring of the haystack.

use std::collections::BTreeSet;

use crate::types::{PatternCatalog, PatternId};

/// Absolute tolerance around a pulse value: tight near zero, proportionally
/// looser as pulses get longer.
fn tolerance(value: f64) -> f64 {
    let a = value.abs();
    if a <= 3.0 {
        1.0
    } else if a <= 16.0 {
        a * 0.3
    } else {
        a * 0.18
    }
}

/// Catalog entries within tolerance of `value`, closest first, ties broken
/// by pattern ID (from `BTreeMap` iteration order).
fn candidates_for(value: f64, catalog: &PatternCatalog) -> Vec<(PatternId, f64)> {
    let tol = tolerance(value);
    let mut candidates: Vec<(PatternId, f64)> = catalog
        .iter()
        .filter(|(_, &pulse)| (pulse - value).abs() <= tol)
        .map(|(&id, &pulse)| (id, (pulse - value).abs()))
        .collect();
    candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then(a.0.cmp(&b.0)));
    candidates
}

fn distinct_in_order(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::new();
    for &v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

/// Above this many total (distinct-value) assignment combinations, give up
/// rather than enumerate — a handful of ambiguous pulses can otherwise blow
/// up combinatorially.
const MAX_ASSIGNMENTS: u64 = 10_000;

/// Try to bind each distinct value in `values` to a catalog pattern ID such
/// that the resulting ID sequence (values substituted in order, repeats
/// included) occurs as a substring of `haystack`. No two distinct values may
/// share one ID. Returns the first working assignment, tried closest-match
/// first per value.
pub fn pattern_exists(
    values: &[f64],
    catalog: &PatternCatalog,
    haystack: &str,
) -> Option<Vec<(f64, PatternId)>> {
    let distinct = distinct_in_order(values);
    let candidate_lists: Vec<Vec<(PatternId, f64)>> = distinct
        .iter()
        .map(|&v| candidates_for(v, catalog))
        .collect();

    if candidate_lists.iter().any(|c| c.is_empty()) {
        return None;
    }

    let total: u64 = candidate_lists.iter().map(|c| c.len() as u64).product();
    if total > MAX_ASSIGNMENTS {
        return None;
    }

    let mut idx = vec![0usize; distinct.len()];
    loop {
        let ids: Vec<PatternId> = idx
            .iter()
            .enumerate()
            .map(|(i, &k)| candidate_lists[i][k].0)
            .collect();

        let unique: BTreeSet<PatternId> = ids.iter().copied().collect();
        if unique.len() == ids.len() {
            let substring: String = values
                .iter()
                .map(|v| {
                    let pos = distinct.iter().position(|d| d == v).unwrap();
                    ids[pos].to_string()
                })
                .collect();
            if haystack.contains(&substring) {
                return Some(distinct.iter().copied().zip(ids.iter().copied()).collect());
            }
        }

        if !advance(&mut idx, &candidate_lists) {
            return None;
        }
    }
}

/// Odometer-style increment, last dimension fastest. Returns `false` once
/// every combination has been tried.
fn advance(idx: &mut [usize], candidate_lists: &[Vec<(PatternId, f64)>]) -> bool {
    let mut i = idx.len();
    loop {
        if i == 0 {
            return false;
        }
        i -= 1;
        idx[i] += 1;
        if idx[i] < candidate_lists[i].len() {
            return true;
        }
        idx[i] = 0;
        if i == 0 {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(entries: &[(PatternId, f64)]) -> PatternCatalog {
        entries.iter().copied().collect()
    }

    #[test]
    fn binds_single_value_within_tolerance() {
        let cat = catalog(&[(0, 400.0), (1, -400.0)]);
        let result = pattern_exists(&[400.0], &cat, "01010");
        assert_eq!(result, Some(vec![(400.0, 0)]));
    }

    #[test]
    fn rejects_value_out_of_tolerance() {
        let cat = catalog(&[(0, 1000.0)]);
        assert_eq!(pattern_exists(&[400.0], &cat, "0000"), None);
    }

    #[test]
    fn distinct_values_cannot_share_one_id() {
        // Only one catalog entry close to both logical values: no valid
        // assignment exists because one id can't serve two distinct values.
        let cat = catalog(&[(0, 400.0)]);
        assert_eq!(pattern_exists(&[400.0, 401.0], &cat, "00"), None);
    }

    #[test]
    fn finds_substring_across_two_bound_values() {
        let cat = catalog(&[(0, 400.0), (1, -400.0)]);
        // needle is one(400) then zero(-400) -> "01"
        let result = pattern_exists(&[400.0, -400.0], &cat, "3220989");
        assert_eq!(result, None);
        let result = pattern_exists(&[400.0, -400.0], &cat, "320198");
        assert_eq!(result, Some(vec![(400.0, 0), (-400.0, 1)]));
    }
}
