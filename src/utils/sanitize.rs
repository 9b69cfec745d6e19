// src/utils/sanitize.rs

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

/// Strict digits-only pattern: no signs, no whitespace, no decimal points.
static DIGITS_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("digits pattern is valid"));

/// An identifier as it arrives from untrusted request input.
/// Clients send both JSON numbers and digit strings; anything else is dropped
/// during normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Text(String),
}

/// Normalizes a raw identifier list into positive integers.
///
/// Keeps only values whose string form matches `^\d+$`, preserves input
/// order, and keeps duplicates. Duplicate handling is a call-site concern:
/// bulk validators reject them, the search form dedups them.
pub fn normalize_ids(raw: &[RawId]) -> Vec<i64> {
    raw.iter()
        .filter_map(|id| match id {
            RawId::Int(n) if *n >= 0 => Some(*n),
            RawId::Int(_) => None,
            RawId::Text(s) => {
                if DIGITS_ONLY.is_match(s) {
                    s.parse::<i64>().ok()
                } else {
                    None
                }
            }
        })
        .collect()
}

/// `normalize_ids` plus first-occurrence deduplication.
pub fn unique_ids(raw: &[RawId]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    normalize_ids(raw)
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Returns the values that occur more than once, in first-occurrence order.
pub fn duplicate_ids(ids: &[i64]) -> Vec<i64> {
    let mut counts = std::collections::HashMap::new();
    for id in ids {
        *counts.entry(*id).or_insert(0usize) += 1;
    }
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .copied()
        .filter(|id| counts[id] > 1 && seen.insert(*id))
        .collect()
}
