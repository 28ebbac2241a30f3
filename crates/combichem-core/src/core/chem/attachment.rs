//! Textual utilities for attachment points written as `*`, `[*]` or mapped `[*:N]` tokens.

use itertools::Itertools;
use regex::Regex;
use std::sync::LazyLock;

static MAPPED_POINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\*:(\d+)\]").expect("valid mapped attachment regex"));

static ANY_POINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\*(?::\d+)?\]|\*").expect("valid attachment regex"));

/// Sorted labels of every mapped attachment point in `repr`.
pub fn attachment_labels(repr: &str) -> Vec<u32> {
    MAPPED_POINT
        .captures_iter(repr)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .sorted_unstable()
        .collect()
}

/// Number of attachment points in `repr`, mapped or not.
pub fn attachment_count(repr: &str) -> usize {
    repr.matches('*').count()
}

/// Whether every attachment point in `repr` carries a label.
pub fn is_mapped(repr: &str) -> bool {
    MAPPED_POINT.find_iter(repr).count() == attachment_count(repr)
}

/// Replaces every attachment point with an unlabeled `[*]`.
pub fn strip_mapping(repr: &str) -> String {
    ANY_POINT.replace_all(repr, "[*]").into_owned()
}

/// Labels the attachment points of `repr` left to right with `labels`.
///
/// Existing labels are overwritten. Returns `None` when the number of labels differs from
/// the number of attachment points.
pub fn add_mapping(repr: &str, labels: &[u32]) -> Option<String> {
    if attachment_count(repr) != labels.len() {
        return None;
    }
    let mut remaining = labels.iter();
    let mapped = ANY_POINT.replace_all(repr, |_: &regex::Captures<'_>| {
        remaining
            .next()
            .map(|label| format!("[*:{label}]"))
            .unwrap_or_default()
    });
    Some(mapped.into_owned())
}

/// Every distinct way of labeling the attachment points of `repr` with `labels`.
///
/// With `exact`, the number of attachment points must equal the number of labels;
/// otherwise it must not exceed it. A mismatch yields no permutations.
pub fn mapping_permutations(repr: &str, labels: &[u32], exact: bool) -> Vec<String> {
    let points = attachment_count(repr);
    if points > labels.len() || (exact && points != labels.len()) {
        return Vec::new();
    }
    let stripped = strip_mapping(repr);
    labels
        .iter()
        .copied()
        .permutations(points)
        .filter_map(|assignment| add_mapping(&stripped, &assignment))
        .unique()
        .collect()
}
