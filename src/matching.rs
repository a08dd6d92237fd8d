//! Fuzzy matching of candidate URLs against a normalized card filename.

use crate::models::url_to_filename;
use std::collections::HashSet;

/// Default similarity threshold for accepting a candidate URL.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.5;

/// Longest common contiguous block between `a[alo..ahi]` and `b[blo..bhi]`.
/// Returns (start in a, start in b, length); earlier blocks win ties.
fn longest_match(
    a: &[u8],
    b: &[u8],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0usize);
    // j2len[j] = length of the common block ending at the previous row's a
    // element and b[j]
    let mut j2len = vec![0usize; b.len()];
    for i in alo..ahi {
        let mut row = vec![0usize; b.len()];
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = if j == 0 { 1 } else { j2len[j - 1] + 1 };
                row[j] = k;
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        j2len = row;
    }
    (best_i, best_j, best_size)
}

/// Total length of all matching blocks: the longest common block is found
/// first, then the regions on either side of it are matched in turn.
fn match_total(a: &[u8], b: &[u8]) -> usize {
    let mut total = 0;
    let mut regions = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = regions.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size > 0 {
            total += size;
            regions.push((alo, i, blo, j));
            regions.push((i + size, ahi, j + size, bhi));
        }
    }
    total
}

/// Similarity of two strings as the ratio of matched characters to total
/// length, in [0, 1]. Identical strings score 1.0, disjoint strings 0.0.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * match_total(a, b) as f64 / total as f64
}

/// Removes duplicates while preserving first-seen order.
pub fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

/// Picks the candidate URL whose derived filename best matches `filename`.
///
/// Candidates scoring below `threshold` are discarded; the highest ratio
/// wins and ties keep the first-seen candidate. Duplicate URLs are
/// considered once.
pub fn url_best_match(filename: &str, urls: Vec<String>, threshold: f64) -> Option<String> {
    let mut results = Vec::new();
    for url in dedup_preserving_order(urls) {
        let ratio = sequence_ratio(filename, &url_to_filename(&url));
        if ratio >= threshold {
            results.push((url, ratio));
        }
    }

    log::debug!(
        "        Found {} result{}",
        results.len(),
        if results.len() == 1 { "" } else { "s" }
    );
    let mut matching_result = None;
    let mut matching_ratio = 0.0;
    for (result, ratio) in results.iter() {
        log::debug!("            {} (Matches {:.2}%)", result, ratio * 100.0);
        if *ratio > matching_ratio {
            matching_result = Some(result.clone());
            matching_ratio = *ratio;
        }
    }
    if results.len() > 1 {
        if let Some(ref result) = matching_result {
            log::debug!("        Using closest matching result: {}", result);
        }
    }

    matching_result
}
