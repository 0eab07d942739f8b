//! Ratcliff/Obershelp string similarity.
//!
//! The score is `2 * M / T` where `M` is the number of characters in the
//! matching blocks found by repeatedly taking the longest common substring
//! and recursing on both sides, and `T` is the total length of both strings.

use std::collections::HashMap;

/// Similarity of `a` and `b` in `0.0..=1.0`. Two empty strings score `1.0`.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`, earliest in `a`
/// then earliest in `b` on ties. Returns `(i, j, len)`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_j2len = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| j2len.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_j2len.insert(j, k);
                if k > best_len {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_len = k;
                }
            }
        }
        j2len = next_j2len;
    }

    (best_i, best_j, best_len)
}

/// The candidate most similar to `word`, if any reaches `cutoff`.
///
/// Ties on score go to the lexicographically larger candidate.
pub fn closest_match<'a, I>(word: &str, candidates: I, cutoff: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|candidate| (similarity_ratio(candidate, word), candidate))
        .filter(|(score, _)| *score >= cutoff)
        .max_by(|(sa, ca), (sb, cb)| sa.total_cmp(sb).then_with(|| ca.cmp(cb)))
        .map(|(_, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert!((similarity_ratio("ficus elastica", "ficus elastica") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert!(similarity_ratio("abc", "xyz").abs() < 1e-9);
    }

    #[test]
    fn ratio_counts_recursive_blocks() {
        // "abcd" vs "bcde": one block "bcd" → 2*3/8.
        assert!((similarity_ratio("abcd", "bcde") - 0.75).abs() < 1e-9);
        // "aloe vera" vs "aloe verra": 9 matched chars → 18/19.
        assert!((similarity_ratio("aloe vera", "aloe verra") - 18.0 / 19.0).abs() < 1e-9);
    }

    #[test]
    fn empty_inputs() {
        assert!((similarity_ratio("", "") - 1.0).abs() < 1e-9);
        assert!(similarity_ratio("", "rose").abs() < 1e-9);
    }

    #[test]
    fn closest_match_picks_best_above_cutoff() {
        let names = ["aloe vera", "monstera deliciosa", "ficus elastica"];
        assert_eq!(
            closest_match("ficus elastca", names.iter().copied(), 0.6),
            Some("ficus elastica")
        );
        assert_eq!(
            closest_match("alo vera", names.iter().copied(), 0.6),
            Some("aloe vera")
        );
    }

    #[test]
    fn closest_match_none_below_cutoff() {
        let names = ["aloe vera", "monstera deliciosa"];
        assert_eq!(closest_match("rubber plant", names.iter().copied(), 0.6), None);
    }

    #[test]
    fn ties_go_to_the_larger_name() {
        // "rosa" and "rosy" both share "ros" with "rose": 2*3/8 each.
        assert!(
            (similarity_ratio("rosa", "rose") - similarity_ratio("rosy", "rose")).abs() < 1e-12
        );
        assert_eq!(closest_match("rose", ["rosa", "rosy"], 0.6), Some("rosy"));
        assert_eq!(closest_match("rose", ["rosy", "rosa"], 0.6), Some("rosy"));
    }
}
