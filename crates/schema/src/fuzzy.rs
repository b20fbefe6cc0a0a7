//! Approximate string matching for resource type names.
//!
//! Scores are on a 0–100 scale. [`token_set_ratio`] ignores case,
//! punctuation and word order, which is what makes `"s3 bucket"` land on
//! `aws::s3::bucket`.

use std::collections::BTreeSet;

/// Lower-case, turn everything that is not a letter or digit into a space,
/// trim.
pub fn process(s: &str) -> String {
    let mapped: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    mapped.trim().to_lowercase()
}

/// Plain similarity of two strings: `2 * LCS / (len_a + len_b)`, scaled to
/// 0–100 and rounded. This is the complement of the normalized indel
/// distance. Two empty strings are identical (100); one empty string scores 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    let lcs = lcs_len(&a, &b);
    ((200.0 * lcs as f64) / total as f64).round() as u8
}

/// Length of the longest common subsequence, two-row DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Token-set similarity.
///
/// Both inputs are processed and split into word sets. With `I` the sorted
/// intersection and `A`, `B` the sorted leftovers of each side, the score is
/// the best of `ratio(I, I+A)`, `ratio(I, I+B)` and `ratio(I+A, I+B)`.
/// A query whose words are a subset of a name's words therefore scores 100.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let pa = process(a);
    let pb = process(b);
    if pa.is_empty() || pb.is_empty() {
        return 0;
    }

    let ta: BTreeSet<&str> = pa.split_whitespace().collect();
    let tb: BTreeSet<&str> = pb.split_whitespace().collect();

    let sect = join(ta.intersection(&tb));
    let diff_ab = join(ta.difference(&tb));
    let diff_ba = join(tb.difference(&ta));

    let combined_ab = concat(&sect, &diff_ab);
    let combined_ba = concat(&sect, &diff_ba);

    // An empty intersection must not score 100 against an empty string.
    let against_sect = if sect.is_empty() {
        0
    } else {
        ratio(&sect, &combined_ab).max(ratio(&sect, &combined_ba))
    };

    against_sect.max(ratio(&combined_ab, &combined_ba))
}

fn join<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

fn concat(sect: &str, rest: &str) -> String {
    format!("{sect} {rest}").trim().to_string()
}
