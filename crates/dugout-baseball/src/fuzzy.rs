// Weighted-ratio name scoring.
//
// All scores are on a 0-100 scale. The base similarity is rapidfuzz's
// normalized indel ratio. The composite scorers (token sort, token set,
// partial) build on it, and `weighted_ratio` picks the best of them with
// penalties for length mismatch.

use std::collections::BTreeSet;

use rapidfuzz::fuzz;

const UNBASE_SCALE: f64 = 0.95;

fn chars_ratio(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    fuzz::ratio(a.iter().copied(), b.iter().copied()) * 100.0
}

/// Normalized indel similarity. Two empty strings score 100.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    fuzz::ratio(a.chars(), b.chars()) * 100.0
}

/// Best `ratio` of the shorter string against any same-length window of
/// the longer one, including the partial windows hanging off either end.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let n = short.len();
    let m = long.len();
    let mut best = 0.0f64;

    for len in 1..n {
        best = best.max(chars_ratio(&short, &long[..len]));
    }
    for start in 0..=(m - n) {
        best = best.max(chars_ratio(&short, &long[start..start + n]));
        if best >= 100.0 {
            return 100.0;
        }
    }
    for start in (m - n + 1)..m {
        best = best.max(chars_ratio(&short, &long[start..]));
    }
    best
}

fn split_tokens(s: &str) -> Vec<&str> {
    s.split_whitespace().collect()
}

fn sorted_joined<'a>(tokens: impl IntoIterator<Item = &'a str>) -> String {
    let mut tokens: Vec<&str> = tokens.into_iter().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// `ratio` after sorting each string's whitespace tokens.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_joined(split_tokens(a)), &sorted_joined(split_tokens(b)))
}

/// Compares the shared tokens against each side's shared-plus-unique
/// tokens. A string whose tokens are a subset of the other's scores 100.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = split_tokens(a).into_iter().collect();
    let tokens_b: BTreeSet<&str> = split_tokens(b).into_iter().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let sect: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !sect.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let sect = sect.join(" ");
    let join = |diff: &[&str]| {
        let diff = diff.join(" ");
        match (sect.is_empty(), diff.is_empty()) {
            (true, _) => diff,
            (false, true) => sect.clone(),
            (false, false) => format!("{sect} {diff}"),
        }
    };
    let combined_ab = join(&diff_ab);
    let combined_ba = join(&diff_ba);

    let mut best = ratio(&combined_ab, &combined_ba);
    if !sect.is_empty() {
        best = best
            .max(ratio(&sect, &combined_ab))
            .max(ratio(&sect, &combined_ba));
    }
    best
}

fn token_ratio(a: &str, b: &str) -> f64 {
    token_sort_ratio(a, b).max(token_set_ratio(a, b))
}

/// 100 when any token is shared, otherwise the best `partial_ratio` of the
/// sorted token strings.
pub fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let split_a = split_tokens(a);
    let split_b = split_tokens(b);
    let set_a: BTreeSet<&str> = split_a.iter().copied().collect();
    let set_b: BTreeSet<&str> = split_b.iter().copied().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    if set_a.intersection(&set_b).next().is_some() {
        return 100.0;
    }

    let best = partial_ratio(
        &sorted_joined(split_a.iter().copied()),
        &sorted_joined(split_b.iter().copied()),
    );
    // With no shared tokens the set strings only differ from the full ones
    // when a side repeats a token.
    if split_a.len() == set_a.len() && split_b.len() == set_b.len() {
        return best;
    }
    best.max(partial_ratio(
        &sorted_joined(set_a.iter().copied()),
        &sorted_joined(set_b.iter().copied()),
    ))
}

/// Weighted ratio: the best of the plain, token and partial scorers, with
/// partial scores discounted as the length gap between the strings grows.
/// Either string empty scores 0.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;
    let base = ratio(a, b);

    if len_ratio < 1.5 {
        return base.max(token_ratio(a, b) * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    base.max(partial_ratio(a, b) * partial_scale)
        .max(partial_token_ratio(a, b) * UNBASE_SCALE * partial_scale)
}
