//! Fuzzy entity-name matching
//!
//! Lookup order: normalize, exact match, substring, edit-distance fallback.
//! When no exact match exists the caller gets the top-N (at most 5)
//! candidates sorted by similarity.

/// Maximum number of candidates a fuzzy lookup returns
pub const MAX_CANDIDATES: usize = 5;

/// Normalize an entity name for matching: lowercase, strip
/// non-alphanumerics, collapse whitespace.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(name: &str) -> String {
    let lowered: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity between two raw names in [0, 1].
///
/// 1.0 for a normalized exact match, a high band for substring containment,
/// otherwise scaled Levenshtein distance over the normalized forms.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let longest = a.chars().count().max(b.chars().count());
    if a.contains(&b) || b.contains(&a) {
        // Substring matches rank above pure edit-distance matches but below
        // exact, weighted by how much of the longer string is covered
        let shortest = a.chars().count().min(b.chars().count());
        return 0.7 + 0.25 * (shortest as f64 / longest as f64);
    }

    let distance = levenshtein(&a, &b);
    1.0 - (distance as f64 / longest as f64)
}

/// Rank `candidates` by similarity to `query`, best first, dropping
/// candidates with no meaningful resemblance. Ties break on candidate name
/// so the order is stable.
pub fn rank_candidates<'a>(query: &str, candidates: &'a [String]) -> Vec<(&'a str, f64)> {
    let mut ranked: Vec<(&str, f64)> = candidates
        .iter()
        .map(|c| (c.as_str(), similarity(query, c)))
        .filter(|(_, score)| *score >= 0.3)
        .collect();

    ranked.sort_by(|(name_a, score_a), (name_b, score_b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| name_a.cmp(name_b))
    });

    ranked.truncate(MAX_CANDIDATES);
    ranked
}

/// Levenshtein edit distance between two strings, by character
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1) // deletion
                .min(current[j] + 1); // insertion
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
