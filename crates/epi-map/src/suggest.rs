//! Closest-name suggestions for unresolved countries.

use rapidfuzz::distance::jaro_winkler;

/// Minimum Jaro-Winkler similarity for a name to be suggested.
pub const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Returns up to `limit` candidate names most similar to `name`, best first.
pub fn suggest<'a>(
    name: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    limit: usize,
) -> Vec<String> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() || limit == 0 {
        return Vec::new();
    }
    let mut scored: Vec<(f64, &str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let score =
                jaro_winkler::similarity(needle.chars(), candidate.to_lowercase().chars());
            (score >= SUGGESTION_THRESHOLD).then_some((score, candidate))
        })
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));

    let mut out: Vec<String> = Vec::with_capacity(limit);
    for (_, candidate) in scored {
        if out.iter().any(|seen| seen.eq_ignore_ascii_case(candidate)) {
            continue;
        }
        out.push(candidate.to_string());
        if out.len() == limit {
            break;
        }
    }
    out
}
