//! Pure scoring ladder for matching a candidate's names against a query.
//!
//! Deliberately free of any storage or engine types so the ranking rules can
//! be exercised in isolation.

use hashbrown::HashSet;

/// Exact match on the primary name.
pub const SCORE_NAME_EXACT: f64 = 100.0;
/// Exact match on the ascii name (cities only).
pub const SCORE_ASCII_EXACT: f64 = 95.0;
/// Exact match on any alternate-name variant.
pub const SCORE_VARIANT_EXACT: f64 = 90.0;
/// Query contained in the primary name.
pub const SCORE_NAME_SUBSTRING: f64 = 80.0;
/// Query contained in the ascii name (cities only).
pub const SCORE_ASCII_SUBSTRING: f64 = 75.0;
/// Query contained in any alternate-name variant.
pub const SCORE_VARIANT_SUBSTRING: f64 = 70.0;

/// Candidates whose best fuzzy similarity does not exceed this are not
/// matches at all.
pub const SIMILARITY_FLOOR: f64 = 0.3;
/// The fuzzy fallback tier maps similarity in (floor, 1] onto (3, 10].
pub const FUZZY_SCALE: f64 = 10.0;

/// Walk the tier ladder top to bottom and return the first matching tier's
/// score, or the scaled fuzzy similarity when only the fallback applies.
/// `None` means the candidate does not match at all.
///
/// `query` must already be trimmed and lowercased; candidate names are
/// folded here. The ladder is strictly first-match-wins: a candidate
/// satisfying several tiers gets the highest one's score, never a sum.
pub fn score_names<'a, I>(query: &str, primary: &str, ascii: Option<&str>, variants: I) -> Option<f64>
where
    I: Iterator<Item = &'a str> + Clone,
{
    let primary = primary.to_lowercase();
    if primary == query {
        return Some(SCORE_NAME_EXACT);
    }

    let ascii = ascii.map(str::to_lowercase);
    if ascii.as_deref() == Some(query) {
        return Some(SCORE_ASCII_EXACT);
    }

    if variants.clone().any(|v| v.to_lowercase() == query) {
        return Some(SCORE_VARIANT_EXACT);
    }

    if primary.contains(query) {
        return Some(SCORE_NAME_SUBSTRING);
    }

    if ascii.as_deref().is_some_and(|a| a.contains(query)) {
        return Some(SCORE_ASCII_SUBSTRING);
    }

    if variants.clone().any(|v| v.to_lowercase().contains(query)) {
        return Some(SCORE_VARIANT_SUBSTRING);
    }

    let mut best = similarity(&primary, query);
    if let Some(ascii) = ascii.as_deref() {
        best = best.max(similarity(ascii, query));
    }
    for variant in variants {
        best = best.max(similarity(variant, query));
    }

    (best > SIMILARITY_FLOOR).then_some(best * FUZZY_SCALE)
}

/// Symmetric shared-substring similarity in [0, 1].
///
/// Both inputs are case-folded and split into 3-character windows over each
/// alphanumeric word, padded with two leading and one trailing space; the
/// result is |A ∩ B| / |A ∪ B|. Tolerant of minor misspellings, 1.0 only for
/// equal trigram sets.
pub fn similarity(a: &str, b: &str) -> f64 {
    let ta = trigrams(a);
    let tb = trigrams(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let shared = ta.intersection(&tb).count();
    let union = ta.len() + tb.len() - shared;
    shared as f64 / union as f64
}

fn trigrams(s: &str) -> HashSet<[char; 3]> {
    let mut set = HashSet::new();
    for word in s.split(|c: char| !c.is_alphanumeric()) {
        if word.is_empty() {
            continue;
        }
        let mut padded: Vec<char> = Vec::with_capacity(word.len() + 3);
        padded.push(' ');
        padded.push(' ');
        padded.extend(word.chars().flat_map(char::to_lowercase));
        padded.push(' ');
        for window in padded.windows(3) {
            set.insert([window[0], window[1], window[2]]);
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIERS: &[f64] = &[
        SCORE_NAME_EXACT,
        SCORE_ASCII_EXACT,
        SCORE_VARIANT_EXACT,
        SCORE_NAME_SUBSTRING,
        SCORE_ASCII_SUBSTRING,
        SCORE_VARIANT_SUBSTRING,
    ];

    #[test]
    fn tiers_are_strictly_ordered() {
        for pair in TIERS.windows(2) {
            assert!(pair[0] > pair[1]);
        }
        // The fuzzy fallback can never reach the lowest fixed tier.
        assert!(FUZZY_SCALE < SCORE_VARIANT_SUBSTRING);
    }

    #[test]
    fn exact_primary_wins_over_everything() {
        // "london" also matches as a substring and fuzzily; first match wins.
        let score = score_names("london", "London", Some("London"), ["London"].into_iter());
        assert_eq!(score, Some(SCORE_NAME_EXACT));
    }

    #[test]
    fn ascii_exact_beats_variant_exact() {
        let score = score_names(
            "munich",
            "München",
            Some("Munich"),
            ["Munich"].into_iter(),
        );
        assert_eq!(score, Some(SCORE_ASCII_EXACT));
    }

    #[test]
    fn variant_exact_when_primary_differs() {
        let score = score_names("londres", "London", Some("London"), ["Londres"].into_iter());
        assert_eq!(score, Some(SCORE_VARIANT_EXACT));
    }

    #[test]
    fn substring_tiers() {
        let score = score_names("lond", "London", Some("London"), std::iter::empty());
        assert_eq!(score, Some(SCORE_NAME_SUBSTRING));

        let score = score_names("munch", "München", Some("Munchen"), std::iter::empty());
        assert_eq!(score, Some(SCORE_ASCII_SUBSTRING));

        let score = score_names("ondre", "London", Some("London"), ["Londres"].into_iter());
        assert_eq!(score, Some(SCORE_VARIANT_SUBSTRING));
    }

    #[test]
    fn fuzzy_fallback_is_scaled_and_floored() {
        // A dropped letter still matches, far below any fixed tier.
        let score = score_names("londn", "London", None, std::iter::empty());
        let score = score.expect("misspelling should pass the floor");
        assert!(score > 0.0 && score <= FUZZY_SCALE);

        // Nothing in common: not a candidate at all.
        assert_eq!(score_names("tokyo", "London", None, std::iter::empty()), None);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let score = score_names("london", "LONDON", None, std::iter::empty());
        assert_eq!(score, Some(SCORE_NAME_EXACT));
    }

    #[test]
    fn similarity_identity_and_symmetry() {
        assert_eq!(similarity("london", "london"), 1.0);
        assert_eq!(
            similarity("london", "lodnon"),
            similarity("lodnon", "london")
        );
    }

    #[test]
    fn similarity_bounds() {
        assert_eq!(similarity("", "london"), 0.0);
        assert_eq!(similarity("xyz", "qqqq"), 0.0);

        let near = similarity("london", "londn");
        assert!(near > SIMILARITY_FLOOR && near < 1.0);
    }
}
