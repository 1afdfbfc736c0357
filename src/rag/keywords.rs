//! Keyword extraction and lexical relevance scoring.
//!
//! Matching is plain case-insensitive substring search, so "risk" also hits
//! "risky". The 10/5/50 weights below are tuned against that behavior.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

pub const MIN_KEYWORD_CHARS: usize = 2;
pub const MAX_SCORE: f64 = 100.0;

const LENGTH_WEIGHT: f64 = 10.0;
const REPEAT_WEIGHT: f64 = 5.0;
const COVERAGE_WEIGHT: f64 = 50.0;

static NON_WORD: OnceLock<Regex> = OnceLock::new();

fn non_word() -> &'static Regex {
    NON_WORD.get_or_init(|| Regex::new(r"[^\w가-힣ㄱ-ㅎㅏ-ㅣ]+").expect("static pattern"))
}

/// Returns up to `max_keywords` lower-cased tokens, most frequent first.
///
/// Tokens shorter than two characters are dropped. Equal counts keep their
/// first-occurrence order, but callers must not rely on tie order.
pub fn extract_keywords(text: &str, max_keywords: usize) -> Vec<String> {
    if text.trim().is_empty() || max_keywords == 0 {
        return Vec::new();
    }

    let lowered = text.to_lowercase();
    let cleaned = non_word().replace_all(&lowered, " ");

    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for token in cleaned.split_whitespace() {
        if token.chars().count() < MIN_KEYWORD_CHARS {
            continue;
        }
        match index.get(token) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                index.insert(token.to_string(), counts.len());
                counts.push((token.to_string(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(max_keywords)
        .map(|(token, _)| token)
        .collect()
}

/// Scores `text` against `keywords`, in `[0, 100]`.
///
/// Each matched keyword adds `10 * len` plus `5` per extra occurrence, then
/// `50 * matched / total` is added for coverage and the result is capped.
pub fn calculate_relevance_score<S: AsRef<str>>(text: &str, keywords: &[S]) -> f64 {
    if text.is_empty() || keywords.is_empty() {
        return 0.0;
    }

    let haystack = text.to_lowercase();
    let mut score = 0.0;
    let mut matched = 0usize;

    for keyword in keywords {
        let needle = keyword.as_ref().to_lowercase();
        if needle.is_empty() {
            continue;
        }
        let occurrences = haystack.matches(needle.as_str()).count();
        if occurrences == 0 {
            continue;
        }
        matched += 1;
        score += LENGTH_WEIGHT * needle.chars().count() as f64;
        score += REPEAT_WEIGHT * (occurrences - 1) as f64;
    }

    score += COVERAGE_WEIGHT * (matched as f64 / keywords.len() as f64);
    score.min(MAX_SCORE)
}

/// Union of extracted and caller-supplied keywords, extracted first.
pub fn merge_keywords<S: AsRef<str>>(extracted: &[String], custom: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    extracted
        .iter()
        .map(|k| k.as_str())
        .chain(custom.iter().map(|k| k.as_ref()))
        .map(|k| k.trim().to_lowercase())
        .filter(|k| k.chars().count() >= MIN_KEYWORD_CHARS)
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn extract_from_empty_text_is_empty() {
        assert!(extract_keywords("", 5).is_empty());
        assert!(extract_keywords("   ", 0).is_empty());
        assert!(extract_keywords("", 100).is_empty());
    }

    #[test]
    fn extract_ranks_by_frequency_and_strips_punctuation() {
        let keywords = extract_keywords("재고자산, 재고자산! 실사 (실사) 입회? 재고자산", 2);
        assert_eq!(keywords, vec!["재고자산".to_string(), "실사".to_string()]);
    }

    #[test]
    fn extract_lowercases_and_drops_short_tokens() {
        let keywords = extract_keywords("KSA 200 관련 질문입니다 a 가", 10);
        assert!(keywords.contains(&"ksa".to_string()));
        assert!(keywords.contains(&"200".to_string()));
        assert!(!keywords.iter().any(|k| k == "a" || k == "가"));
    }

    #[test]
    fn extract_respects_cap() {
        let keywords = extract_keywords("one two three four five six seven", 3);
        assert_eq!(keywords.len(), 3);
    }

    #[test]
    fn score_is_zero_for_empty_inputs() {
        let none: [&str; 0] = [];
        assert_eq!(calculate_relevance_score("", &["ksa"]), 0.0);
        assert_eq!(calculate_relevance_score("some text", &none), 0.0);
        assert_eq!(calculate_relevance_score("some text", &["absent"]), 0.0);
    }

    #[test]
    fn score_follows_weights() {
        // "ksa": 10*3, one extra occurrence: +5, coverage 1/2: +25
        let score = calculate_relevance_score("KSA and ksa", &["ksa", "isa"]);
        assert!((score - 60.0).abs() < 1e-9);
    }

    #[test]
    fn score_matches_inside_words() {
        assert!(calculate_relevance_score("a risky assertion", &["risk"]) > 0.0);
    }

    #[test]
    fn score_is_capped() {
        let text = "materiality ".repeat(50);
        assert_eq!(calculate_relevance_score(&text, &["materiality"]), MAX_SCORE);
    }

    #[test]
    fn covering_all_keywords_beats_a_subset() {
        let keywords = ["감사", "위험"];
        let full = calculate_relevance_score("감사 위험 평가", &keywords);
        let partial = calculate_relevance_score("감사 평가", &keywords);
        assert!(full > partial);
    }

    #[test]
    fn repeated_occurrences_never_lower_the_score() {
        let keywords = ["표본"];
        let once = calculate_relevance_score("표본 추출", &keywords);
        let twice = calculate_relevance_score("표본 추출 표본", &keywords);
        assert!(twice >= once);
    }

    #[test]
    fn merge_dedupes_and_normalizes() {
        let extracted = vec!["ksa".to_string(), "200".to_string()];
        let merged = merge_keywords(&extracted, &[" KSA ", "내부통제", "x"]);
        assert_eq!(
            merged,
            vec!["ksa".to_string(), "200".to_string(), "내부통제".to_string()]
        );
    }

    proptest! {
        #[test]
        fn score_stays_within_bounds(
            text in "[a-cA-C감사재고 ]{0,60}",
            keywords in prop::collection::vec("[a-c감사재고]{0,4}", 0..6),
        ) {
            let score = calculate_relevance_score(&text, &keywords);
            prop_assert!((0.0..=MAX_SCORE).contains(&score));

            let lowered = text.to_lowercase();
            let any_hit = keywords.iter().any(|k| !k.is_empty() && lowered.contains(k.as_str()));
            prop_assert_eq!(score > 0.0, any_hit);
        }
    }
}
