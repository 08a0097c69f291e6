use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::stopwords::is_stop_word;

static NON_TEXT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s.!?]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

/// Minimum sentence length (in chars) to survive the noise filter.
/// Shorter fragments are headers, bylines, or list markers.
const MIN_SENTENCE_CHARS: usize = 20;

/// Normalize raw article text: strip everything outside word characters,
/// whitespace, and sentence punctuation, then collapse whitespace runs.
pub fn clean_text(text: &str) -> String {
    let stripped = NON_TEXT.replace_all(text, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Tokenize cleaned text into lowercase words, dropping tokens of length
/// <= 2 and stop words. No stemming.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > 2 && !is_stop_word(w))
        .map(str::to_string)
        .collect()
}

/// Split cleaned text into sentences at `.`/`!`/`?` runs, trimming each
/// and discarding fragments at or under [`MIN_SENTENCE_CHARS`].
pub fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_END
        .split(text)
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .map(str::to_string)
        .collect()
}

/// Word frequencies normalized to `[0, 1]` by the maximum raw count,
/// so the most frequent token always scores 1.0. Empty input yields an
/// empty map.
pub fn normalized_frequencies(words: &[String]) -> HashMap<String, f64> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for word in words {
        *counts.entry(word).or_insert(0) += 1;
    }

    let max = counts.values().copied().max().unwrap_or(0);
    if max == 0 {
        return HashMap::new();
    }

    counts
        .into_iter()
        .map(|(word, count)| (word.to_string(), f64::from(count) / f64::from(max)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_symbols() {
        assert_eq!(
            clean_text("Markets — up 3% today! (Reuters)"),
            "Markets up 3 today! Reuters"
        );
    }

    #[test]
    fn test_clean_collapses_whitespace() {
        assert_eq!(clean_text("one\t\ttwo\n\nthree"), "one two three");
    }

    #[test]
    fn test_clean_empty() {
        assert_eq!(clean_text("   \n\t  "), "");
    }

    #[test]
    fn test_tokenize_lowercases_and_filters() {
        let tokens = tokenize("The Economy Grew despite the odds");
        assert_eq!(tokens, vec!["economy", "grew", "despite", "odds"]);
    }

    #[test]
    fn test_tokenize_drops_short_tokens() {
        let tokens = tokenize("go up so it economy");
        assert_eq!(tokens, vec!["economy"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_split_sentences_on_punctuation_runs() {
        let sentences =
            split_sentences("The economy grew strongly this quarter!! Inflation fell back to target?");
        assert_eq!(
            sentences,
            vec![
                "The economy grew strongly this quarter",
                "Inflation fell back to target"
            ]
        );
    }

    #[test]
    fn test_split_sentences_noise_filter() {
        // "Breaking" and "By Staff" are too short to qualify
        let sentences = split_sentences("Breaking. By Staff. The central bank raised rates again today.");
        assert_eq!(sentences, vec!["The central bank raised rates again today"]);
    }

    #[test]
    fn test_split_sentences_empty() {
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn test_frequencies_max_normalized() {
        let words: Vec<String> = ["topic", "topic", "topic", "economy"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let freq = normalized_frequencies(&words);
        assert_eq!(freq["topic"], 1.0);
        assert!((freq["economy"] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_frequencies_empty() {
        assert!(normalized_frequencies(&[]).is_empty());
    }
}
