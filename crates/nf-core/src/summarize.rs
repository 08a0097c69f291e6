use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::tokenizer::{clean_text, normalized_frequencies, split_sentences, tokenize};

/// Returned when there is nothing to summarize.
pub const NO_CONTENT_SENTINEL: &str = "No content available for summarization.";

/// A scored sentence, transient to one `summarize` call.
struct SentenceScore {
    sentence: String,
    score: f64,
    /// Index in the original sentence order, used to restore source order
    /// after ranking.
    position: usize,
}

/// Mean normalized frequency of a sentence's scorable tokens.
/// Sentences with no scorable tokens score 0.
fn score_sentence(sentence: &str, frequencies: &HashMap<String, f64>) -> f64 {
    let words = tokenize(sentence);
    if words.is_empty() {
        return 0.0;
    }

    let total: f64 = words
        .iter()
        .map(|w| frequencies.get(w).copied().unwrap_or(0.0))
        .sum();
    total / words.len() as f64
}

/// Produce an extractive summary of at most `max_sentences` sentences.
///
/// Sentences are ranked by mean normalized term frequency; the selected
/// ones are re-joined in their original order so the summary reads like
/// the source. Ties rank by earlier position (the descending sort is
/// stable). Never fails: empty input yields [`NO_CONTENT_SENTINEL`].
pub fn summarize(text: &str, max_sentences: usize) -> String {
    if text.trim().is_empty() {
        return NO_CONTENT_SENTINEL.to_string();
    }

    let cleaned = clean_text(text);
    let sentences = split_sentences(&cleaned);

    if sentences.len() <= max_sentences {
        return format!("{}.", sentences.join(". "));
    }

    let frequencies = normalized_frequencies(&tokenize(&cleaned));

    let mut scored: Vec<SentenceScore> = sentences
        .into_iter()
        .enumerate()
        .map(|(position, sentence)| SentenceScore {
            score: score_sentence(&sentence, &frequencies),
            sentence,
            position,
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(max_sentences);
    scored.sort_by_key(|s| s.position);

    let selected: Vec<&str> = scored.iter().map(|s| s.sentence.as_str()).collect();
    format!("{}.", selected.join(". "))
}

static BRIEF_NON_TEXT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s.,!?-]").unwrap());
static BRIEF_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static BRIEF_SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

/// Lighter fallback summary for when the remote summary API is
/// unavailable: the first few substantial sentences, unscored.
///
/// Inputs under 50 chars pass through unchanged. If no sentence has a
/// cleaned length in (20, 200), the first 200 chars are returned with an
/// ellipsis.
pub fn brief_summary(text: &str) -> String {
    if text.chars().count() < 50 {
        return text.to_string();
    }

    let collapsed = BRIEF_WHITESPACE.replace_all(text, " ");
    let cleaned = BRIEF_NON_TEXT.replace_all(&collapsed, "");
    let cleaned = cleaned.trim();

    let sentences: Vec<&str> = BRIEF_SENTENCE_END
        .split(cleaned)
        .map(str::trim)
        .filter(|s| {
            let len = s.chars().count();
            len > 20 && len < 200
        })
        .collect();

    if sentences.is_empty() {
        let head: String = text.chars().take(200).collect();
        return format!("{head}...");
    }

    let selected = sentences[..sentences.len().min(3)].join(". ");
    if selected.ends_with('.') {
        selected
    } else {
        format!("{selected}.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = "Short sentence one. Short sentence two. \
        Short sentence three about a very specific topic that repeats topic topic words.";

    #[test]
    fn test_empty_input_sentinel() {
        assert_eq!(summarize("", 2), NO_CONTENT_SENTINEL);
        assert_eq!(summarize("   \n\t ", 2), NO_CONTENT_SENTINEL);
    }

    #[test]
    fn test_few_sentences_returned_verbatim_in_order() {
        let text = "The first substantial sentence here. The second substantial sentence here.";
        assert_eq!(
            summarize(text, 5),
            "The first substantial sentence here. The second substantial sentence here."
        );
    }

    #[test]
    fn test_single_trailing_period() {
        let summary = summarize(ARTICLE, 2);
        assert!(summary.ends_with('.'));
        assert!(!summary.ends_with(".."));
    }

    #[test]
    fn test_selects_highest_scoring_in_source_order() {
        // "topic" repeats, so the third sentence scores highest; with two
        // slots the result must keep original relative order.
        let text = "The reporters met yesterday about scheduling matters. \
            The topic of topic modeling was the main topic discussed by everyone. \
            Another topic review session covered the same topic again at length.";
        let summary = summarize(text, 2);
        let first = summary.find("topic modeling").expect("high-score sentence kept");
        let second = summary.find("review session").expect("high-score sentence kept");
        assert!(first < second, "summary must preserve source order: {summary}");
    }

    #[test]
    fn test_no_qualifying_sentences_degrades() {
        // All fragments are under the noise threshold; result degrades to
        // a bare period rather than an error.
        assert_eq!(summarize("Hi. Ok. No.", 2), ".");
    }

    #[test]
    fn test_score_sentence_zero_without_tokens() {
        let freq = normalized_frequencies(&tokenize("economy economy inflation"));
        assert_eq!(score_sentence("is it up", &freq), 0.0);
    }

    #[test]
    fn test_score_sentence_mean() {
        let freq = normalized_frequencies(&tokenize("economy economy inflation"));
        // "economy" -> 1.0, "inflation" -> 0.5, mean = 0.75
        let score = score_sentence("economy inflation", &freq);
        assert!((score - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_brief_summary_short_input_passthrough() {
        assert_eq!(brief_summary("Too short to bother."), "Too short to bother.");
    }

    #[test]
    fn test_brief_summary_takes_leading_sentences() {
        let text = "The central bank held rates steady this month. \
            Markets rallied on the unexpected announcement. \
            Analysts expect further easing later in the year. \
            A fourth sentence that should not appear in the output.";
        let brief = brief_summary(text);
        assert!(brief.starts_with("The central bank held rates steady"));
        assert!(brief.contains("further easing"));
        assert!(!brief.contains("fourth sentence"));
        assert!(brief.ends_with('.'));
    }

    #[test]
    fn test_brief_summary_truncates_when_nothing_qualifies() {
        let text = "word ".repeat(100);
        let brief = brief_summary(&text);
        assert!(brief.ends_with("..."));
        assert!(brief.chars().count() <= 203);
    }
}
