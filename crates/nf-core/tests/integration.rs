//! End-to-end summarizer scenarios and universal properties.

use nf_core::{NO_CONTENT_SENTINEL, extract_keywords, reading_time, summarize};
use proptest::prelude::*;

#[test]
fn short_fragments_are_filtered_before_selection() {
    // The first two "sentences" fall under the 20-char noise filter; only
    // the third qualifies, so it is returned whole regardless of scoring.
    let text = "Short sentence one. Short sentence two. \
        Short sentence three about a very specific topic that repeats topic topic words.";
    let summary = summarize(text, 2);
    assert_eq!(
        summary,
        "Short sentence three about a very specific topic that repeats topic topic words."
    );
}

#[test]
fn repeated_terms_dominate_selection() {
    let text = "The council discussed parking arrangements for the annual fair. \
        Budget negotiations around the new budget stalled when budget figures leaked. \
        A budget compromise on the budget emerged after late budget talks. \
        Weather for the weekend is expected to be mild and dry overall.";
    let summary = summarize(text, 2);
    assert!(summary.contains("negotiations"), "got: {summary}");
    assert!(summary.contains("compromise"), "got: {summary}");
    assert!(!summary.contains("Weather"), "got: {summary}");
    // Source order preserved
    assert!(summary.find("negotiations").unwrap() < summary.find("compromise").unwrap());
}

#[test]
fn empty_and_blank_input() {
    assert_eq!(summarize("", 3), NO_CONTENT_SENTINEL);
    assert_eq!(summarize("\n\t  ", 1), NO_CONTENT_SENTINEL);
    assert_eq!(reading_time(""), 0);
    assert!(extract_keywords("", 5).is_empty());
}

#[test]
fn summary_and_keywords_agree_on_topic() {
    let text = "Regulators approved the merger after months of review. \
        The merger combines two of the largest regional carriers. \
        Critics argue the merger will reduce competition on key routes.";
    let keywords = extract_keywords(text, 3);
    assert!(keywords.contains(&"merger".to_string()), "got: {keywords:?}");
    let summary = summarize(text, 2);
    assert!(summary.to_lowercase().contains("merger"));
}

proptest! {
    #[test]
    fn summarize_always_ends_with_single_period(text in ".*", n in 1usize..5) {
        let summary = summarize(&text, n);
        prop_assert!(summary.ends_with('.'));
        prop_assert!(!summary.ends_with(".."));
    }

    #[test]
    fn extract_keywords_is_pure(text in ".*", k in 1usize..8) {
        prop_assert_eq!(extract_keywords(&text, k), extract_keywords(&text, k));
    }

    #[test]
    fn reading_time_monotonic_in_word_count(a in 0usize..600, b in 0usize..600) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let short = "word ".repeat(lo);
        let long = "word ".repeat(hi);
        prop_assert!(reading_time(&short) <= reading_time(&long));
    }
}
