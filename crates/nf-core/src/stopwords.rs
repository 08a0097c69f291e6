use std::collections::HashSet;
use std::sync::LazyLock;

/// Common English function words excluded from frequency scoring.
/// High-frequency glue words would otherwise dominate every sentence score.
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "an", "and", "any", "are", "as", "at", "be", "been", "but", "by",
    "call", "came", "can", "come", "could", "day", "did", "down", "each", "find", "first", "for",
    "from", "get", "had", "has", "have", "he", "her", "him", "his", "how", "if", "in", "into",
    "is", "it", "its", "just", "like", "long", "made", "make", "many", "may", "more", "most",
    "now", "of", "on", "one", "or", "other", "out", "over", "part", "said", "see", "she", "sit",
    "so", "some", "than", "that", "the", "their", "them", "then", "these", "they", "this", "time",
    "to", "two", "up", "use", "very", "was", "way", "we", "were", "what", "when", "which", "who",
    "will", "with", "word", "words", "would", "you", "your",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORD_SET.contains(word)
}
