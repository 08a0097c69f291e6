use crate::tokenizer::{clean_text, normalized_frequencies, tokenize};

/// Top `max_keywords` tokens by normalized frequency, descending.
///
/// Exact-score ties break lexicographically so repeated calls on the same
/// input are identical; which of two equally frequent words "deserves" a
/// slot is otherwise unspecified.
pub fn extract_keywords(text: &str, max_keywords: usize) -> Vec<String> {
    let words = tokenize(&clean_text(text));
    let frequencies = normalized_frequencies(&words);

    let mut ranked: Vec<(String, f64)> = frequencies.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(max_keywords);

    ranked.into_iter().map(|(word, _)| word).collect()
}
