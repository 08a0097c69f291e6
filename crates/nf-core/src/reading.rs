/// Average adult reading speed, words per minute.
const WORDS_PER_MINUTE: usize = 200;

/// Estimated reading time in whole minutes, rounded up.
/// Empty text has zero words and reads in zero minutes.
pub fn reading_time(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE) as u32
}
