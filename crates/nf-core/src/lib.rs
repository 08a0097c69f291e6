//! Extractive news summarizer.
//!
//! Scores sentences by max-normalized term frequency and extracts the
//! highest-scoring ones in source order. Also provides keyword extraction
//! and reading-time estimation.
//!
//! Zero I/O — every function here is pure, deterministic, and total:
//! degenerate input degrades to sentinel text or near-empty results,
//! never an error.

pub mod keywords;
pub mod reading;
pub mod stopwords;
pub mod summarize;
pub mod tokenizer;

pub use keywords::extract_keywords;
pub use reading::reading_time;
pub use stopwords::is_stop_word;
pub use summarize::{NO_CONTENT_SENTINEL, brief_summary, summarize};
pub use tokenizer::{clean_text, normalized_frequencies, split_sentences, tokenize};
