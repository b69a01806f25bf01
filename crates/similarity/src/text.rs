//! Tokenization for movie content text.
//!
//! Splits text on non-alphanumeric boundaries, lowercases, and drops short
//! tokens and common English stop-words. Both the content index and the
//! sentiment crate tokenize through here so term handling stays consistent.

/// Common English stop-words excluded from content vectors
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "because",
    "been", "before", "being", "between", "both", "but", "by", "can", "could", "did", "do", "does",
    "down", "during", "each", "few", "for", "from", "further", "had", "has", "have", "having",
    "he", "her", "here", "hers", "him", "his", "how", "if", "in", "into", "is", "it", "its",
    "just", "more", "most", "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
    "or", "other", "our", "out", "over", "own", "same", "she", "should", "so", "some", "such",
    "than", "that", "the", "their", "them", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when",
    "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your",
];

/// Configurable tokenizer for content and review text
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Minimum token length to keep
    min_token_len: usize,
    /// Whether to drop stop-words
    use_stop_words: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            min_token_len: 2,
            use_stop_words: true,
        }
    }
}

impl Tokenizer {
    /// Create a tokenizer with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the minimum token length (default: 2)
    pub fn with_min_token_len(mut self, len: usize) -> Self {
        self.min_token_len = len;
        self
    }

    /// Configure whether stop-words are dropped (default: true)
    pub fn with_stop_words(mut self, enabled: bool) -> Self {
        self.use_stop_words = enabled;
        self
    }

    /// Split text into normalized terms
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| token.len() >= self.min_token_len)
            .filter(|token| !self.use_stop_words || !STOP_WORDS.contains(token))
            .map(|token| token.to_string())
            .collect()
    }
}

/// Tokenize with the default settings
pub fn tokenize(text: &str) -> Vec<String> {
    Tokenizer::default().tokenize(text)
}
