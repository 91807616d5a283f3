//! Deterministic text normalization: page text in, keyword tokens out.
//!
//! The order of steps matters. Noise filtering happens per *line*, before tokenization, so a
//! boilerplate line is dropped as a whole even when it also carries legitimate words.

use keyscope_core::{fold_term, Lexicon};
use std::sync::Arc;

pub const DEFAULT_MIN_TOKEN_LEN: usize = 3;

/// Lines of `raw` that survive the noise-phrase filter, trimmed and non-empty.
fn kept_lines<'a>(raw: &'a str, lexicon: &'a Lexicon) -> impl Iterator<Item = &'a str> + 'a {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(move |l| !lexicon.contains_noise(&l.to_lowercase()))
}

/// Join surviving lines into one string with single spaces.
pub fn clean_text(raw: &str, lexicon: &Lexicon) -> String {
    let joined = kept_lines(raw, lexicon).collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Token sequence of `raw_text`, in document order.
///
/// Tokens shorter than `min_len` characters and stopwords are dropped.
pub fn normalize(raw_text: &str, min_len: usize, lexicon: &Lexicon) -> Vec<String> {
    tokens_from_clean(&clean_text(raw_text, lexicon), min_len, lexicon)
}

fn tokens_from_clean(cleaned: &str, min_len: usize, lexicon: &Lexicon) -> Vec<String> {
    cleaned
        .split_whitespace()
        .map(fold_term)
        .filter(|t| !t.is_empty() && t.chars().count() >= min_len)
        .filter(|t| !lexicon.is_stopword(t))
        .collect()
}

/// Output of one normalization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Noise-filtered text collapsed to a single line.
    pub cleaned: String,
    pub tokens: Vec<String>,
}

/// Normalizer bound to a lexicon and a minimum token length.
#[derive(Debug, Clone)]
pub struct Normalizer {
    min_len: usize,
    lexicon: Arc<Lexicon>,
}

impl Normalizer {
    pub fn new(min_len: usize, lexicon: Arc<Lexicon>) -> Self {
        Self {
            min_len: min_len.max(1),
            lexicon,
        }
    }

    pub fn clean_text(&self, raw: &str) -> String {
        clean_text(raw, &self.lexicon)
    }

    pub fn tokens(&self, raw: &str) -> Vec<String> {
        normalize(raw, self.min_len, &self.lexicon)
    }

    /// Cleaned text and tokens from a single pass over the lines.
    pub fn run(&self, raw: &str) -> Normalized {
        let cleaned = self.clean_text(raw);
        let tokens = tokens_from_clean(&cleaned, self.min_len, &self.lexicon);
        Normalized { cleaned, tokens }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TOKEN_LEN, Arc::new(Lexicon::default()))
    }
}
