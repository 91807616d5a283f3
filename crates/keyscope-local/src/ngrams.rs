//! Frequency tables over token windows (unigrams, bigrams, trigrams).

use keyscope_core::{FrequencyEntry, Lexicon};
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_UNIGRAM_TOP_K: usize = 20;
pub const DEFAULT_BIGRAM_TOP_K: usize = 10;
pub const DEFAULT_TRIGRAM_TOP_K: usize = 10;

/// Counts of space-joined n-token windows, remembering first-seen order.
#[derive(Debug, Clone, Default)]
pub struct NGramTable {
    index: HashMap<String, usize>,
    entries: Vec<FrequencyEntry>,
}

impl NGramTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, key: &str) -> u64 {
        self.index
            .get(key)
            .map(|&i| self.entries[i].score)
            .unwrap_or(0)
    }

    fn bump(&mut self, key: String) {
        if let Some(&i) = self.index.get(&key) {
            self.entries[i].score += 1;
            return;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(FrequencyEntry {
            term: key,
            score: 1,
        });
    }

    /// Entries by descending count; equal counts keep first-seen order.
    pub fn ranked(&self) -> Vec<FrequencyEntry> {
        let mut out = self.entries.clone();
        // `sort_by` is stable, which is what makes ties deterministic.
        out.sort_by(|a, b| b.score.cmp(&a.score));
        out
    }
}

/// Count every window of `n` consecutive tokens (step 1).
///
/// `n == 0` or fewer than `n` tokens gives an empty table.
pub fn count_ngrams<S: AsRef<str>>(tokens: &[S], n: usize) -> NGramTable {
    let mut table = NGramTable::default();
    if n == 0 || tokens.len() < n {
        return table;
    }
    for window in tokens.windows(n) {
        let key = window
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(" ");
        table.bump(key);
    }
    table
}

/// Rank the `n`-gram table of `tokens` and keep the first `top_k` entries.
pub fn build_frequencies<S: AsRef<str>>(
    tokens: &[S],
    n: usize,
    top_k: usize,
) -> Vec<FrequencyEntry> {
    let mut ranked = count_ngrams(tokens, n).ranked();
    ranked.truncate(top_k);
    ranked
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordStats {
    pub unigrams: Vec<FrequencyEntry>,
    pub bigrams: Vec<FrequencyEntry>,
    pub trigrams: Vec<FrequencyEntry>,
}

impl KeywordStats {
    pub fn bigram_terms(&self) -> Vec<String> {
        self.bigrams.iter().map(|e| e.term.clone()).collect()
    }

    pub fn trigram_terms(&self) -> Vec<String> {
        self.trigrams.iter().map(|e| e.term.clone()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopK {
    pub unigrams: usize,
    pub bigrams: usize,
    pub trigrams: usize,
}

impl Default for TopK {
    fn default() -> Self {
        Self {
            unigrams: DEFAULT_UNIGRAM_TOP_K,
            bigrams: DEFAULT_BIGRAM_TOP_K,
            trigrams: DEFAULT_TRIGRAM_TOP_K,
        }
    }
}

/// Builds the three ranked keyword lists for one token sequence.
#[derive(Debug, Clone)]
pub struct Engine {
    lexicon: Arc<Lexicon>,
    top_k: TopK,
}

impl Engine {
    pub fn new(lexicon: Arc<Lexicon>, top_k: TopK) -> Self {
        Self { lexicon, top_k }
    }

    /// Multi-token entries that still contain a noise phrase are removed after truncation,
    /// so bigram/trigram lists can come back shorter than their limit.
    pub fn keywords<S: AsRef<str>>(&self, tokens: &[S]) -> KeywordStats {
        let unigrams = build_frequencies(tokens, 1, self.top_k.unigrams);
        let mut bigrams = build_frequencies(tokens, 2, self.top_k.bigrams);
        let mut trigrams = build_frequencies(tokens, 3, self.top_k.trigrams);
        bigrams.retain(|e| !self.lexicon.contains_noise(&e.term));
        trigrams.retain(|e| !self.lexicon.contains_noise(&e.term));
        KeywordStats {
            unigrams,
            bigrams,
            trigrams,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Arc::new(Lexicon::default()), TopK::default())
    }
}
