use keyscope_core::{Error, Lexicon, Result};
use keyscope_local::analyze::{
    AnalyzerConfig, DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_BYTES, DEFAULT_PREVIEW_CHARS,
    DEFAULT_TIMEOUT_MS,
};
use keyscope_local::ngrams::TopK;
use keyscope_local::textprep::DEFAULT_MIN_TOKEN_LEN;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Pipeline knobs shared by `serve` and `analyze`.
#[derive(clap::Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Timeout for the upstream page fetch (ms).
    #[arg(long, env = "KEYSCOPE_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,
    /// Hard cap on bytes read from the upstream body.
    #[arg(long, env = "KEYSCOPE_MAX_BYTES", default_value_t = DEFAULT_MAX_BYTES)]
    pub max_bytes: u64,
    /// Characters of cleaned text included in the `text` preview.
    #[arg(long, env = "KEYSCOPE_PREVIEW_CHARS", default_value_t = DEFAULT_PREVIEW_CHARS)]
    pub preview_chars: usize,
    /// Minimum token length (characters).
    #[arg(long, env = "KEYSCOPE_MIN_TOKEN_LEN", default_value_t = DEFAULT_MIN_TOKEN_LEN)]
    pub min_token_len: usize,
    /// Number of cached analyses kept in memory (LRU). 0 disables the cache.
    #[arg(long, env = "KEYSCOPE_CACHE_CAPACITY", default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: usize,
    /// JSON lexicon file: {"stopwords": [...], "noise_phrases": [...]}.
    #[arg(long, env = "KEYSCOPE_LEXICON")]
    pub lexicon: Option<PathBuf>,
    /// User-Agent sent upstream (default: a browser-like agent).
    #[arg(long, env = "KEYSCOPE_USER_AGENT")]
    pub user_agent: Option<String>,
}

impl Default for PipelineArgs {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_bytes: DEFAULT_MAX_BYTES,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            lexicon: None,
            user_agent: None,
        }
    }
}

pub fn load_lexicon(path: Option<&Path>) -> Result<Lexicon> {
    let Some(p) = path else {
        return Ok(Lexicon::default());
    };
    let bytes =
        std::fs::read(p).map_err(|e| Error::Config(format!("read {}: {e}", p.display())))?;
    Lexicon::from_json(&bytes)
}

impl PipelineArgs {
    pub fn analyzer_config(&self) -> Result<AnalyzerConfig> {
        if self.timeout_ms == 0 {
            return Err(Error::Config("timeout_ms must be > 0".to_string()));
        }
        let lexicon = load_lexicon(self.lexicon.as_deref())?;
        Ok(AnalyzerConfig {
            timeout_ms: self.timeout_ms,
            max_bytes: self.max_bytes,
            preview_chars: self.preview_chars,
            min_token_len: self.min_token_len,
            top_k: TopK::default(),
            cache_capacity: self.cache_capacity,
            lexicon: Arc::new(lexicon),
        })
    }
}

/// Load `KEY=VALUE` lines from `KEYSCOPE_ENV_FILE`, if set.
///
/// Only sets variables that are not already present in the process environment, and never
/// logs values.
pub fn load_env_file() {
    let Ok(p) = std::env::var("KEYSCOPE_ENV_FILE") else {
        return;
    };
    let p = p.trim();
    if p.is_empty() {
        return;
    }
    let Ok(txt) = std::fs::read_to_string(p) else {
        return;
    };
    for (k, v) in parse_env_lines(&txt) {
        if std::env::var_os(k).is_none() {
            std::env::set_var(k, v);
        }
    }
}

fn parse_env_lines(txt: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    for raw in txt.lines() {
        let s = raw.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        let Some((k, v)) = s.split_once('=') else {
            continue;
        };
        let k = k.trim();
        if k.is_empty() {
            continue;
        }
        out.push((k, v.trim()));
    }
    out
}
