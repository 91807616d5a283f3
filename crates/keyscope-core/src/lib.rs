use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parse a user-supplied page URL.
///
/// Accepts only absolute `http`/`https` URLs with a host. Surrounding whitespace is ignored.
pub fn parse_page_url(raw: &str) -> Result<url::Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::InvalidUrl("No URL provided".to_string()));
    }
    let url = url::Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::InvalidUrl(format!(
                "unsupported scheme {other:?} (expected http or https)"
            )))
        }
    }
    if url.host_str().map(|h| h.is_empty()).unwrap_or(true) {
        return Err(Error::InvalidUrl(format!("{raw}: missing host")));
    }
    Ok(url)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: String,
    /// Timeout for the whole request (connect + body).
    pub timeout_ms: Option<u64>,
    /// Hard cap on bytes read from the response body.
    pub max_bytes: Option<u64>,
    /// Optional headers to add (best-effort; adapter may drop unsafe headers).
    pub headers: BTreeMap<String, String>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: None,
            max_bytes: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub truncated: bool,
    pub timings_ms: BTreeMap<String, u128>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait]
pub trait FetchBackend: Send + Sync {
    async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse>;
}

const BUILTIN_STOPWORDS: &[&str] = &[
    // Basic English
    "the", "and", "for", "you", "your", "with", "that", "from", "this", "are", "was", "have",
    "will", "been", "would", "could", "should", "they", "their", "there", "some", "very", "just",
    "like", "such", "than", "into", "over", "also", "those", "these", "here", "what", "when",
    "where", "which", "while", "about", "more", "much", "many", "any", "has", "had", "were",
    "did", "does", "done", "our", "can", "not", "all", "too", "who", "its", "it's", "only",
    "because", "let's", "out", "via", "etc", "use", "then", "once", "after", "before", "being",
    "every", "http", "else", "still", "either", "them", "him", "her", "couldnt", "shouldnt",
    "com", "www", "https", "paid", "dont", "try", "miss", "products",
    // Marketing leftovers
    "free", "account", "advertising", "marketing", "model", "cpc", "cost", "click",
    "featurespricingapp", "centerenterprisesemrushblogcreate", "accountdont", "freecreate",
    "accountmarketing", "advertisingbenefits", "semrush",
];

const BUILTIN_NOISE_PHRASES: &[&str] = &[
    "featurespricingapp",
    "centerenterprisesemrushblogcreate",
    "accountdont",
    "freecreate",
    "accountmarketing",
    "advertisingbenefits",
    "modelsemrush",
];

/// Fold a word the way page tokens are folded: lowercase, letters and digits only.
///
/// `"Don't!"` becomes `"dont"`.
pub fn fold_term(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Stopwords and junk phrases used to filter page text.
///
/// Stopwords are stored folded (see [`fold_term`]) so entries like `"it's"` match the token
/// `"its"`. Noise phrases are only lowercased: they are matched against raw lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    stopwords: BTreeSet<String>,
    noise_phrases: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LexiconFile {
    stopwords: Option<Vec<String>>,
    noise_phrases: Option<Vec<String>>,
}

impl Lexicon {
    pub fn new<S, N>(stopwords: S, noise_phrases: N) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        let stopwords = stopwords
            .into_iter()
            .map(|s| fold_term(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        // Empty phrases would match every line.
        let mut noise: Vec<String> = Vec::new();
        for p in noise_phrases {
            let p = p.as_ref().trim().to_lowercase();
            if !p.is_empty() && !noise.contains(&p) {
                noise.push(p);
            }
        }
        Self {
            stopwords,
            noise_phrases: noise,
        }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_STOPWORDS, BUILTIN_NOISE_PHRASES)
    }

    /// A lexicon that filters nothing.
    pub fn empty() -> Self {
        Self::new(Vec::<String>::new(), Vec::<String>::new())
    }

    /// Parse `{ "stopwords": [...], "noise_phrases": [...] }`.
    ///
    /// A missing key keeps the built-in list for that half.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let f: LexiconFile =
            serde_json::from_slice(bytes).map_err(|e| Error::Config(format!("lexicon: {e}")))?;
        let builtin = Self::builtin();
        let stopwords = match f.stopwords {
            Some(v) => v,
            None => builtin.stopwords.into_iter().collect(),
        };
        let noise = match f.noise_phrases {
            Some(v) => v,
            None => builtin.noise_phrases,
        };
        Ok(Self::new(stopwords, noise))
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// True if `lowered` contains any noise phrase as a substring.
    pub fn contains_noise(&self, lowered: &str) -> bool {
        self.noise_phrases.iter().any(|p| lowered.contains(p.as_str()))
    }

    pub fn noise_phrases(&self) -> &[String] {
        &self.noise_phrases
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

/// One ranked term. `score` is a raw occurrence count (always >= 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub term: String,
    pub score: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub value: u32,
}

/// Supplementary SEO hints attached to every analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    pub competitor_keywords: Vec<String>,
    pub google_trends: BTreeMap<String, Vec<TrendPoint>>,
    pub ai_suggestions: Vec<String>,
}

#[async_trait::async_trait]
pub trait InsightsProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn insights(&self, url: &str, terms: &[FrequencyEntry]) -> Result<Insights>;
}

/// JSON payload returned by `/analyze`.
///
/// Field names are part of the wire contract consumed by the browser UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Preview of the cleaned page text (bounded, ends with "...").
    pub text: String,
    /// Top unigrams by raw frequency. Not actually TF-IDF; the name is kept for the UI.
    pub tfidf_terms: Vec<FrequencyEntry>,
    pub bigrams: Vec<String>,
    pub trigrams: Vec<String>,
    pub competitor_keywords: Vec<String>,
    pub google_trends: BTreeMap<String, Vec<TrendPoint>>,
    pub ai_suggestions: Vec<String>,
}
