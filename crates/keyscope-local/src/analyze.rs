//! Page analysis: fetch -> extract -> normalize -> rank -> assemble.

use crate::cache::ResultCache;
use crate::extract::{decode_body, extract_main_text};
use crate::insights::StaticInsights;
use crate::ngrams::{Engine, KeywordStats, TopK};
use crate::textprep::{Normalizer, DEFAULT_MIN_TOKEN_LEN};
use crate::LocalFetcher;
use keyscope_core::{
    parse_page_url, AnalysisResult, Error, FetchBackend, FetchRequest, Insights, InsightsProvider,
    Lexicon, Result,
};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_PREVIEW_CHARS: usize = 200;
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub timeout_ms: u64,
    pub max_bytes: u64,
    pub preview_chars: usize,
    pub min_token_len: usize,
    pub top_k: TopK,
    pub cache_capacity: usize,
    pub lexicon: Arc<Lexicon>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_bytes: DEFAULT_MAX_BYTES,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
            top_k: TopK::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            lexicon: Arc::new(Lexicon::default()),
        }
    }
}

/// First `max_chars` characters of `cleaned` followed by "...".
pub fn preview(cleaned: &str, max_chars: usize) -> String {
    let mut out: String = cleaned.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// Keyword statistics plus the cleaned text they were computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageKeywords {
    pub engine: &'static str,
    pub cleaned: String,
    pub stats: KeywordStats,
}

pub struct Analyzer {
    cfg: AnalyzerConfig,
    fetcher: Arc<dyn FetchBackend>,
    insights: Arc<dyn InsightsProvider>,
    normalizer: Normalizer,
    engine: Engine,
    cache: ResultCache,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("cfg", &self.cfg)
            .field("insights", &self.insights.name())
            .field("cache_len", &self.cache.len())
            .finish()
    }
}

impl Analyzer {
    pub fn new(
        cfg: AnalyzerConfig,
        fetcher: Arc<dyn FetchBackend>,
        insights: Arc<dyn InsightsProvider>,
    ) -> Self {
        let normalizer = Normalizer::new(cfg.min_token_len, Arc::clone(&cfg.lexicon));
        let engine = Engine::new(Arc::clone(&cfg.lexicon), cfg.top_k);
        let cache = ResultCache::new(cfg.cache_capacity);
        Self {
            cfg,
            fetcher,
            insights,
            normalizer,
            engine,
            cache,
        }
    }

    /// Analyzer backed by [`LocalFetcher`] and [`StaticInsights`].
    pub fn local(cfg: AnalyzerConfig, user_agent: Option<&str>) -> Result<Self> {
        let fetcher = LocalFetcher::new(user_agent)?;
        Ok(Self::new(cfg, Arc::new(fetcher), Arc::new(StaticInsights)))
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.cfg
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Keyword statistics for an HTML document. Pure; never fails.
    pub fn keywords_from_html(&self, html: &str, base_url: Option<&str>) -> PageKeywords {
        let extracted = extract_main_text(html, base_url);
        tracing::debug!(
            engine = extracted.engine,
            warnings = ?extracted.warnings,
            chars = extracted.text.len(),
            "extracted page text"
        );
        let normalized = self.normalizer.run(&extracted.text);
        let stats = self.engine.keywords(&normalized.tokens);
        PageKeywords {
            engine: extracted.engine,
            cleaned: normalized.cleaned,
            stats,
        }
    }

    /// Full result for an HTML document (no fetch, no cache).
    pub async fn analyze_html(&self, url: &str, html: &str) -> AnalysisResult {
        let page = self.keywords_from_html(html, Some(url));
        let insights = match self.insights.insights(url, &page.stats.unigrams).await {
            Ok(i) => i,
            Err(e) => {
                tracing::warn!(provider = self.insights.name(), error = %e, "insights failed");
                Insights::default()
            }
        };
        AnalysisResult {
            text: preview(&page.cleaned, self.cfg.preview_chars),
            bigrams: page.stats.bigram_terms(),
            trigrams: page.stats.trigram_terms(),
            tfidf_terms: page.stats.unigrams,
            competitor_keywords: insights.competitor_keywords,
            google_trends: insights.google_trends,
            ai_suggestions: insights.ai_suggestions,
        }
    }

    /// Validate, fetch and analyze `url`.
    ///
    /// Errors: [`Error::InvalidUrl`] for missing/malformed input, [`Error::Fetch`] for network
    /// failures, timeouts and non-2xx responses. No retries.
    pub async fn analyze(&self, url: &str) -> Result<Arc<AnalysisResult>> {
        let parsed = parse_page_url(url)?;
        let key = parsed.to_string();

        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(url = %key, "analysis cache hit");
            return Ok(hit);
        }

        tracing::info!(url = %key, "fetching page");
        let req = FetchRequest {
            url: key.clone(),
            timeout_ms: Some(self.cfg.timeout_ms),
            max_bytes: Some(self.cfg.max_bytes),
            headers: Default::default(),
        };
        // Outer bound in case a backend ignores `timeout_ms`.
        let budget = Duration::from_millis(self.cfg.timeout_ms);
        let resp = match tokio::time::timeout(budget, self.fetcher.fetch(&req)).await {
            Ok(r) => r?,
            Err(_) => {
                return Err(Error::Fetch(format!(
                    "timed out after {}ms",
                    self.cfg.timeout_ms
                )))
            }
        };
        tracing::debug!(
            url = %key,
            status = resp.status,
            content_type = resp.content_type.as_deref().unwrap_or(""),
            fetch_ms = resp.timings_ms.get("network_fetch").copied().unwrap_or(0) as u64,
            "fetched page"
        );
        if !resp.is_success() {
            return Err(Error::Fetch(format!("upstream returned HTTP {}", resp.status)));
        }
        if resp.truncated {
            tracing::debug!(url = %key, max_bytes = self.cfg.max_bytes, "body truncated");
        }

        let html = decode_body(&resp.bytes);
        let result = Arc::new(self.analyze_html(&resp.final_url, &html).await);
        self.cache.insert(key, Arc::clone(&result));
        Ok(result)
    }
}
