use keyscope_core::{Error, FetchBackend, FetchRequest, FetchResponse, Result};
use std::collections::BTreeMap;
use std::time::Duration;

pub mod analyze;
pub mod cache;
pub mod extract;
pub mod insights;
pub mod ngrams;
pub mod textprep;

pub use analyze::{Analyzer, AnalyzerConfig};
pub use cache::ResultCache;
pub use insights::StaticInsights;

/// Browser-like user agent. Plenty of sites reject obvious bot agents outright.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct LocalFetcher {
    client: reqwest::Client,
}

impl LocalFetcher {
    pub fn new(user_agent: Option<&str>) -> Result<Self> {
        let ua = user_agent
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_USER_AGENT);
        let client = reqwest::Client::builder()
            .user_agent(ua)
            .redirect(reqwest::redirect::Policy::limited(10))
            // Avoid hanging forever on DNS/TLS/body stalls; per-request timeouts override.
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Fetch(e.to_string()))?;
        Ok(Self { client })
    }

    fn is_sensitive_request_header(name: &reqwest::header::HeaderName) -> bool {
        // HeaderName::as_str() is canonical lower-case.
        matches!(
            name.as_str(),
            "authorization" | "cookie" | "proxy-authorization"
        )
    }

    fn apply_headers(
        &self,
        mut rb: reqwest::RequestBuilder,
        headers: &BTreeMap<String, String>,
    ) -> reqwest::RequestBuilder {
        for (k, v) in headers {
            if let (Ok(name), Ok(value)) = (
                reqwest::header::HeaderName::from_bytes(k.as_bytes()),
                reqwest::header::HeaderValue::from_str(v),
            ) {
                if Self::is_sensitive_request_header(&name) {
                    continue;
                }
                rb = rb.header(name, value);
            }
        }
        rb
    }

    fn map_reqwest_err(e: reqwest::Error, timeout: Option<Duration>) -> Error {
        if e.is_timeout() {
            return match timeout {
                Some(t) => Error::Fetch(format!("timed out after {}ms", t.as_millis())),
                None => Error::Fetch("timed out".to_string()),
            };
        }
        Error::Fetch(e.to_string())
    }
}

#[async_trait::async_trait]
impl FetchBackend for LocalFetcher {
    async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse> {
        let mut timings_ms = BTreeMap::new();
        let t_req = std::time::Instant::now();
        let url = url::Url::parse(&req.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let timeout = req.timeout();

        let mut rb = self.client.get(url);
        if let Some(to) = timeout {
            rb = rb.timeout(to);
        }
        rb = self.apply_headers(rb, &req.headers);
        let resp = rb
            .send()
            .await
            .map_err(|e| Self::map_reqwest_err(e, timeout))?;
        let final_url = resp.url().to_string();
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let max_bytes = req.max_bytes.unwrap_or(u64::MAX) as usize;
        let mut truncated = false;
        let mut bytes = Vec::new();
        let mut stream = resp.bytes_stream();
        use futures_util::StreamExt;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Self::map_reqwest_err(e, timeout))?;
            if bytes.len().saturating_add(chunk.len()) > max_bytes {
                let can_take = max_bytes.saturating_sub(bytes.len());
                bytes.extend_from_slice(&chunk[..can_take]);
                truncated = true;
                break;
            }
            bytes.extend_from_slice(&chunk);
        }

        timings_ms.insert("network_fetch".to_string(), t_req.elapsed().as_millis());
        Ok(FetchResponse {
            url: req.url.clone(),
            final_url,
            status,
            content_type,
            bytes,
            truncated,
            timings_ms,
        })
    }
}
