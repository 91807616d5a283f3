use axum::{http::header, http::StatusCode, routing::get, Router};
use keyscope::server::{router, AppState, RouterOptions};
use keyscope_local::{Analyzer, AnalyzerConfig};
use std::net::SocketAddr;
use std::sync::Arc;

const PLAIN_PAGE: &str =
    "<html><body><script>x</script><p>SEO seo seo analysis analysis tool</p></body></html>";

const ARTICLE_PAGE: &str = r#"<!doctype html>
<html><head><title>Guide</title><style>.x{}</style></head>
<body>
  <nav class="navbar"><a href="/">Home</a><a href="/pricing">Pricing</a><a href="/login">Login</a></nav>
  <article>
    <h1>Keyword research guide</h1>
    <p>Keyword research drives content planning.</p>
    <p>Start today: freecreate account with premium planning widgets</p>
    <p>Good keyword research saves time.</p>
  </article>
  <footer class="footer">Copyright widgets inc</footer>
</body></html>"#;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn upstream() -> SocketAddr {
    let html = |body: &'static str| {
        get(move || async move { ([(header::CONTENT_TYPE, "text/html")], body) })
    };
    let app = Router::new()
        .route("/plain", html(PLAIN_PAGE))
        .route("/article", html(ARTICLE_PAGE))
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, "not here") }),
        );
    serve(app).await
}

async fn keyscope_with(opts: RouterOptions) -> SocketAddr {
    let analyzer = Analyzer::local(AnalyzerConfig::default(), None).unwrap();
    serve(router(AppState::new(Arc::new(analyzer)), &opts)).await
}

async fn keyscope() -> SocketAddr {
    keyscope_with(RouterOptions::default()).await
}

async fn get_analyze(ks: SocketAddr, url: &str) -> (u16, serde_json::Value) {
    let resp = reqwest::Client::new()
        .get(format!("http://{ks}/analyze"))
        .query(&[("url", url)])
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn get_analyze_ranks_terms_from_body_text() {
    let up = upstream().await;
    let ks = keyscope().await;

    let (status, v) = get_analyze(ks, &format!("http://{up}/plain")).await;
    assert_eq!(status, 200, "body={v}");
    assert_eq!(
        v["tfidf_terms"],
        serde_json::json!([
            {"term": "seo", "score": 3},
            {"term": "analysis", "score": 2},
            {"term": "tool", "score": 1}
        ])
    );
    assert_eq!(v["text"], "SEO seo seo analysis analysis tool...");
    assert_eq!(v["bigrams"][0], "seo seo");
    assert_eq!(v["trigrams"].as_array().map(|a| a.len()), Some(4));
    assert_eq!(
        v["competitor_keywords"],
        serde_json::json!(["competitor1", "competitor2"])
    );
    assert_eq!(v["google_trends"]["SEO"][1]["value"], 60);
    assert_eq!(v["ai_suggestions"].as_array().map(|a| a.len()), Some(2));
}

#[tokio::test]
async fn article_page_drops_navigation_and_noise_lines() {
    let up = upstream().await;
    let ks = keyscope().await;

    let (status, v) = get_analyze(ks, &format!("http://{up}/article")).await;
    assert_eq!(status, 200, "body={v}");
    let terms: Vec<&str> = v["tfidf_terms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["term"].as_str().unwrap())
        .collect();
    assert_eq!(terms[0], "keyword");
    assert_eq!(terms[1], "research");
    // The noisy line is dropped whole, including its legitimate words.
    assert!(!terms.contains(&"premium"));
    assert!(!terms.contains(&"widgets"));
    // Navigation and footer are outside the article block.
    assert!(!terms.contains(&"pricing"));
    assert!(!terms.contains(&"copyright"));
    assert_eq!(v["bigrams"][0], "keyword research");
}

#[tokio::test]
async fn post_analyze_accepts_json_body() {
    let up = upstream().await;
    let ks = keyscope().await;

    let resp = reqwest::Client::new()
        .post(format!("http://{ks}/analyze"))
        .json(&serde_json::json!({ "url": format!("http://{up}/plain") }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let v: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(v["tfidf_terms"][0]["term"], "seo");
}

#[tokio::test]
async fn missing_url_is_bad_request() {
    let ks = keyscope().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{ks}/analyze"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let v: serde_json::Value = resp.json().await.unwrap();
    assert!(v["error"].as_str().is_some_and(|s| !s.is_empty()));

    let resp = client
        .post(format!("http://{ks}/analyze"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn malformed_inputs_are_bad_requests() {
    let ks = keyscope().await;

    let (status, v) = get_analyze(ks, "not a url").await;
    assert_eq!(status, 400);
    assert!(v["error"].as_str().unwrap().contains("invalid url"));

    let (status, _) = get_analyze(ks, "ftp://example.com/file").await;
    assert_eq!(status, 400);

    let resp = reqwest::Client::new()
        .post(format!("http://{ks}/analyze"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let v: serde_json::Value = resp.json().await.unwrap();
    assert!(v.get("error").is_some());
}

#[tokio::test]
async fn unreachable_upstream_is_server_error_without_partial_result() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead = listener.local_addr().unwrap();
    drop(listener);
    let ks = keyscope().await;

    let (status, v) = get_analyze(ks, &format!("http://{dead}/")).await;
    assert_eq!(status, 500);
    assert_eq!(v["error"], "Failed to analyze URL.");
    assert!(v.get("text").is_none());
    assert!(v.get("tfidf_terms").is_none());
}

#[tokio::test]
async fn non_success_upstream_is_server_error() {
    let up = upstream().await;
    let ks = keyscope().await;

    let (status, v) = get_analyze(ks, &format!("http://{up}/missing")).await;
    assert_eq!(status, 500);
    assert!(v.get("error").is_some());
}

#[tokio::test]
async fn index_and_health_routes() {
    let ks = keyscope().await;
    let client = reqwest::Client::new();

    let body = client
        .get(format!("http://{ks}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("/analyze?url="));

    let resp = client
        .get(format!("http://{ks}/healthz"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn static_dir_is_served_at_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>keyscope ui</h1>").unwrap();
    let ks = keyscope_with(RouterOptions {
        static_dir: Some(dir.path().to_path_buf()),
        body_limit_bytes: None,
    })
    .await;

    let body = reqwest::get(format!("http://{ks}/"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("keyscope ui"));

    // API routes still win over the static fallback.
    let resp = reqwest::get(format!("http://{ks}/analyze")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}
