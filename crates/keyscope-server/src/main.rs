use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keyscope::config::{load_env_file, PipelineArgs};
use keyscope::server::{self, AppState, RouterOptions};
use keyscope_local::Analyzer;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "keyscope")]
#[command(about = "Page keyword inspection (HTTP service + CLI)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP service (`/analyze`).
    Serve(ServeCmd),
    /// Analyze one URL and print the result.
    Analyze(AnalyzeCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct ServeCmd {
    /// Address to bind.
    #[arg(long, env = "KEYSCOPE_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,
    /// Directory of static UI assets served at `/`.
    #[arg(long, env = "KEYSCOPE_STATIC_DIR")]
    static_dir: Option<std::path::PathBuf>,
    /// Request body cap for `POST /analyze` (bytes).
    #[arg(long, env = "KEYSCOPE_BODY_LIMIT_BYTES", default_value_t = 64 * 1024)]
    body_limit_bytes: usize,
    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(clap::Args, Debug)]
struct AnalyzeCmd {
    /// Page to analyze (absolute http/https URL).
    #[arg(long)]
    url: String,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("keyscope=info,keyscope_local=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed.
        std::future::pending::<()>().await;
    }
}

fn print_text(r: &keyscope_core::AnalysisResult) {
    println!("text: {}", r.text);
    println!("terms:");
    for t in &r.tfidf_terms {
        println!("  {:>4}  {}", t.score, t.term);
    }
    println!("bigrams:");
    for b in &r.bigrams {
        println!("  {b}");
    }
    println!("trigrams:");
    for t in &r.trigrams {
        println!("  {t}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env_file();
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Serve(args) => {
            let cfg = args.pipeline.analyzer_config()?;
            let analyzer = Analyzer::local(cfg, args.pipeline.user_agent.as_deref())?;
            let opts = RouterOptions {
                static_dir: args.static_dir,
                body_limit_bytes: Some(args.body_limit_bytes),
            };
            let app = server::router(AppState::new(Arc::new(analyzer)), &opts);
            let listener = tokio::net::TcpListener::bind(args.bind)
                .await
                .with_context(|| format!("failed to bind {}", args.bind))?;
            server::serve(listener, app, shutdown_signal()).await?;
        }
        Commands::Analyze(args) => {
            let cfg = args.pipeline.analyzer_config()?;
            let analyzer = Analyzer::local(cfg, args.pipeline.user_agent.as_deref())?;
            let result = analyzer.analyze(&args.url).await?;
            match args.output.to_ascii_lowercase().as_str() {
                "text" => print_text(&result),
                _ => println!("{}", serde_json::to_string_pretty(&*result)?),
            }
        }
        Commands::Version(args) => {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "version",
                "ok": true,
                "name": "keyscope",
                "version": env!("CARGO_PKG_VERSION"),
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => println!("keyscope {}", env!("CARGO_PKG_VERSION")),
                _ => println!("{}", v),
            }
        }
    }
    Ok(())
}
