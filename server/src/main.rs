use anyhow::Result;
use clap::{Parser, ValueEnum};
use server::{build_app, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};
use vsm_core::IndexTerms;

#[derive(Clone, Copy, ValueEnum)]
enum CandidateTerms {
    /// Lowercased whitespace tokens of the raw query
    Raw,
    /// Terms produced by the query normalizer
    Normalized,
}

/// Serve TF-IDF search over a store written by `indexer build`.
#[derive(Parser)]
#[command(name = "server")]
struct Args {
    /// Store directory holding meta.json, dictionary.bin and vectors/
    #[arg(long, default_value = "./store")]
    store: PathBuf,
    /// Extra stop words applied to queries, one per line
    #[arg(long)]
    stop_words: Option<PathBuf>,
    /// How the indexed search mode selects candidate documents
    #[arg(long, value_enum, default_value_t = CandidateTerms::Raw)]
    index_terms: CandidateTerms,
    /// Allowed CORS origins, comma separated; falls back to CORS_ALLOW_ORIGIN, then any origin
    #[arg(long, value_delimiter = ',')]
    cors_origin: Vec<String>,
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let allowed_origins = if args.cors_origin.is_empty() {
        std::env::var("CORS_ALLOW_ORIGIN")
            .map(|v| v.split(',').map(str::to_string).collect())
            .unwrap_or_default()
    } else {
        args.cors_origin
    };
    let config = ServerConfig {
        store: args.store,
        stop_words: args.stop_words,
        index_terms: match args.index_terms {
            CandidateTerms::Raw => IndexTerms::Raw,
            CandidateTerms::Normalized => IndexTerms::Normalized,
        },
        allowed_origins,
    };
    let app = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "search server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
