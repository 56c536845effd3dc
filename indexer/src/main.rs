use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};
use vsm_core::persist::{load_store, save_build, StorePaths};
use vsm_core::{
    Corpus, IndexTerms, InvertedIndex, Preprocessor, SearchSession, StandardPreprocessor, VectorModel,
    VectorStore,
};
use walkdir::WalkDir;

use std::fs;
use std::path::Path;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query a TF-IDF vector store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Exhaustive,
    Indexed,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize raw documents into one-line term files
    Preprocess {
        /// Directory of raw text documents
        #[arg(long)]
        input: String,
        /// Output directory for normalized documents
        #[arg(long)]
        output: String,
        /// Extra stop words, one per line
        #[arg(long)]
        stop_words: Option<String>,
    },
    /// Build vocabulary and document vectors from a normalized corpus
    Build {
        /// Directory of normalized documents
        #[arg(long)]
        corpus: String,
        /// Output store directory
        #[arg(long)]
        output: String,
        /// Also persist the inverted index
        #[arg(long, default_value_t = false)]
        with_index: bool,
    },
    /// Run one query against a store
    Query {
        /// Store directory
        #[arg(long)]
        store: String,
        /// Query text
        #[arg(long)]
        q: String,
        #[arg(long, default_value_t = 10)]
        k: usize,
        #[arg(long, value_enum, default_value_t = Mode::Exhaustive)]
        mode: Mode,
        /// Pick index candidates from normalized terms instead of raw lowercase tokens
        #[arg(long, default_value_t = false)]
        normalized_index_terms: bool,
        /// Rebuild the vocabulary from this corpus instead of the stored dictionary
        #[arg(long)]
        corpus: Option<String>,
        #[arg(long)]
        stop_words: Option<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Preprocess { input, output, stop_words } => {
            preprocess(&input, &output, stop_words.as_deref())
        }
        Commands::Build { corpus, output, with_index } => build_store(&corpus, &output, with_index),
        Commands::Query { store, q, k, mode, normalized_index_terms, corpus, stop_words } => {
            let index_terms = if normalized_index_terms { IndexTerms::Normalized } else { IndexTerms::Raw };
            run_query(&store, &q, k, mode, index_terms, corpus.as_deref(), stop_words.as_deref())
        }
    }
}

fn preprocessor(stop_words: Option<&str>) -> Result<StandardPreprocessor> {
    let p = StandardPreprocessor::new();
    Ok(match stop_words {
        Some(path) => p.with_stopwords_file(path)?,
        None => p,
    })
}

fn preprocess(input: &str, output: &str, stop_words: Option<&str>) -> Result<()> {
    let p = preprocessor(stop_words)?;
    let out_dir = Path::new(output);
    fs::create_dir_all(out_dir)?;

    let mut count = 0usize;
    for entry in WalkDir::new(input).min_depth(1).max_depth(1).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let raw = fs::read_to_string(entry.path())
            .with_context(|| format!("reading {}", entry.path().display()))?;
        let terms = p.normalize(&raw);
        fs::write(out_dir.join(entry.file_name()), terms.join(" ") + "\n")?;
        count += 1;
    }
    tracing::info!(count, output, "normalized documents");
    Ok(())
}

fn build_store(corpus_dir: &str, output: &str, with_index: bool) -> Result<()> {
    let corpus = Corpus::load(corpus_dir)?;
    let (model, tables) = VectorModel::build(&corpus)?;
    let store = VectorStore::build(&model, &tables, &corpus);

    let index = with_index.then(|| InvertedIndex::build(&store, model.vocabulary()));
    save_build(&StorePaths::new(output), &model, &store, index.as_ref())?;

    tracing::info!(output, num_docs = store.len(), dimension = store.dimension(), "store build complete");
    Ok(())
}

fn run_query(
    store_dir: &str,
    q: &str,
    k: usize,
    mode: Mode,
    index_terms: IndexTerms,
    corpus_dir: Option<&str>,
    stop_words: Option<&str>,
) -> Result<()> {
    let paths = StorePaths::new(store_dir);
    let p = preprocessor(stop_words)?;

    let session = match corpus_dir {
        Some(dir) => {
            let corpus = Corpus::load(dir)?;
            let (model, _) = VectorModel::build(&corpus)?;
            let store = load_store(&paths, &model)?;
            SearchSession::new(model, store, p)
        }
        None => SearchSession::open(&paths, p)?,
    }
    .index_terms(index_terms);

    let hits = match mode {
        Mode::Exhaustive => session.search(q, k)?,
        Mode::Indexed => session.search_indexed(q)?,
    };
    for hit in &hits {
        println!("{}", serde_json::to_string(hit)?);
    }
    Ok(())
}
