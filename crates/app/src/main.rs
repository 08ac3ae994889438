mod config;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use config::{Credentials, EmbeddingProvider, Settings, DEFAULT_CONFIG_PATH};
use k12_ingest_core::{
    CharacterNgramEmbedder, Classification, DocumentStore, Embedder, HuggingFaceEmbedder,
    IngestionPipeline, IngestionRequest, LopdfLoader, OpenSearchDocumentStore, PineconeIndex,
    SystemClock, VectorIndex, DEFAULT_AUTHOR,
};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "k12-ingest", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// YAML settings file
    #[arg(long, env = "K12_INGEST_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Append-only log file; overrides logging.file from the settings
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Load one PDF and write it to the document store and the vector index.
    Ingest {
        /// PDF to ingest.
        #[arg(long)]
        file: PathBuf,
        /// Target collection; also used as the vector namespace.
        #[arg(long)]
        collection: String,
        #[arg(long)]
        board: String,
        #[arg(long)]
        language: String,
        /// Class or grade, e.g. 5.
        #[arg(long = "class")]
        class: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        subject_part: u32,
        #[arg(long, default_value = DEFAULT_AUTHOR)]
        author: String,
        /// Repeat for several tags.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Report whether the collection and the vector index have been provisioned.
    Status {
        #[arg(long)]
        collection: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");
    let cli = Cli::parse();

    let settings = Settings::load(&cli.config)?;
    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| settings.logging.file.clone());
    init_logging(&log_file)?;

    let credentials = Credentials::from_env()?;

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        database = %settings.document_store.database,
        index = %settings.vector_index.index_name,
        "k12-ingest boot"
    );

    let document_store = OpenSearchDocumentStore::new(
        &credentials.document_store_uri,
        &settings.document_store.database,
    )
    .context("invalid DOCUMENT_STORE_URI")?;
    let vector_index = PineconeIndex::new(
        &settings.vector_index.controller_url,
        &credentials.pinecone_api_key,
    );

    match cli.command {
        Command::Ingest {
            file,
            collection,
            board,
            language,
            class,
            subject,
            subject_part,
            author,
            tags,
        } => {
            let embedder = build_embedder(&settings, &credentials)?;
            let pipeline = IngestionPipeline::new(
                LopdfLoader,
                document_store,
                vector_index,
                &settings.vector_index.index_name,
                embedder,
                Arc::new(SystemClock),
            )?;

            let request = IngestionRequest {
                file_path: file,
                collection,
                classification: Classification::new(board, language, class, subject, subject_part)
                    .with_author(author)
                    .with_tags(tags),
            };

            let report = pipeline.ingest(request).await?;

            println!(
                "{} page(s) from collection={} namespace={}: documents {}, vectors {}",
                report.pages_loaded,
                report.collection,
                report.namespace,
                report.documents,
                report.vectors
            );
        }
        Command::Status { collection } => {
            let collection = collection.to_uppercase();
            let index_name = &settings.vector_index.index_name;

            let collection_ready = document_store.collection_exists(&collection).await?;
            let index_ready = vector_index.index_exists(index_name).await?;

            println!(
                "collection {collection} (index {}): {}",
                document_store.index_for(&collection),
                if collection_ready { "present" } else { "missing" }
            );
            println!(
                "vector index {index_name}: {}",
                if index_ready { "present" } else { "missing" }
            );
        }
    }

    Ok(())
}

fn build_embedder(
    settings: &Settings,
    credentials: &Credentials,
) -> anyhow::Result<Box<dyn Embedder>> {
    let embeddings = &settings.embeddings;
    Ok(match embeddings.provider {
        EmbeddingProvider::Huggingface => Box::new(HuggingFaceEmbedder::new(
            &embeddings.endpoint,
            &embeddings.model,
            Some(credentials.require_hf_token()?),
        )),
        EmbeddingProvider::Ngram => Box::new(CharacterNgramEmbedder::default()),
    })
}

fn init_logging(log_file: &Path) -> anyhow::Result<()> {
    let sink = open_log_sink(log_file)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(sink)))
        .init();

    Ok(())
}

// Earlier runs' lines are kept; the parent directory is created on first use.
fn open_log_sink(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}
