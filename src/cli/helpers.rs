//! Shared helper functions for CLI commands.

use std::sync::Arc;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};

use geomention::config::{Config, Settings};
use geomention::models::LocationMatches;
use geomention::repository::{load_gazetteer_dir, DocumentQuery, DocumentSource, JsonDocumentStore};
use geomention::services::pipeline::aggregate_documents_parallel;
use geomention::services::MatchContext;

/// Load the gazetteer and build the shared matching context.
pub fn load_context(settings: &Settings, config: &Config) -> anyhow::Result<Arc<MatchContext>> {
    let records = load_gazetteer_dir(&settings.gazetteer_dir, &settings.gazetteer_prefix)?;
    let context = config.match_context(records)?;

    let index = context.index();
    tracing::info!(
        "Indexed {} locations under {} keys ({} without a key)",
        index.len(),
        index.keys().len(),
        index.unkeyed_count()
    );
    Ok(Arc::new(context))
}

/// Open the configured question collection.
pub fn open_documents(settings: &Settings) -> anyhow::Result<JsonDocumentStore> {
    let Some(path) = settings.documents.as_deref() else {
        anyhow::bail!(
            "No question collection configured; pass --documents or set GEOMENTION_DOCUMENTS"
        );
    };
    let store = JsonDocumentStore::open(path)
        .with_context(|| format!("Failed to load questions from {}", path.display()))?;
    tracing::info!("Loaded {} questions from {}", store.len(), path.display());
    Ok(store)
}

pub fn parse_query(text: &str) -> anyhow::Result<DocumentQuery> {
    DocumentQuery::parse(text).with_context(|| format!("Invalid query: {}", text))
}

/// Progress bar over `len` documents, hidden for small collections.
pub fn progress_bar(len: usize) -> ProgressBar {
    if len < 100 {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );
    pb
}

/// Select questions with `query` and aggregate their mentions.
pub async fn aggregate_query(
    context: &Arc<MatchContext>,
    store: &JsonDocumentStore,
    query: &DocumentQuery,
    workers: usize,
) -> anyhow::Result<Vec<LocationMatches>> {
    let documents = store.find(query)?;
    let pb = progress_bar(documents.len());
    pb.set_message(format!("matching {}", query));

    let matches = aggregate_documents_parallel(Arc::clone(context), documents, workers, |n| {
        pb.inc(n as u64)
    })
    .await
    .context("Matching worker failed")?;

    pb.finish_and_clear();
    tracing::info!(
        "Query {} mentions {} locations",
        query,
        matches.len()
    );
    Ok(matches)
}
