//! Map rendering.

use std::path::PathBuf;

use console::style;

use geomention::config::{Config, Settings};
use geomention::render::MapRenderer;
use geomention::repository::DocumentQuery;
use geomention::services::aggregate::max_document_count;

use crate::cli::helpers::{aggregate_query, load_context, open_documents, parse_query};

/// Render the matches for `query` to an SVG map.
///
/// Marker sizes are scaled against the most-mentioned location over the
/// whole collection, not just the selected questions.
pub async fn cmd_plot(
    settings: &Settings,
    config: &Config,
    query: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let query = parse_query(query)?;
    let context = load_context(settings, config)?;
    let store = open_documents(settings)?;

    let matches = aggregate_query(&context, &store, &query, settings.workers).await?;
    let max_overall = if query.is_all() {
        max_document_count(&matches)
    } else {
        let overall =
            aggregate_query(&context, &store, &DocumentQuery::all(), settings.workers).await?;
        max_document_count(&overall)
    };

    let renderer = MapRenderer::new(config.map.extent, config.map.width);
    let svg = renderer.render(
        context.index(),
        &matches,
        max_overall,
        &query.to_string(),
    )?;

    let output = output.unwrap_or_else(|| settings.map_output.clone());
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&output, svg).await?;

    println!(
        "{} Plotted {} mentioned locations to {}",
        style("✓").green(),
        matches.len(),
        output.display()
    );
    Ok(())
}
