//! JSON listings of locations and matches.

use geomention::config::{Config, Settings};
use geomention::models::LocationListing;

use crate::cli::helpers::{aggregate_query, load_context, open_documents, parse_query};

/// Print every gazetteer location, in load order.
pub async fn cmd_print_locations(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    let context = load_context(settings, config)?;
    let listings: Vec<LocationListing> = context
        .index()
        .records()
        .iter()
        .map(|record| record.listing())
        .collect();
    println!("{}", serde_json::to_string_pretty(&listings)?);
    Ok(())
}

/// Print the aggregated matches of the questions selected by `query`.
pub async fn cmd_print_matches(
    settings: &Settings,
    config: &Config,
    query: &str,
) -> anyhow::Result<()> {
    let query = parse_query(query)?;
    let context = load_context(settings, config)?;
    let store = open_documents(settings)?;

    let matches = aggregate_query(&context, &store, &query, settings.workers).await?;
    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}
