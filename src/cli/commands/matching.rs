//! Ad-hoc matching of a single text.

use console::style;

use geomention::config::{Config, Settings};
use geomention::models::{Document, LocationListing};

use crate::cli::helpers::load_context;

/// Match `text` as one document and print the locations it mentions.
pub async fn cmd_match(
    settings: &Settings,
    config: &Config,
    text: &str,
    id: &str,
) -> anyhow::Result<()> {
    let context = load_context(settings, config)?;
    let document = Document::new(id, text);
    let mentions = context.match_document(&document);

    if mentions.is_empty() {
        eprintln!(
            "{} No locations mentioned (strategy: {})",
            style("!").yellow(),
            context.strategy().as_str()
        );
    }

    let listings: Vec<LocationListing> = mentions
        .iter()
        .filter_map(|mention| context.index().location(mention.location_id))
        .map(|record| record.listing())
        .collect();
    println!("{}", serde_json::to_string_pretty(&listings)?);
    Ok(())
}
