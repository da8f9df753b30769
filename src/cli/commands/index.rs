//! Gazetteer index statistics.

use console::style;

use geomention::config::{Config, Settings};

use crate::cli::helpers::load_context;

pub async fn cmd_index(settings: &Settings, config: &Config, ambiguous: bool) -> anyhow::Result<()> {
    let context = load_context(settings, config)?;
    let index = context.index();
    let shared = index.ambiguous_keys();

    println!(
        "{} {} locations from {}",
        style("✓").green(),
        index.len(),
        settings.gazetteer_dir.display()
    );
    println!("  Keys:             {}", index.keys().len());
    println!("  Shared keys:      {}", shared.len());
    println!("  Without a key:    {}", index.unkeyed_count());
    println!("  Stemmer:          {}", config.stemmer);
    println!("  Strategy:         {}", context.strategy().as_str());

    if ambiguous {
        for (key, count) in shared {
            let names: Vec<&str> = index.get(key).map(|r| r.name.as_str()).collect();
            println!("  {} ({}): {}", style(key).cyan(), count, names.join(", "));
        }
    }
    Ok(())
}
