//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod index;
mod matching;
mod plot;
mod print;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use geomention::config::{load_settings_with_options, LoadOptions};
use geomention::services::MatchStrategy;

#[derive(Parser)]
#[command(name = "geomention")]
#[command(about = "Find settlement mentions in parliamentary questions")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory with GeoNames children JSON files (overrides config)
    #[arg(short, long, global = true)]
    gazetteer: Option<PathBuf>,

    /// Question collection, JSON array or JSON lines (overrides config)
    #[arg(short, long, global = true)]
    documents: Option<PathBuf>,

    /// Matching strategy (overrides config)
    #[arg(short, long, global = true, value_enum)]
    strategy: Option<MatchStrategy>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Print gazetteer locations or aggregated matches as JSON
    Print {
        #[command(subcommand)]
        command: PrintCommands,
    },

    /// Render a map of mentioned settlements
    Plot {
        /// Mongo-style question filter, e.g. '{"mp.party": "A"}'
        #[arg(short, long, default_value = "{}")]
        query: String,
        /// Output SVG file (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Match a single piece of text and print the locations it mentions
    Match {
        /// Text to match
        text: String,
        /// Document ID reported with the matches
        #[arg(long, default_value = "-")]
        id: String,
    },

    /// Show gazetteer index statistics
    Index {
        /// List every key shared by more than one location
        #[arg(long)]
        ambiguous: bool,
    },
}

#[derive(Subcommand)]
enum PrintCommands {
    /// All gazetteer locations with display names and coordinates
    Locations,

    /// Locations mentioned by the questions selected by the query
    Matches {
        /// Mongo-style question filter
        #[arg(short, long, default_value = "{}")]
        query: String,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        gazetteer: cli.gazetteer,
        documents: cli.documents,
        strategy: cli.strategy,
    };
    let (settings, config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Print { command } => match command {
            PrintCommands::Locations => print::cmd_print_locations(&settings, &config).await,
            PrintCommands::Matches { query } => {
                print::cmd_print_matches(&settings, &config, &query).await
            }
        },
        Commands::Plot { query, output } => {
            plot::cmd_plot(&settings, &config, &query, output).await
        }
        Commands::Match { text, id } => matching::cmd_match(&settings, &config, &text, &id).await,
        Commands::Index { ambiguous } => index::cmd_index(&settings, &config, ambiguous).await,
    }
}
