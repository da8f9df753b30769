//! Configuration management for geomention using the prefer crate.
//!
//! A config file is discovered with `prefer::load("geomention")` or given
//! explicitly with `--config`. TOML, YAML and JSON are accepted, chosen by
//! file extension. Relative paths resolve against the config file's
//! directory, or the working directory when no file was found.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::LocationRecord;
use crate::render::MapExtent;
use crate::services::extractor::GREEK_CAPITALS;
use crate::services::gazetteer::GazetteerError;
use crate::services::stemmer::stemmer_from_name;
use crate::services::{CapitalAlphabet, MatchContext, MatchStrategy, Stemmer};

/// Environment variable overriding the gazetteer directory.
pub const GAZETTEER_DIR_ENV: &str = "GEOMENTION_GAZETTEER_DIR";
/// Environment variable overriding the document collection path.
pub const DOCUMENTS_ENV: &str = "GEOMENTION_DOCUMENTS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("Unknown stemmer '{0}'")]
    UnknownStemmer(String),

    #[error("No capital letters configured")]
    EmptyAlphabet,
}

/// Map output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub extent: MapExtent,
    /// Image width in pixels; the height follows from the extent.
    pub width: f64,
    pub output: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            extent: MapExtent::default(),
            width: 900.0,
            output: "map.svg".to_string(),
        }
    }
}

/// File configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the GeoNames children JSON files.
    pub gazetteer_dir: String,
    /// Only files whose name starts with this prefix are loaded.
    pub gazetteer_prefix: String,
    /// JSON or JSONL file with the question collection.
    pub documents: Option<String>,
    /// Letters that make a token "capitalized" for phrase extraction.
    pub capital_letters: String,
    /// Snowball language name, or "none".
    pub stemmer: String,
    pub strategy: MatchStrategy,
    pub workers: usize,
    pub map: MapConfig,

    /// Path the config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gazetteer_dir: "data".to_string(),
            gazetteer_prefix: "childrenJSON".to_string(),
            documents: None,
            capital_letters: GREEK_CAPITALS.to_string(),
            stemmer: "greek".to_string(),
            strategy: MatchStrategy::default(),
            workers: default_workers(),
            map: MapConfig::default(),
            source_path: None,
        }
    }
}

impl Config {
    /// Load configuration, discovering a `geomention` config file in the
    /// standard locations. Falls back to defaults when none is found.
    pub async fn load() -> Result<Self, ConfigError> {
        match prefer::load("geomention").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await,
                None => Ok(Self::default()),
            },
            Err(_) => {
                tracing::debug!("No geomention config file discovered, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file path.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_error("TOML", e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_error("YAML", e.to_string()))
            }
            _ => serde_json::from_str(contents).map_err(|e| parse_error("JSON", e.to_string())),
        }
    }

    /// Directory of the config file, if one was loaded.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// `~` is expanded; absolute paths are returned as-is.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    pub fn stemmer(&self) -> Result<Arc<dyn Stemmer>, ConfigError> {
        stemmer_from_name(&self.stemmer)
            .map(Arc::from)
            .ok_or_else(|| ConfigError::UnknownStemmer(self.stemmer.clone()))
    }

    pub fn alphabet(&self) -> Result<CapitalAlphabet, ConfigError> {
        let alphabet = CapitalAlphabet::new(&self.capital_letters);
        if alphabet.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        Ok(alphabet)
    }

    /// Build the matching context for `records` from the configured
    /// stemmer, alphabet and strategy.
    pub fn match_context(&self, records: Vec<LocationRecord>) -> Result<MatchContext, BuildError> {
        let context =
            MatchContext::build(records, self.stemmer()?, self.alphabet()?, self.strategy)?;
        tracing::debug!(
            stemmer = %self.stemmer,
            strategy = self.strategy.as_str(),
            "Built match context"
        );
        Ok(context)
    }
}

/// Failure to assemble a `MatchContext` from configuration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gazetteer(#[from] GazetteerError),
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub gazetteer_dir: PathBuf,
    pub gazetteer_prefix: String,
    pub documents: Option<PathBuf>,
    pub map_output: PathBuf,
    pub workers: usize,
}

/// Command-line overrides for settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub gazetteer: Option<PathBuf>,
    pub documents: Option<PathBuf>,
    pub strategy: Option<MatchStrategy>,
}

fn env_override(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Load settings with explicit options.
///
/// Precedence, lowest first: defaults, config file, environment, command line.
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> Result<(Settings, Config), ConfigError> {
    let mut config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await?,
    };

    if let Some(strategy) = options.strategy {
        config.strategy = strategy;
    }

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings {
        gazetteer_dir: config.resolve_path(&config.gazetteer_dir, &base_dir),
        gazetteer_prefix: config.gazetteer_prefix.clone(),
        documents: config
            .documents
            .as_deref()
            .map(|d| config.resolve_path(d, &base_dir)),
        map_output: config.resolve_path(&config.map.output, &base_dir),
        workers: config.workers.max(1),
    };

    if let Some(dir) = env_override(GAZETTEER_DIR_ENV) {
        tracing::debug!("Using {} from environment: {}", GAZETTEER_DIR_ENV, dir);
        settings.gazetteer_dir = PathBuf::from(shellexpand::tilde(&dir).as_ref());
    }
    if let Some(documents) = env_override(DOCUMENTS_ENV) {
        tracing::debug!("Using {} from environment: {}", DOCUMENTS_ENV, documents);
        settings.documents = Some(PathBuf::from(shellexpand::tilde(&documents).as_ref()));
    }

    if let Some(gazetteer) = options.gazetteer {
        settings.gazetteer_dir = gazetteer;
    }
    if let Some(documents) = options.documents {
        settings.documents = Some(documents);
    }

    Ok((settings, config))
}
