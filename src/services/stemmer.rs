//! Token stemming.
//!
//! Provides a `Stemmer` trait for pluggable stemming backends and the
//! built-in `SnowballStemmer` (Greek by default). Matching only relies on the
//! stemmer being deterministic and applied identically to gazetteer names
//! and document phrases.

use rust_stemmers::Algorithm;

/// Trait for pluggable stemming backends.
pub trait Stemmer: Send + Sync {
    /// Backend identifier (e.g. "snowball:greek", "none").
    fn stemmer_id(&self) -> &str;

    /// Reduce a single normalized token to its stem.
    fn stem(&self, token: &str) -> String;
}

/// Snowball stemmer from `rust-stemmers`.
pub struct SnowballStemmer {
    id: String,
    inner: rust_stemmers::Stemmer,
}

impl SnowballStemmer {
    pub fn greek() -> Self {
        Self::with_algorithm("greek", Algorithm::Greek)
    }

    /// Look up a Snowball algorithm by language name.
    pub fn for_language(language: &str) -> Option<Self> {
        let language = language.trim().to_lowercase();
        let algorithm = match language.as_str() {
            "greek" | "el" => Algorithm::Greek,
            "english" | "en" => Algorithm::English,
            "french" | "fr" => Algorithm::French,
            "german" | "de" => Algorithm::German,
            "italian" | "it" => Algorithm::Italian,
            "portuguese" | "pt" => Algorithm::Portuguese,
            "russian" | "ru" => Algorithm::Russian,
            "spanish" | "es" => Algorithm::Spanish,
            _ => return None,
        };
        Some(Self::with_algorithm(&language, algorithm))
    }

    fn with_algorithm(language: &str, algorithm: Algorithm) -> Self {
        Self {
            id: format!("snowball:{}", language),
            inner: rust_stemmers::Stemmer::create(algorithm),
        }
    }
}

impl Default for SnowballStemmer {
    fn default() -> Self {
        Self::greek()
    }
}

impl Stemmer for SnowballStemmer {
    fn stemmer_id(&self) -> &str {
        &self.id
    }

    fn stem(&self, token: &str) -> String {
        self.inner.stem(token).into_owned()
    }
}

/// Leaves tokens untouched; used when stemming is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityStemmer;

impl Stemmer for IdentityStemmer {
    fn stemmer_id(&self) -> &str {
        "none"
    }

    fn stem(&self, token: &str) -> String {
        token.to_string()
    }
}

/// Build a stemmer from its configured name. `"none"` disables stemming.
pub fn stemmer_from_name(name: &str) -> Option<Box<dyn Stemmer>> {
    match name.trim() {
        "none" | "" => Some(Box::new(IdentityStemmer)),
        other => SnowballStemmer::for_language(other).map(|s| Box::new(s) as Box<dyn Stemmer>),
    }
}

/// Space-joined stems of the whitespace tokens of an already normalized
/// string. Empty stems are dropped; an empty result means "no key".
pub fn stem_key(stemmer: &dyn Stemmer, normalized: &str) -> String {
    normalized
        .split_whitespace()
        .map(|token| stemmer.stem(token))
        .filter(|stem| !stem.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
