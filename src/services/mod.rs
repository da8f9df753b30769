//! Matching services: normalization through aggregation.

pub mod aggregate;
pub mod extractor;
pub mod gazetteer;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod stemmer;

pub use aggregate::aggregate;
pub use extractor::{CapitalAlphabet, MentionExtractor};
pub use gazetteer::{GazetteerError, GazetteerIndex};
pub use matcher::{MatchStrategy, Matcher};
pub use pipeline::MatchContext;
pub use stemmer::{IdentityStemmer, SnowballStemmer, Stemmer};
