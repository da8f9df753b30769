//! File-backed sources for the gazetteer and the question collection.

pub mod documents;
pub mod gazetteer;

pub use documents::{DocumentQuery, DocumentSource, DocumentStoreError, JsonDocumentStore};
pub use gazetteer::{load_gazetteer_dir, load_gazetteer_file, parse_geonames};
