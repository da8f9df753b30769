//! Data models for geomention.

mod document;
mod location;
mod mention;

pub use document::{Document, DocumentId};
pub use location::{LocationId, LocationListing, LocationRecord};
pub use mention::{LocationMatches, Mention};
