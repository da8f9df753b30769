//! Gazetteer location records.

use serde::{Deserialize, Serialize};

use crate::services::normalize::decompose;

/// External gazetteer identifier (GeoNames `geonameId`).
pub type LocationId = u64;

/// A settlement loaded from the gazetteer.
///
/// Immutable once constructed. `canonical_name` is the decomposed (NFD) form
/// of `name`: diacritics and case are preserved so it can be searched for
/// verbatim inside decomposed document text.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    pub id: LocationId,
    /// Display name as it appears in the gazetteer.
    pub name: String,
    pub canonical_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationRecord {
    pub fn new(id: LocationId, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        let name = name.into();
        Self {
            id,
            canonical_name: decompose(&name),
            name,
            latitude,
            longitude,
        }
    }

    /// Serializable listing entry for this record.
    pub fn listing(&self) -> LocationListing {
        LocationListing {
            id: self.id,
            name: self.name.clone(),
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

/// Location as printed by `print locations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationListing {
    pub id: LocationId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name_is_decomposed() {
        let record = LocationRecord::new(146268, "Λευκωσία", 35.17, 33.36);
        assert_eq!(record.name, "Λευκωσία");
        // ί decomposes into ι + combining acute
        assert_eq!(record.canonical_name.chars().count(), 9);
        assert!(record.canonical_name.contains('\u{301}'));
    }

    #[test]
    fn test_listing_keeps_display_name() {
        let record = LocationRecord::new(7, "Πάφος", 34.77, 32.42);
        let listing = record.listing();
        assert_eq!(listing.id, 7);
        assert_eq!(listing.name, "Πάφος");

        let json = serde_json::to_string(&listing).unwrap();
        assert!(json.contains("Πάφος"));
        let back: LocationListing = serde_json::from_str(&json).unwrap();
        assert_eq!(back, listing);
    }
}
