//! Mentions and their per-location aggregation.

use serde::{Deserialize, Serialize};

use super::{DocumentId, LocationId};

/// "This document mentions this location."
///
/// Field order matters: the derived `Ord` sorts by location, then document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Mention {
    pub location_id: LocationId,
    pub document_id: DocumentId,
}

impl Mention {
    pub fn new(location_id: LocationId, document_id: impl Into<DocumentId>) -> Self {
        Self {
            location_id,
            document_id: document_id.into(),
        }
    }
}

/// All documents mentioning one location, sorted and duplicate-free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationMatches {
    pub location_id: LocationId,
    pub document_ids: Vec<DocumentId>,
}

impl LocationMatches {
    pub fn count(&self) -> usize {
        self.document_ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_ordering() {
        let mut mentions = vec![
            Mention::new(2, "a"),
            Mention::new(1, "b"),
            Mention::new(1, "a"),
        ];
        mentions.sort();
        assert_eq!(
            mentions,
            vec![
                Mention::new(1, "a"),
                Mention::new(1, "b"),
                Mention::new(2, "a")
            ]
        );
    }

    #[test]
    fn test_location_matches_serialized_field_names() {
        let matches = LocationMatches {
            location_id: 146268,
            document_ids: vec![DocumentId::from("q1")],
        };
        let json = serde_json::to_value(&matches).unwrap();
        assert_eq!(json["locationId"], 146268);
        assert_eq!(json["documentIds"][0], "q1");
    }
}
