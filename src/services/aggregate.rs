//! Groups mentions by location.

use crate::models::{LocationMatches, Mention};

/// Group mentions by location id.
///
/// Pairs are sorted (location, then document) and deduplicated before
/// grouping, so groups come out in ascending location order with sorted,
/// duplicate-free document lists. Locations without mentions do not appear.
pub fn aggregate(pairs: impl IntoIterator<Item = Mention>) -> Vec<LocationMatches> {
    let mut pairs: Vec<Mention> = pairs.into_iter().collect();
    pairs.sort();
    pairs.dedup();

    let mut groups: Vec<LocationMatches> = Vec::new();
    for mention in pairs {
        match groups.last_mut() {
            Some(group) if group.location_id == mention.location_id => {
                group.document_ids.push(mention.document_id);
            }
            _ => groups.push(LocationMatches {
                location_id: mention.location_id,
                document_ids: vec![mention.document_id],
            }),
        }
    }
    groups
}

/// Largest document count over all groups (0 when there are none).
pub fn max_document_count(groups: &[LocationMatches]) -> usize {
    groups.iter().map(LocationMatches::count).max().unwrap_or(0)
}
