//! GeoNames gazetteer loader.
//!
//! Reads GeoNames `children` JSON exports (`{"geonames": [...]}`), one file
//! per administrative area. GeoNames serializes `lat`/`lng` as strings, so
//! both strings and numbers are accepted. Any malformed file aborts loading.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::models::{LocationId, LocationRecord};
use crate::services::gazetteer::GazetteerError;

#[derive(Debug, Deserialize)]
struct GeoNamesFile {
    geonames: Vec<GeoNameEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoNameEntry {
    geoname_id: LocationId,
    name: String,
    lat: Coordinate,
    lng: Coordinate,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn value(&self) -> Option<f64> {
        match self {
            Coordinate::Number(v) => Some(*v),
            Coordinate::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Parse one GeoNames JSON document. `origin` is only used in errors.
pub fn parse_geonames(json: &str, origin: &Path) -> Result<Vec<LocationRecord>, GazetteerError> {
    let file: GeoNamesFile = serde_json::from_str(json).map_err(|source| GazetteerError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    file.geonames
        .into_iter()
        .enumerate()
        .map(|(position, entry)| {
            let invalid = |reason: String| GazetteerError::InvalidRecord {
                path: origin.to_path_buf(),
                position,
                reason,
            };
            let lat = entry
                .lat
                .value()
                .ok_or_else(|| invalid(format!("bad latitude for {}", entry.geoname_id)))?;
            let lng = entry
                .lng
                .value()
                .ok_or_else(|| invalid(format!("bad longitude for {}", entry.geoname_id)))?;
            Ok(LocationRecord::new(entry.geoname_id, entry.name, lat, lng))
        })
        .collect()
}

/// Load a single GeoNames JSON file.
pub fn load_gazetteer_file(path: &Path) -> Result<Vec<LocationRecord>, GazetteerError> {
    let contents = std::fs::read_to_string(path).map_err(|source| GazetteerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_geonames(&contents, path)?;
    tracing::debug!("Loaded {} locations from {}", records.len(), path.display());
    Ok(records)
}

/// Load every file in `dir` whose name starts with `prefix`.
///
/// Files are read in file-name order so the record order, and with it the
/// index, is reproducible.
pub fn load_gazetteer_dir(dir: &Path, prefix: &str) -> Result<Vec<LocationRecord>, GazetteerError> {
    let entries = std::fs::read_dir(dir).map_err(|source| GazetteerError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| GazetteerError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let matches_prefix = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(prefix));
        if matches_prefix && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(GazetteerError::NoFiles {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
        });
    }

    let mut records = Vec::new();
    for file in &files {
        records.extend(load_gazetteer_file(file)?);
    }

    tracing::info!(
        "Loaded {} locations from {} gazetteer files in {}",
        records.len(),
        files.len(),
        dir.display()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "totalResultsCount": 2,
        "geonames": [
            {"geonameId": 146268, "name": "Λευκωσία", "lat": "35.17531", "lng": "33.3642", "fcode": "PPLC"},
            {"geonameId": 146384, "name": "Λεμεσός", "lat": 34.68406, "lng": 33.03794}
        ]
    }"#;

    #[test]
    fn test_parse_string_and_number_coordinates() {
        let records = parse_geonames(SAMPLE, Path::new("sample.json")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 146268);
        assert_eq!(records[0].name, "Λευκωσία");
        assert!((records[0].latitude - 35.17531).abs() < 1e-9);
        assert!((records[1].longitude - 33.03794).abs() < 1e-9);
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let json = r#"{"geonames": [{"geonameId": 1, "lat": "1", "lng": "2"}]}"#;
        let err = parse_geonames(json, Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, GazetteerError::Parse { .. }));
    }

    #[test]
    fn test_bad_coordinate_is_invalid_record() {
        let json = r#"{"geonames": [{"geonameId": 1, "name": "Χ", "lat": "north", "lng": "2"}]}"#;
        let err = parse_geonames(json, Path::new("bad.json")).unwrap_err();
        match err {
            GazetteerError::InvalidRecord { position, .. } => assert_eq!(position, 0),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_not_json() {
        let err = parse_geonames("geonames", Path::new("x")).unwrap_err();
        assert!(matches!(err, GazetteerError::Parse { .. }));
    }

    #[test]
    fn test_load_dir_filters_and_orders_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("childrenJSON_b"),
            r#"{"geonames": [{"geonameId": 2, "name": "Β", "lat": "0", "lng": "0"}]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("childrenJSON_a"),
            r#"{"geonames": [{"geonameId": 1, "name": "Α", "lat": "0", "lng": "0"}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let records = load_gazetteer_dir(dir.path(), "childrenJSON").unwrap();
        let ids: Vec<LocationId> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_load_dir_without_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_gazetteer_dir(dir.path(), "childrenJSON").unwrap_err();
        assert!(matches!(err, GazetteerError::NoFiles { .. }));
    }

    #[test]
    fn test_load_missing_dir() {
        let err = load_gazetteer_dir(Path::new("/nonexistent/gazetteer"), "x").unwrap_err();
        assert!(matches!(err, GazetteerError::Io { .. }));
    }
}
