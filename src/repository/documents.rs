//! Question collection backed by a JSON export.
//!
//! Accepts either a JSON array of question objects or JSON lines (one object
//! per line, as written by `mongoexport`). Each object needs an `_id` (string,
//! number, or `{"$oid": "..."}`) and a `text`. Every other field is kept so
//! that queries can filter on it.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Document, DocumentId};

/// Errors from the document store.
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error("Failed to read documents {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed documents file {path} (line {line}): {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid document #{position} in {path}: {reason}")]
    InvalidDocument {
        path: PathBuf,
        position: usize,
        reason: String,
    },

    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),
}

/// Anything that can return the documents matching a query.
pub trait DocumentSource {
    fn find(&self, query: &DocumentQuery) -> Result<Vec<Document>, DocumentStoreError>;
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Equals(Value),
    In(Vec<Value>),
}

impl Condition {
    /// Array fields match when the whole array or any element does.
    fn holds(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Condition::Equals(expected), Some(actual)) => {
                expected == actual || elements(actual).any(|e| e == expected)
            }
            (Condition::Equals(expected), None) => expected.is_null(),
            (Condition::In(options), Some(actual)) => options
                .iter()
                .any(|o| o == actual || elements(actual).any(|e| e == o)),
            (Condition::In(options), None) => options.iter().any(Value::is_null),
        }
    }
}

fn elements(value: &Value) -> impl Iterator<Item = &Value> {
    value.as_array().into_iter().flatten()
}

/// `{"$oid": "..."}` compares as its hex string, matching how stored ids
/// are normalized.
fn unwrap_oid(value: &Value) -> Value {
    match value.as_object().and_then(|o| oid_string(o)) {
        Some(oid) => Value::String(oid.to_string()),
        None => value.clone(),
    }
}

fn oid_string(object: &Map<String, Value>) -> Option<&str> {
    if object.len() == 1 {
        object.get("$oid").and_then(Value::as_str)
    } else {
        None
    }
}

/// Mongo-style equality filter over question fields.
///
/// `{}` matches everything. `{"field": value}` requires equality, with dotted
/// paths descending into nested objects. `{"field": {"$eq": v}}` and
/// `{"field": {"$in": [..]}}` are understood; other operators are rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    source: String,
    conditions: Vec<(String, Condition)>,
}

impl DocumentQuery {
    /// The query matching every document.
    pub fn all() -> Self {
        Self {
            source: "{}".to_string(),
            conditions: Vec::new(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, DocumentStoreError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| DocumentStoreError::UnsupportedQuery(format!("{}: {}", text, e)))?;
        let mut query = Self::from_value(&value)?;
        query.source = text.trim().to_string();
        Ok(query)
    }

    pub fn from_value(value: &Value) -> Result<Self, DocumentStoreError> {
        let object = value.as_object().ok_or_else(|| {
            DocumentStoreError::UnsupportedQuery(format!("expected an object, got {}", value))
        })?;

        let mut conditions = Vec::with_capacity(object.len());
        for (field, spec) in object {
            if field.starts_with('$') {
                return Err(DocumentStoreError::UnsupportedQuery(format!(
                    "top-level operator {}",
                    field
                )));
            }
            conditions.push((field.clone(), parse_condition(field, spec)?));
        }

        Ok(Self {
            source: value.to_string(),
            conditions,
        })
    }

    pub fn is_all(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether a question's raw fields satisfy every condition.
    pub fn matches(&self, fields: &Map<String, Value>) -> bool {
        self.conditions
            .iter()
            .all(|(path, condition)| condition.holds(lookup_path(fields, path)))
    }
}

impl Default for DocumentQuery {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for DocumentQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_condition(field: &str, spec: &Value) -> Result<Condition, DocumentStoreError> {
    let Some(object) = spec.as_object() else {
        return Ok(Condition::Equals(spec.clone()));
    };
    if oid_string(object).is_some() {
        return Ok(Condition::Equals(unwrap_oid(spec)));
    }
    if !object.keys().any(|k| k.starts_with('$')) {
        return Ok(Condition::Equals(spec.clone()));
    }
    let mut operators = object.iter();
    let (operator, operand) = match (operators.next(), operators.next()) {
        (Some(only), None) => only,
        _ => {
            return Err(DocumentStoreError::UnsupportedQuery(format!(
                "{}: only one operator per field is supported",
                field
            )))
        }
    };
    match operator.as_str() {
        "$eq" => Ok(Condition::Equals(unwrap_oid(operand))),
        "$in" => match operand.as_array() {
            Some(options) => Ok(Condition::In(options.iter().map(unwrap_oid).collect())),
            None => Err(DocumentStoreError::UnsupportedQuery(format!(
                "{}: $in expects an array",
                field
            ))),
        },
        other => Err(DocumentStoreError::UnsupportedQuery(format!(
            "{}: operator {} is not supported",
            field, other
        ))),
    }
}

fn lookup_path<'a>(fields: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if let Some(value) = fields.get(path) {
        return Some(value);
    }
    let mut parts = path.split('.');
    let mut current = fields.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

#[derive(Debug, Clone)]
struct StoredDocument {
    document: Document,
    fields: Map<String, Value>,
}

/// In-memory question collection loaded from a JSON or JSON-lines file.
#[derive(Debug, Clone)]
pub struct JsonDocumentStore {
    path: PathBuf,
    entries: Vec<StoredDocument>,
}

impl JsonDocumentStore {
    pub fn open(path: &Path) -> Result<Self, DocumentStoreError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DocumentStoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json(&contents, path)?;
        tracing::debug!("Loaded {} documents from {}", store.len(), path.display());
        Ok(store)
    }

    /// Parse a JSON array or JSON lines. `origin` is only used in errors.
    pub fn from_json(contents: &str, origin: &Path) -> Result<Self, DocumentStoreError> {
        let values: Vec<Value> = if contents.trim_start().starts_with('[') {
            serde_json::from_str(contents).map_err(|source| DocumentStoreError::Parse {
                path: origin.to_path_buf(),
                line: source.line(),
                source,
            })?
        } else {
            let mut values = Vec::new();
            for (number, line) in contents.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let value = serde_json::from_str(line).map_err(|source| {
                    DocumentStoreError::Parse {
                        path: origin.to_path_buf(),
                        line: number + 1,
                        source,
                    }
                })?;
                values.push(value);
            }
            values
        };
        Self::from_values(values, origin)
    }

    pub fn from_values(values: Vec<Value>, origin: &Path) -> Result<Self, DocumentStoreError> {
        let entries = values
            .into_iter()
            .enumerate()
            .map(|(position, value)| {
                let invalid = |reason: &str| DocumentStoreError::InvalidDocument {
                    path: origin.to_path_buf(),
                    position,
                    reason: reason.to_string(),
                };
                let Value::Object(mut fields) = value else {
                    return Err(invalid("not an object"));
                };
                let id = fields
                    .get("_id")
                    .and_then(document_id)
                    .ok_or_else(|| invalid("missing or unusable _id"))?;
                if let Some(raw) = fields.get_mut("_id") {
                    *raw = unwrap_oid(raw);
                }
                let text = match fields.get("text") {
                    Some(Value::String(text)) => text.clone(),
                    Some(Value::Null) | None => String::new(),
                    Some(_) => return Err(invalid("text is not a string")),
                };
                Ok(StoredDocument {
                    document: Document::new(id, text),
                    fields,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            path: origin.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DocumentSource for JsonDocumentStore {
    fn find(&self, query: &DocumentQuery) -> Result<Vec<Document>, DocumentStoreError> {
        let found: Vec<Document> = self
            .entries
            .iter()
            .filter(|entry| query.matches(&entry.fields))
            .map(|entry| entry.document.clone())
            .collect();
        tracing::debug!("Query {} matched {} of {} documents", query, found.len(), self.len());
        Ok(found)
    }
}

fn document_id(value: &Value) -> Option<DocumentId> {
    match value {
        Value::String(s) => Some(DocumentId::Text(s.clone())),
        Value::Number(n) => Some(match n.as_i64() {
            Some(i) => DocumentId::Number(i),
            None => DocumentId::Text(n.to_string()),
        }),
        Value::Object(o) => oid_string(o).map(DocumentId::from),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn store() -> JsonDocumentStore {
        JsonDocumentStore::from_values(
            vec![
                json!({"_id": "q1", "text": "Η Λευκωσία", "mp": {"party": "A"}, "year": 2016}),
                json!({"_id": {"$oid": "5a1b"}, "text": "Η Πάφος", "mp": {"party": "B"}, "year": 2017}),
                json!({"_id": 3, "text": null, "year": 2017}),
            ],
            Path::new("memory"),
        )
        .unwrap()
    }

    fn ids(documents: &[Document]) -> Vec<String> {
        documents.iter().map(|d| d.id.to_string()).collect()
    }

    #[test]
    fn test_find_all() {
        let found = store().find(&DocumentQuery::all()).unwrap();
        assert_eq!(ids(&found), vec!["q1", "5a1b", "3"]);
        assert_eq!(found[2].text, "");
    }

    #[test]
    fn test_equality_query() {
        let query = DocumentQuery::parse(r#"{"year": 2017}"#).unwrap();
        let found = store().find(&query).unwrap();
        assert_eq!(ids(&found), vec!["5a1b", "3"]);
    }

    #[test]
    fn test_dotted_path_query() {
        let query = DocumentQuery::parse(r#"{"mp.party": "A"}"#).unwrap();
        let found = store().find(&query).unwrap();
        assert_eq!(ids(&found), vec!["q1"]);
    }

    #[test]
    fn test_in_query() {
        let query = DocumentQuery::parse(r#"{"mp.party": {"$in": ["A", "B"]}}"#).unwrap();
        let found = store().find(&query).unwrap();
        assert_eq!(ids(&found), vec!["q1", "5a1b"]);
    }

    #[test]
    fn test_equality_matches_array_element() {
        let store = JsonDocumentStore::from_values(
            vec![
                json!({"_id": "q1", "text": "", "by": ["mp-a", "mp-b"]}),
                json!({"_id": "q2", "text": "", "by": ["mp-c"]}),
                json!({"_id": "q3", "text": "", "by": "mp-a"}),
            ],
            Path::new("memory"),
        )
        .unwrap();

        let query = DocumentQuery::parse(r#"{"by": "mp-a"}"#).unwrap();
        assert_eq!(ids(&store.find(&query).unwrap()), vec!["q1", "q3"]);

        let query = DocumentQuery::parse(r#"{"by": {"$in": ["mp-b", "mp-c"]}}"#).unwrap();
        assert_eq!(ids(&store.find(&query).unwrap()), vec!["q1", "q2"]);

        let query = DocumentQuery::parse(r#"{"by": ["mp-c"]}"#).unwrap();
        assert_eq!(ids(&store.find(&query).unwrap()), vec!["q2"]);
    }

    #[test]
    fn test_object_id_queries() {
        let query = DocumentQuery::parse(r#"{"_id": "5a1b"}"#).unwrap();
        assert_eq!(ids(&store().find(&query).unwrap()), vec!["5a1b"]);

        let query = DocumentQuery::parse(r#"{"_id": {"$oid": "5a1b"}}"#).unwrap();
        assert_eq!(ids(&store().find(&query).unwrap()), vec!["5a1b"]);

        let query = DocumentQuery::parse(r#"{"_id": {"$in": [{"$oid": "5a1b"}, 3]}}"#).unwrap();
        assert_eq!(ids(&store().find(&query).unwrap()), vec!["5a1b", "3"]);
    }

    #[test]
    fn test_numeric_id_stays_numeric() {
        let found = store().find(&DocumentQuery::all()).unwrap();
        assert_eq!(found[2].id, DocumentId::Number(3));
        assert_eq!(found[1].id, DocumentId::from("5a1b"));
    }

    #[test]
    fn test_unsupported_operator() {
        let err = DocumentQuery::parse(r#"{"year": {"$gt": 2016}}"#).unwrap_err();
        assert!(matches!(err, DocumentStoreError::UnsupportedQuery(_)));
        assert!(DocumentQuery::parse("[1]").is_err());
        assert!(DocumentQuery::parse("{").is_err());
    }

    #[test]
    fn test_query_display_keeps_source() {
        let query = DocumentQuery::parse(r#"{"year": 2017}"#).unwrap();
        assert_eq!(query.to_string(), r#"{"year": 2017}"#);
        assert_eq!(DocumentQuery::all().to_string(), "{}");
        assert!(DocumentQuery::parse("{}").unwrap().is_all());
    }

    #[test]
    fn test_json_lines() {
        let contents = "{\"_id\": \"a\", \"text\": \"x\"}\n\n{\"_id\": \"b\", \"text\": \"y\"}\n";
        let store = JsonDocumentStore::from_json(contents, Path::new("q.jsonl")).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_json_lines_error_reports_line() {
        let contents = "{\"_id\": \"a\", \"text\": \"x\"}\nnot json\n";
        let err = JsonDocumentStore::from_json(contents, Path::new("q.jsonl")).unwrap_err();
        match err {
            DocumentStoreError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_id_is_invalid() {
        let err = JsonDocumentStore::from_values(vec![json!({"text": "x"})], Path::new("m"))
            .unwrap_err();
        assert!(matches!(err, DocumentStoreError::InvalidDocument { .. }));
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(&path, r#"[{"_id": "q1", "text": "Λάρνακα"}]"#).unwrap();

        let store = JsonDocumentStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.path(), path.as_path());
    }
}
