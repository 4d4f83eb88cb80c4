use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::error::{DatasetError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    Entities,
    Relationships,
}

impl DatasetKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Entities => "Entities",
            Self::Relationships => "Relationships",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entities => f.write_str("entities"),
            Self::Relationships => f.write_str("relationships"),
        }
    }
}

/// One record of the entities file, before normalization.
#[derive(Clone, Debug, Deserialize)]
pub struct RawEntity {
    #[serde(deserialize_with = "required_string")]
    pub id: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "opaque_string")]
    pub entity_type: Option<String>,
    #[serde(default, deserialize_with = "opaque_string")]
    pub topic_name: Option<String>,
    #[serde(default, deserialize_with = "opaque_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "opaque_string")]
    pub updated_at: Option<String>,
}

/// One record of the relationships file, before normalization.
#[derive(Clone, Debug, Deserialize)]
pub struct RawRelationship {
    #[serde(default, deserialize_with = "opaque_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opaque_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "opaque_string")]
    pub relationship_desc: Option<String>,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(default, deserialize_with = "lenient_weight")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "opaque_string")]
    pub source_entity_id: Option<String>,
    #[serde(default, deserialize_with = "opaque_string")]
    pub target_entity_id: Option<String>,
    #[serde(default, deserialize_with = "opaque_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "opaque_string")]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "opaque_string")]
    pub last_modified_at: Option<String>,
    #[serde(default, deserialize_with = "opaque_string")]
    pub document_id: Option<String>,
    #[serde(default, deserialize_with = "opaque_string")]
    pub chunk_id: Option<String>,
}

#[derive(Clone, Debug)]
pub enum DatasetPayload {
    Entities(Vec<RawEntity>),
    Relationships(Vec<RawRelationship>),
}

/// A parsed input file, ready to hand to the controller.
#[derive(Clone, Debug)]
pub struct LoadedDataset {
    pub path: PathBuf,
    pub payload: DatasetPayload,
}

impl LoadedDataset {
    pub fn kind(&self) -> DatasetKind {
        match self.payload {
            DatasetPayload::Entities(_) => DatasetKind::Entities,
            DatasetPayload::Relationships(_) => DatasetKind::Relationships,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn record_count(&self) -> usize {
        match &self.payload {
            DatasetPayload::Entities(records) => records.len(),
            DatasetPayload::Relationships(records) => records.len(),
        }
    }
}

pub fn parse_entities(raw: &str) -> Result<Vec<RawEntity>> {
    serde_json::from_str(raw).map_err(|source| DatasetError::Malformed {
        kind: DatasetKind::Entities,
        source,
    })
}

pub fn parse_relationships(raw: &str) -> Result<Vec<RawRelationship>> {
    serde_json::from_str(raw).map_err(|source| DatasetError::Malformed {
        kind: DatasetKind::Relationships,
        source,
    })
}

pub fn read_dataset_file(kind: DatasetKind, path: &Path) -> Result<LoadedDataset> {
    let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let payload = match kind {
        DatasetKind::Entities => DatasetPayload::Entities(parse_entities(&raw)?),
        DatasetKind::Relationships => DatasetPayload::Relationships(parse_relationships(&raw)?),
    };

    Ok(LoadedDataset {
        path: path.to_path_buf(),
        payload,
    })
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

// Ids and timestamps show up as numbers in some exports.
fn opaque_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_string))
}

// Anything that is not a number or a numeric string counts as no weight.
fn lenient_weight<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let weight = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) if text.trim().is_empty() => None,
        Some(Value::String(text)) => match text.trim().parse::<f64>() {
            Ok(weight) => Some(weight),
            Err(_) => {
                warn!(weight = %text, "ignoring non-numeric relationship weight");
                None
            }
        },
        Some(Value::Bool(false)) => None,
        Some(other) => {
            warn!(weight = %other, "ignoring non-numeric relationship weight");
            None
        }
    };
    Ok(weight)
}

fn lenient_object<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(attributes)) => Ok(Some(attributes)),
        Some(other) => {
            warn!(attributes = %other, "ignoring entity attributes that are not an object");
            Ok(None)
        }
    }
}

fn required_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_string(value).ok_or_else(|| de::Error::custom("id must not be null"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_entities() {
        let entities = parse_entities(r#"[{"id": "a"}, {"id": 7, "name": "Seven"}]"#)
            .expect("valid entities");

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].id, "a");
        assert_eq!(entities[0].name, None);
        assert_eq!(entities[1].id, "7");
        assert_eq!(entities[1].name.as_deref(), Some("Seven"));
    }

    #[test]
    fn entity_without_id_is_malformed() {
        let error = parse_entities(r#"[{"name": "nameless"}]"#).unwrap_err();
        assert!(matches!(
            error,
            DatasetError::Malformed {
                kind: DatasetKind::Entities,
                ..
            }
        ));
    }

    #[test]
    fn entity_with_null_id_is_malformed() {
        assert!(parse_entities(r#"[{"id": null}]"#).is_err());
    }

    #[test]
    fn relationships_accept_numeric_references_and_both_descriptions() {
        let relationships = parse_relationships(
            r#"[
                {"id": "r1", "source_entity_id": 1, "target_entity_id": "b", "relationship_desc": "knows", "weight": 0.5},
                {"source_entity_id": "a", "target_entity_id": "b", "document_id": 42, "meta": {"k": 1}}
            ]"#,
        )
        .expect("valid relationships");

        assert_eq!(relationships[0].source_entity_id.as_deref(), Some("1"));
        assert_eq!(relationships[0].relationship_desc.as_deref(), Some("knows"));
        assert_eq!(relationships[0].weight, Some(0.5));
        assert_eq!(relationships[1].id, None);
        assert_eq!(relationships[1].document_id.as_deref(), Some("42"));
        assert!(relationships[1].meta.is_some());
    }

    #[test]
    fn odd_weights_do_not_reject_the_file() {
        let relationships = parse_relationships(
            r#"[
                {"source_entity_id": "a", "target_entity_id": "b", "weight": "2"},
                {"source_entity_id": "a", "target_entity_id": "b", "weight": false},
                {"source_entity_id": "a", "target_entity_id": "b", "weight": ""},
                {"source_entity_id": "a", "target_entity_id": "b", "weight": true},
                {"source_entity_id": "a", "target_entity_id": "b", "weight": "heavy"},
                {"source_entity_id": "a", "target_entity_id": "b", "weight": null}
            ]"#,
        )
        .expect("lenient weights");

        let weights = relationships
            .iter()
            .map(|relationship| relationship.weight)
            .collect::<Vec<_>>();
        assert_eq!(weights, vec![Some(2.0), None, None, None, None, None]);
    }

    #[test]
    fn non_object_attributes_are_dropped() {
        let entities = parse_entities(
            r#"[{"id": "a", "attributes": ["x", "y"]}, {"id": "b", "attributes": {"role": "admin"}}]"#,
        )
        .expect("lenient attributes");

        assert_eq!(entities[0].attributes, None);
        assert!(entities[1].attributes.as_ref().is_some_and(|map| map.contains_key("role")));
    }

    #[test]
    fn non_array_input_is_malformed() {
        let error = parse_relationships(r#"{"id": "r1"}"#).unwrap_err();
        assert!(error.to_string().starts_with("Error parsing relationships file"));
    }

    #[test]
    fn missing_file_reports_path() {
        let path = Path::new("/definitely/not/here/entities.json");
        let error = read_dataset_file(DatasetKind::Entities, path).unwrap_err();
        assert!(matches!(error, DatasetError::Read { .. }));
        assert!(error.to_string().contains("entities.json"));
    }
}
