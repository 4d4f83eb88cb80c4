use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reference from an edge to one of its endpoints.
///
/// Edges leave the normalizer holding plain ids; the engine resolves them to
/// node indices when it takes ownership of the graph data.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Id(String),
    Resolved { index: usize, id: String },
}

impl Endpoint {
    pub fn id(&self) -> &str {
        endpoint_id(self)
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Id(_) => None,
            Self::Resolved { index, .. } => Some(*index),
        }
    }

    pub fn resolved(self, index: usize) -> Self {
        match self {
            Self::Id(id) | Self::Resolved { id, .. } => Self::Resolved { index, id },
        }
    }
}

/// The one place edge endpoints are turned back into raw node ids.
pub fn endpoint_id(endpoint: &Endpoint) -> &str {
    match endpoint {
        Endpoint::Id(id) => id,
        Endpoint::Resolved { id, .. } => id,
    }
}

impl From<&str> for Endpoint {
    fn from(id: &str) -> Self {
        Self::Id(id.to_owned())
    }
}

impl Serialize for Endpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for Endpoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::Id)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub attributes: Option<Map<String, Value>>,
    pub entity_type: String,
    #[serde(default)]
    pub topic_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(rename = "clusterId", default)]
    pub cluster_id: usize,
}

impl Node {
    /// Relative drawn size: twice the attribute count, never below one.
    pub fn value(&self) -> f32 {
        let count = self.attributes.as_ref().map_or(1, Map::len);
        ((count * 2) as f32).max(1.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub meta: Option<Value>,
    pub weight: f64,
    pub source: Endpoint,
    pub target: Endpoint,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub last_modified_at: Option<String>,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub chunk_id: Option<String>,
}

impl Edge {
    pub fn source_id(&self) -> &str {
        endpoint_id(&self.source)
    }

    pub fn target_id(&self) -> &str {
        endpoint_id(&self.target)
    }

    /// The endpoint across the edge from `node_id`, if it is one of the two.
    pub fn opposite(&self, node_id: &str) -> Option<&str> {
        if self.source_id() == node_id {
            Some(self.target_id())
        } else if self.target_id() == node_id {
            Some(self.source_id())
        } else {
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn node(id: &str) -> Node {
        Node {
            id: id.to_owned(),
            name: id.to_owned(),
            attributes: None,
            entity_type: "Unknown".to_owned(),
            topic_name: None,
            created_at: None,
            updated_at: None,
            cluster_id: 0,
        }
    }

    pub(crate) fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge {
            id: id.to_owned(),
            description: None,
            meta: None,
            weight: 1.0,
            source: Endpoint::from(source),
            target: Endpoint::from(target),
            created_at: None,
            updated_at: None,
            last_modified_at: None,
            document_id: None,
            chunk_id: None,
        }
    }
}
