use std::collections::HashSet;

use tracing::{info, warn};

use super::error::{DatasetError, Result};
use super::model::{Edge, Endpoint, Node};
use super::raw::{DatasetKind, RawEntity, RawRelationship};

const UNKNOWN_ENTITY_TYPE: &str = "Unknown";

/// An edge left out of the active graph because an endpoint is unknown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscardedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_exists: bool,
    pub target_exists: bool,
}

#[derive(Clone, Debug, Default)]
pub struct NormalizedGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub discarded: Vec<DiscardedEdge>,
}

pub fn normalize(
    entities: Option<&[RawEntity]>,
    relationships: Option<&[RawRelationship]>,
) -> Result<NormalizedGraph> {
    let entities = entities.ok_or(DatasetError::MissingInput(DatasetKind::Entities))?;
    let relationships =
        relationships.ok_or(DatasetError::MissingInput(DatasetKind::Relationships))?;

    let mut node_ids = HashSet::with_capacity(entities.len());
    let mut nodes = Vec::with_capacity(entities.len());
    for entity in entities {
        if !node_ids.insert(entity.id.clone()) {
            warn!(id = %entity.id, "duplicate entity id, keeping the first record");
            continue;
        }
        nodes.push(node_from_entity(entity));
    }

    let mut edges = Vec::with_capacity(relationships.len());
    let mut discarded = Vec::new();
    for (position, relationship) in relationships.iter().enumerate() {
        let edge = edge_from_relationship(relationship, position);
        let source_exists = node_ids.contains(edge.source_id());
        let target_exists = node_ids.contains(edge.target_id());

        if source_exists && target_exists {
            edges.push(edge);
            continue;
        }

        warn!(
            id = %edge.id,
            source = %edge.source_id(),
            target = %edge.target_id(),
            source_exists,
            target_exists,
            "invalid link found"
        );
        discarded.push(DiscardedEdge {
            id: edge.id.clone(),
            source: edge.source_id().to_owned(),
            target: edge.target_id().to_owned(),
            source_exists,
            target_exists,
        });
    }

    info!(
        nodes = nodes.len(),
        valid_links = edges.len(),
        invalid_links = discarded.len(),
        "normalized graph data"
    );

    Ok(NormalizedGraph {
        nodes,
        edges,
        discarded,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

fn node_from_entity(entity: &RawEntity) -> Node {
    Node {
        id: entity.id.clone(),
        name: non_empty(&entity.name).unwrap_or(&entity.id).to_owned(),
        attributes: entity.attributes.clone(),
        entity_type: non_empty(&entity.entity_type)
            .unwrap_or(UNKNOWN_ENTITY_TYPE)
            .to_owned(),
        topic_name: entity.topic_name.clone(),
        created_at: entity.created_at.clone(),
        updated_at: entity.updated_at.clone(),
        cluster_id: 0,
    }
}

fn edge_weight(weight: Option<f64>) -> f64 {
    match weight {
        Some(value) if value.is_finite() && value != 0.0 => value,
        _ => 1.0,
    }
}

fn edge_from_relationship(relationship: &RawRelationship, position: usize) -> Edge {
    let source = relationship.source_entity_id.clone().unwrap_or_default();
    let target = relationship.target_entity_id.clone().unwrap_or_default();
    let id = relationship
        .id
        .clone()
        .unwrap_or_else(|| format!("{source}->{target}#{position}"));

    Edge {
        id,
        description: relationship
            .description
            .clone()
            .or_else(|| relationship.relationship_desc.clone()),
        meta: relationship.meta.clone(),
        weight: edge_weight(relationship.weight),
        source: Endpoint::Id(source),
        target: Endpoint::Id(target),
        created_at: relationship.created_at.clone(),
        updated_at: relationship.updated_at.clone(),
        last_modified_at: relationship.last_modified_at.clone(),
        document_id: relationship.document_id.clone(),
        chunk_id: relationship.chunk_id.clone(),
    }
}
