mod cluster;
mod error;
mod export;
mod model;
mod normalize;
mod raw;

pub use cluster::{ClusterMap, ClusterState};
pub use error::DatasetError;
pub use export::{HighlightExport, export_highlighted};
pub use model::{Edge, Node};
pub use normalize::{DiscardedEdge, normalize};
pub use raw::{
    DatasetKind, DatasetPayload, LoadedDataset, RawEntity, RawRelationship, read_dataset_file,
};

#[cfg(test)]
pub(crate) use cluster::compute_clusters;
#[cfg(test)]
pub(crate) use model::{Endpoint, fixtures};
#[cfg(test)]
pub(crate) use raw::{parse_entities, parse_relationships};
