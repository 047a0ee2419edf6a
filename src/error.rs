use std::path::PathBuf;

use thiserror::Error;

use crate::scene::{MappingMode, ReferenceMode};

/// Everything that can abort a bake. There is no partial success: the first
/// error stops the export and nothing after it is written.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("skin cluster references joint '{joint}' which is not part of the skeleton")]
    SkeletonIntegrity { joint: String },

    #[error("unsupported {attribute} layout: mapping {mapping:?}, reference {reference:?}")]
    UnsupportedAttributeLayout {
        attribute: &'static str,
        mapping: MappingMode,
        reference: ReferenceMode,
    },

    #[error("invalid UV layer {layer} (mesh has {available} UV layers)")]
    InvalidUvLayer { layer: usize, available: usize },

    #[error("mesh on node '{node}' has no normal layer")]
    MissingNormal { node: String },

    #[error("{attribute} index {index} is out of range (len {len})")]
    AttributeIndexOutOfRange {
        attribute: &'static str,
        index: usize,
        len: usize,
    },

    #[error("cluster for joint '{joint}' has {indices} control point indices but {weights} weights")]
    ClusterWeightMismatch {
        joint: String,
        indices: usize,
        weights: usize,
    },

    #[error("unsupported material mapping {0:?}")]
    UnsupportedMaterialMapping(MappingMode),

    #[error("layered texture on channel '{channel}' of material '{material}' is unsupported")]
    UnsupportedTextureLayering { material: String, channel: String },

    #[error("failed to read texture {path:?}: {source}")]
    TextureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed static mesh asset: {0}")]
    MalformedAsset(String),

    #[error("scene references unknown node '{0}'")]
    UnknownNode(String),

    #[error("failed to parse scene description: {0}")]
    SceneParse(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = ExportError> = std::result::Result<T, E>;
