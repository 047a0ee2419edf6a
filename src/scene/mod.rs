//! Read-only view of an authored scene graph.
//!
//! The bake pipeline never touches a concrete scene format directly. It walks
//! whatever implements [`SceneProvider`]: node hierarchy, per-node mesh data,
//! skin clusters, surface materials and transform evaluation over time.
//! [`SceneDescription`] is the provider shipped with this crate, backed by a
//! JSON dump of the scene.

use glam::DMat4;
use serde::{Deserialize, Serialize};

pub mod description;
mod transform;

pub use description::SceneDescription;
pub use transform::{LocalKey, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    #[default]
    None,
    Mesh,
    Skeleton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMode {
    None,
    ByControlPoint,
    ByPolygonVertex,
    ByPolygon,
    ByEdge,
    AllSame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    Direct,
    IndexToDirect,
    Index,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerElement<T> {
    pub mapping: MappingMode,
    pub reference: ReferenceMode,
    pub direct: Vec<T>,
    #[serde(default)]
    pub index: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialElement {
    pub mapping: MappingMode,
    pub indices: Vec<u32>,
}

/// One joint's binding within a skin.
///
/// `N` is the provider's node handle type. The JSON description stores the
/// link by node name and resolves it to a handle when the scene is loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster<N> {
    pub link: N,
    /// Mesh transform at bind time.
    #[serde(default)]
    pub transform: DMat4,
    /// Joint transform at bind time, joint space to world space.
    #[serde(default)]
    pub transform_link: DMat4,
    pub indices: Vec<u32>,
    pub weights: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skin<N> {
    pub clusters: Vec<Cluster<N>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh<N> {
    pub control_points: Vec<[f64; 3]>,
    pub polygons: Vec<[u32; 3]>,
    #[serde(default)]
    pub normals: Vec<LayerElement<[f64; 3]>>,
    #[serde(default)]
    pub uvs: Vec<LayerElement<[f64; 2]>>,
    #[serde(default)]
    pub material: Option<MaterialElement>,
    #[serde(default)]
    pub skins: Vec<Skin<N>>,
}

impl<N> Mesh<N> {
    pub fn try_map_links<M, E>(
        self,
        mut f: impl FnMut(N) -> Result<M, E>,
    ) -> Result<Mesh<M>, E> {
        let mut skins = Vec::with_capacity(self.skins.len());
        for skin in self.skins {
            let mut clusters = Vec::with_capacity(skin.clusters.len());
            for cluster in skin.clusters {
                clusters.push(Cluster {
                    link: f(cluster.link)?,
                    transform: cluster.transform,
                    transform_link: cluster.transform_link,
                    indices: cluster.indices,
                    weights: cluster.weights,
                });
            }
            skins.push(Skin { clusters });
        }
        Ok(Mesh {
            control_points: self.control_points,
            polygons: self.polygons,
            normals: self.normals,
            uvs: self.uvs,
            material: self.material,
            skins,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceClass {
    #[default]
    Lambert,
    Phong,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextureSource {
    File { path: String },
    Layered { layers: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureBinding {
    pub channel: String,
    pub source: TextureSource,
}

/// Surface material as authored. Phong-only properties are present on every
/// material and ignored for the Lambert class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceMaterial {
    pub name: String,
    pub class: SurfaceClass,
    pub ambient: [f64; 3],
    pub diffuse: [f64; 3],
    pub emissive: [f64; 3],
    pub transparency_factor: f64,
    pub specular: [f64; 3],
    pub specular_factor: f64,
    pub shininess: f64,
    pub reflection: [f64; 3],
    pub reflection_factor: f64,
    pub textures: Vec<TextureBinding>,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            class: SurfaceClass::Lambert,
            ambient: [0.0; 3],
            diffuse: [0.8; 3],
            emissive: [0.0; 3],
            transparency_factor: 0.0,
            specular: [0.2; 3],
            specular_factor: 1.0,
            shininess: 20.0,
            reflection: [0.0; 3],
            reflection_factor: 1.0,
            textures: Vec::new(),
        }
    }
}

/// The single animation clip of a scene. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationTake {
    pub name: String,
    pub start: f64,
    pub stop: f64,
}

pub trait SceneProvider {
    type Node: Copy + Eq + std::fmt::Debug;

    fn root(&self) -> Self::Node;

    fn children(&self, node: Self::Node) -> &[Self::Node];

    fn name(&self, node: Self::Node) -> &str;

    fn attribute_type(&self, node: Self::Node) -> AttributeType;

    fn mesh(&self, node: Self::Node) -> Option<&Mesh<Self::Node>>;

    /// Offset applied to the node's geometry only, not inherited by children.
    fn geometric_transform(&self, node: Self::Node) -> DMat4;

    fn materials(&self, node: Self::Node) -> &[SurfaceMaterial];

    /// Node-to-world transform at `time` seconds.
    fn evaluate_global_transform(&self, node: Self::Node, time: f64) -> DMat4;

    fn animation_take(&self) -> Option<&AnimationTake>;
}
