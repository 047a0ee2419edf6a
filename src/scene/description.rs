//! JSON-backed scene graph.
//!
//! Nodes live in a generational arena; cluster links are written by node name
//! in the file and resolved to arena handles once the whole tree is loaded.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use generational_arena::{Arena, Index};
use glam::DMat4;
use serde::Deserialize;

use crate::error::{ExportError, Result};

use super::transform::sample_keys;
use super::{AnimationTake, AttributeType, LocalKey, Mesh, SceneProvider, SurfaceMaterial, Transform};

#[derive(Deserialize)]
struct SceneFile {
    root: NodeFile,
    #[serde(default)]
    take: Option<AnimationTake>,
}

#[derive(Deserialize)]
struct NodeFile {
    name: String,
    #[serde(default)]
    attribute: AttributeType,
    #[serde(default)]
    transform: Transform,
    #[serde(default)]
    geometric_offset: Transform,
    #[serde(default)]
    animation: Vec<LocalKey>,
    #[serde(default)]
    mesh: Option<Mesh<String>>,
    #[serde(default)]
    materials: Vec<SurfaceMaterial>,
    #[serde(default)]
    children: Vec<NodeFile>,
}

#[derive(Debug)]
pub struct SceneNode {
    pub name: String,
    pub attribute: AttributeType,
    pub parent: Option<Index>,
    pub children: Vec<Index>,
    pub transform: Transform,
    pub geometric_offset: DMat4,
    /// sorted by time
    pub animation: Vec<LocalKey>,
    pub mesh: Option<Mesh<Index>>,
    pub materials: Vec<SurfaceMaterial>,
}

#[derive(Debug)]
pub struct SceneDescription {
    nodes: Arena<SceneNode>,
    root: Index,
    take: Option<AnimationTake>,
}

impl SceneDescription {
    pub fn from_json(json: &str) -> Result<Self> {
        let file: SceneFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let file: SceneFile = serde_json::from_reader(reader)?;
        Self::from_file(file)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    fn from_file(file: SceneFile) -> Result<Self> {
        let mut nodes = Arena::new();
        let mut pending_meshes = vec![];
        let root = insert_node(&mut nodes, file.root, None, &mut pending_meshes);

        // first node with a given name wins, matching a depth-first lookup
        let mut by_name = HashMap::<String, Index>::new();
        collect_names(&nodes, root, &mut by_name);

        for (index, mesh) in pending_meshes {
            let mesh = mesh.try_map_links(|link| {
                by_name
                    .get(&link)
                    .copied()
                    .ok_or(ExportError::UnknownNode(link))
            })?;
            nodes[index].mesh = Some(mesh);
        }

        Ok(Self {
            nodes,
            root,
            take: file.take,
        })
    }

    pub fn find_node(&self, name: &str) -> Option<Index> {
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if node.name == name {
                return Some(index);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn local_transform(&self, index: Index, time: f64) -> DMat4 {
        let node = &self.nodes[index];
        sample_keys(&node.animation, time).unwrap_or_else(|| node.transform.to_mat4())
    }
}

fn insert_node(
    nodes: &mut Arena<SceneNode>,
    file: NodeFile,
    parent: Option<Index>,
    pending_meshes: &mut Vec<(Index, Mesh<String>)>,
) -> Index {
    let mut animation = file.animation;
    animation.sort_by(|a, b| a.time.total_cmp(&b.time));
    let index = nodes.insert(SceneNode {
        name: file.name,
        attribute: file.attribute,
        parent,
        children: vec![],
        transform: file.transform,
        geometric_offset: file.geometric_offset.to_mat4(),
        animation,
        mesh: None,
        materials: file.materials,
    });
    if let Some(mesh) = file.mesh {
        pending_meshes.push((index, mesh));
    }
    let children: Vec<Index> = file
        .children
        .into_iter()
        .map(|child| insert_node(nodes, child, Some(index), pending_meshes))
        .collect();
    nodes[index].children = children;
    index
}

fn collect_names(nodes: &Arena<SceneNode>, index: Index, by_name: &mut HashMap<String, Index>) {
    let node = &nodes[index];
    by_name.entry(node.name.clone()).or_insert(index);
    for &child in &node.children {
        collect_names(nodes, child, by_name);
    }
}

impl SceneProvider for SceneDescription {
    type Node = Index;

    fn root(&self) -> Index {
        self.root
    }

    fn children(&self, node: Index) -> &[Index] {
        &self.nodes[node].children
    }

    fn name(&self, node: Index) -> &str {
        &self.nodes[node].name
    }

    fn attribute_type(&self, node: Index) -> AttributeType {
        self.nodes[node].attribute
    }

    fn mesh(&self, node: Index) -> Option<&Mesh<Index>> {
        self.nodes[node].mesh.as_ref()
    }

    fn geometric_transform(&self, node: Index) -> DMat4 {
        self.nodes[node].geometric_offset
    }

    fn materials(&self, node: Index) -> &[SurfaceMaterial] {
        &self.nodes[node].materials
    }

    fn evaluate_global_transform(&self, node: Index, time: f64) -> DMat4 {
        let mut global = self.local_transform(node, time);
        let mut parent = self.nodes[node].parent;
        while let Some(index) = parent {
            global = self.local_transform(index, time) * global;
            parent = self.nodes[index].parent;
        }
        global
    }

    fn animation_take(&self) -> Option<&AnimationTake> {
        self.take.as_ref()
    }
}
