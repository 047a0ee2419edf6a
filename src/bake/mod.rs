//! Scene to renderer-ready mesh pipeline.
//!
//! [`bake_scene`] runs, in order: skeleton extraction, then per mesh node
//! control point reading, skin resolution, vertex assembly and material
//! resolution, and finally duplicate vertex elimination over the whole
//! export. Every mesh of a scene lands in one vertex/index buffer sharing one
//! material and texture table.

use std::path::PathBuf;
use std::time::Instant;

use crate::error::Result;
use crate::scene::{AttributeType, SceneProvider};

pub mod control_points;
pub mod materials;
pub mod optimize;
pub mod skeleton;
pub mod skinning;
pub mod vertices;

pub use control_points::{BlendPair, ControlPoint, MAX_INFLUENCES};
pub use materials::{Material, Shading, Texture, TextureChannel};
pub use skeleton::{Joint, Keyframe, Skeleton};
pub use skinning::{AnimationInfo, FRAMES_PER_SECOND};
pub use vertices::{Triangle, Vertex};

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Relative texture paths are resolved against this directory when
    /// texture payloads are embedded. Defaults to the working directory.
    pub texture_root: Option<PathBuf>,
}

impl ExportOptions {
    pub fn resolve_texture_path(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        match &self.texture_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }
}

/// Working state of one export. Built up mesh by mesh, then consumed by
/// [`ExportContext::finish`].
#[derive(Debug)]
pub struct ExportContext<N> {
    pub skeleton: Skeleton<N>,
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub animation: Option<AnimationInfo>,
}

impl<N: Copy> ExportContext<N> {
    pub fn new(skeleton: Skeleton<N>) -> Self {
        Self {
            skeleton,
            vertices: vec![],
            triangles: vec![],
            materials: vec![],
            textures: vec![],
            animation: None,
        }
    }

    pub fn add_mesh<P>(&mut self, scene: &P, node: N) -> Result<()>
    where
        P: SceneProvider<Node = N>,
    {
        let Some(mesh) = scene.mesh(node) else {
            return Ok(());
        };
        let name = scene.name(node);
        let mut points = control_points::read_control_points(mesh);

        if !self.skeleton.is_empty() {
            let info = skinning::resolve_skinning(scene, node, mesh, &mut self.skeleton, &mut points)?;
            if self.animation.is_none() {
                self.animation = info;
            }
        }

        let surfaces = scene.materials(node);
        let assembled = vertices::assemble_mesh(
            mesh,
            name,
            &points,
            self.vertices.len() as u32,
            self.materials.len() as u32,
            surfaces.len(),
        )?;

        let mut materials = materials::resolve_materials(surfaces)?;
        materials::assign_texture_indices(&mut materials, &mut self.textures);

        log::debug!(
            "mesh '{}': {} control points, {} triangles, {} materials",
            name,
            points.len(),
            assembled.triangles.len(),
            materials.len()
        );
        self.vertices.extend(assembled.vertices);
        self.triangles.extend(assembled.triangles);
        self.materials.extend(materials);
        Ok(())
    }

    pub fn finish(mut self) -> BakedScene<N> {
        let stats = optimize::optimize_mesh(&mut self.vertices, &mut self.triangles);
        log::debug!(
            "optimized vertices: {} -> {}",
            stats.vertices_before,
            stats.vertices_after
        );
        BakedScene {
            skeleton: self.skeleton,
            vertices: self.vertices,
            triangles: self.triangles,
            materials: self.materials,
            textures: self.textures,
            animation: self.animation,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BakedScene<N> {
    pub skeleton: Skeleton<N>,
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub animation: Option<AnimationInfo>,
}

impl<N> BakedScene<N> {
    pub fn has_skeleton(&self) -> bool {
        !self.skeleton.is_empty()
    }
}

fn collect_mesh_nodes<P: SceneProvider>(scene: &P, node: P::Node, out: &mut Vec<P::Node>) {
    if scene.attribute_type(node) == AttributeType::Mesh {
        out.push(node);
    }
    for &child in scene.children(node) {
        collect_mesh_nodes(scene, child, out);
    }
}

/// Bakes every mesh node of `scene`, in depth-first order.
pub fn bake_scene<P: SceneProvider>(scene: &P) -> Result<BakedScene<P::Node>> {
    let start = Instant::now();
    let skeleton = Skeleton::build(scene);
    if skeleton.is_empty() {
        log::info!("no joints found, exporting a static mesh");
    } else {
        log::info!("skeleton: {} joints", skeleton.len());
    }
    log::debug!("skeleton built in {:?}", start.elapsed());

    let mut mesh_nodes = vec![];
    collect_mesh_nodes(scene, scene.root(), &mut mesh_nodes);

    let mut context = ExportContext::new(skeleton);
    let meshes_start = Instant::now();
    for node in mesh_nodes {
        context.add_mesh(scene, node)?;
    }
    log::debug!("meshes assembled in {:?}", meshes_start.elapsed());

    let optimize_start = Instant::now();
    let baked = context.finish();
    log::debug!("optimized in {:?}", optimize_start.elapsed());

    log::info!(
        "baked {} vertices, {} triangles, {} materials, {} textures in {:?}",
        baked.vertices.len(),
        baked.triangles.len(),
        baked.materials.len(),
        baked.textures.len(),
        start.elapsed()
    );
    Ok(baked)
}
