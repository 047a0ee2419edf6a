use crate::error::{ExportError, Result};
use crate::scene::{LayerElement, MappingMode, Mesh, ReferenceMode};

use super::control_points::{pad_blend_pairs, BlendPair, ControlPoint};

/// Only the first UV channel is exported; two are accepted on read.
const MAX_UV_LAYERS: usize = 2;

/// A fully expanded mesh corner. Two vertices are the same vertex only if
/// every field compares equal exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Sorted by descending weight, at least four entries.
    pub blend_pairs: Vec<BlendPair>,
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2], blend_pairs: &[BlendPair]) -> Self {
        let mut blend_pairs = blend_pairs.to_vec();
        blend_pairs.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        pad_blend_pairs(&mut blend_pairs);
        Self {
            position,
            normal,
            uv,
            blend_pairs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub indices: [u32; 3],
    pub material_index: Option<u32>,
}

#[derive(Debug, Default)]
pub struct AssembledMesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

fn read_layer<T: Copy>(
    layer: &LayerElement<T>,
    attribute: &'static str,
    control_point: usize,
    corner: usize,
) -> Result<T> {
    let unsupported = || ExportError::UnsupportedAttributeLayout {
        attribute,
        mapping: layer.mapping,
        reference: layer.reference,
    };
    let key = match layer.mapping {
        MappingMode::ByControlPoint => control_point,
        MappingMode::ByPolygonVertex => corner,
        _ => return Err(unsupported()),
    };
    let direct_index = match layer.reference {
        ReferenceMode::Direct => key,
        ReferenceMode::IndexToDirect => *layer.index.get(key).ok_or(
            ExportError::AttributeIndexOutOfRange {
                attribute,
                index: key,
                len: layer.index.len(),
            },
        )? as usize,
        ReferenceMode::Index => return Err(unsupported()),
    };
    layer
        .direct
        .get(direct_index)
        .copied()
        .ok_or(ExportError::AttributeIndexOutOfRange {
            attribute,
            index: direct_index,
            len: layer.direct.len(),
        })
}

pub fn read_normal<N>(mesh: &Mesh<N>, node_name: &str, control_point: usize, corner: usize) -> Result<[f32; 3]> {
    let layer = mesh.normals.first().ok_or_else(|| ExportError::MissingNormal {
        node: node_name.to_string(),
    })?;
    let n = read_layer(layer, "normal", control_point, corner)?;
    Ok([n[0] as f32, n[1] as f32, n[2] as f32])
}

pub fn read_uv<N>(mesh: &Mesh<N>, layer: usize, control_point: usize, corner: usize) -> Result<[f32; 2]> {
    if layer >= MAX_UV_LAYERS || layer >= mesh.uvs.len() {
        return Err(ExportError::InvalidUvLayer {
            layer,
            available: mesh.uvs.len(),
        });
    }
    let uv = read_layer(&mesh.uvs[layer], "uv", control_point, corner)?;
    Ok([uv[0] as f32, uv[1] as f32])
}

/// Per-polygon material index, already offset into the export's material
/// table. `material_count` is the number of materials on the owning node.
pub fn read_material_indices<N>(
    mesh: &Mesh<N>,
    material_offset: u32,
    material_count: usize,
) -> Result<Vec<Option<u32>>> {
    let polygons = mesh.polygons.len();
    let Some(element) = &mesh.material else {
        return Ok(vec![None; polygons]);
    };

    let local: Vec<Option<u32>> = match element.mapping {
        MappingMode::ByPolygon if element.indices.len() == polygons => {
            element.indices.iter().copied().map(Some).collect()
        }
        MappingMode::ByPolygon => {
            log::warn!(
                "material element has {} indices for {} polygons, leaving materials unset",
                element.indices.len(),
                polygons
            );
            vec![None; polygons]
        }
        MappingMode::AllSame => vec![element.indices.first().copied(); polygons],
        mapping => return Err(ExportError::UnsupportedMaterialMapping(mapping)),
    };

    Ok(local
        .into_iter()
        .map(|index| match index {
            Some(i) if (i as usize) < material_count => Some(i + material_offset),
            Some(i) => {
                log::warn!("material index {i} out of range ({material_count} materials), leaving it unset");
                None
            }
            None => None,
        })
        .collect())
}

/// Expands every polygon into three vertices and one triangle. Triangle
/// indices start at `vertex_base` so several meshes can share one buffer.
pub fn assemble_mesh<N>(
    mesh: &Mesh<N>,
    node_name: &str,
    control_points: &[ControlPoint],
    vertex_base: u32,
    material_offset: u32,
    material_count: usize,
) -> Result<AssembledMesh> {
    let materials = read_material_indices(mesh, material_offset, material_count)?;
    let mut assembled = AssembledMesh {
        vertices: Vec::with_capacity(mesh.polygons.len() * 3),
        triangles: Vec::with_capacity(mesh.polygons.len()),
    };

    let mut corner = 0usize;
    for (polygon, material_index) in mesh.polygons.iter().zip(materials) {
        let mut indices = [0u32; 3];
        for (slot, &point) in indices.iter_mut().zip(polygon) {
            let point = point as usize;
            let control_point = control_points.get(point).ok_or(ExportError::AttributeIndexOutOfRange {
                attribute: "control point",
                index: point,
                len: control_points.len(),
            })?;
            let normal = read_normal(mesh, node_name, point, corner)?;
            let uv = read_uv(mesh, 0, point, corner)?;

            *slot = vertex_base + assembled.vertices.len() as u32;
            assembled.vertices.push(Vertex::new(
                control_point.position,
                normal,
                uv,
                &control_point.blend_pairs,
            ));
            corner += 1;
        }
        assembled.triangles.push(Triangle {
            indices,
            material_index,
        });
    }
    Ok(assembled)
}
