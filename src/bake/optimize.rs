use std::collections::HashMap;

use super::vertices::{Triangle, Vertex};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeStats {
    pub vertices_before: usize,
    pub vertices_after: usize,
}

// -0.0 and 0.0 compare equal, so they must share a bucket
fn position_key(position: &[f32; 3]) -> [u32; 3] {
    position.map(|c| if c == 0.0 { 0 } else { c.to_bits() })
}

/// Drops exact duplicate vertices, rewrites triangle indices to the first
/// matching vertex and stable-sorts triangles by material (unset first).
pub fn optimize_mesh(vertices: &mut Vec<Vertex>, triangles: &mut [Triangle]) -> OptimizeStats {
    let vertices_before = vertices.len();
    let mut unique: Vec<Vertex> = Vec::with_capacity(vertices.len());
    let mut remap: Vec<u32> = Vec::with_capacity(vertices.len());
    let mut buckets: HashMap<[u32; 3], Vec<u32>> = HashMap::new();

    for vertex in vertices.drain(..) {
        let bucket = buckets.entry(position_key(&vertex.position)).or_default();
        let existing = bucket.iter().copied().find(|&slot| unique[slot as usize] == vertex);
        let slot = match existing {
            Some(slot) => slot,
            None => {
                let slot = unique.len() as u32;
                unique.push(vertex);
                bucket.push(slot);
                slot
            }
        };
        remap.push(slot);
    }

    for triangle in triangles.iter_mut() {
        for index in triangle.indices.iter_mut() {
            *index = remap[*index as usize];
        }
    }
    triangles.sort_by_key(|triangle| triangle.material_index);
    *vertices = unique;

    OptimizeStats {
        vertices_before,
        vertices_after: vertices.len(),
    }
}
