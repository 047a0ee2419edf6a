//! `.itpmesh` text mesh writer.

use std::io::{self, Write};

use crate::bake::{BakedScene, MAX_INFLUENCES};

use super::handedness::mirror_point;

pub const EXTENSION: &str = "itpmesh";

fn join<T: std::fmt::Display>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Writes the mesh in left-handed space with flipped winding. Skinned
/// exports additionally carry the four strongest influences per vertex.
pub fn write_mesh<N, W: Write>(scene: &BakedScene<N>, out: &mut W) -> io::Result<()> {
    let skinned = scene.has_skeleton();

    writeln!(out, "<?xml version='1.0' encoding='UTF-8' ?>")?;
    writeln!(out, "<itpmesh>")?;
    if skinned {
        writeln!(out, "\t<!-- position, normal, skinning weights, skinning indices, texture-->")?;
        writeln!(out, "\t<format>pnst</format>")?;
    } else {
        writeln!(out, "\t<format>pnt</format>")?;
    }
    for material in &scene.materials {
        writeln!(
            out,
            "\t<texture>{}</texture>",
            material.texture_paths[0].as_deref().unwrap_or("")
        )?;
    }

    writeln!(out, "\t<triangles count='{}'>", scene.triangles.len())?;
    for triangle in &scene.triangles {
        let [a, b, c] = triangle.indices;
        writeln!(out, "\t\t<tri>{a},{c},{b}</tri>")?;
    }
    writeln!(out, "\t</triangles>")?;

    writeln!(out, "\t<vertices count='{}'>", scene.vertices.len())?;
    for vertex in &scene.vertices {
        writeln!(out, "\t\t<vtx>")?;
        writeln!(out, "\t\t\t<pos>{}</pos>", join(mirror_point(vertex.position)))?;
        writeln!(out, "\t\t\t<norm>{}</norm>", join(mirror_point(vertex.normal)))?;
        if skinned {
            let influences = &vertex.blend_pairs[..MAX_INFLUENCES];
            writeln!(out, "\t\t\t<sw>{}</sw>", join(influences.iter().map(|p| p.weight as f32)))?;
            writeln!(out, "\t\t\t<si>{}</si>", join(influences.iter().map(|p| p.joint)))?;
        }
        writeln!(out, "\t\t\t<tex>{},{}</tex>", vertex.uv[0], 1.0 - vertex.uv[1])?;
        writeln!(out, "\t\t</vtx>")?;
    }
    writeln!(out, "\t</vertices>")?;
    writeln!(out, "</itpmesh>")?;
    Ok(())
}
