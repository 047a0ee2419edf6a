//! `.itpanim` text skeleton and animation writer.

use std::io::{self, Write};

use glam::DMat4;

use crate::bake::BakedScene;

use super::handedness::{row_major, to_left_handed};

pub const EXTENSION: &str = "itpanim";

fn write_matrix<W: Write>(out: &mut W, indent: &str, m: DMat4) -> io::Result<()> {
    let values = row_major(to_left_handed(m))
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");
    writeln!(out, "{indent}{values}")
}

/// Writes the joint hierarchy with bind-pose inverses, followed by one
/// track of sampled frames per joint. Frame numbers are written one lower
/// than sampled, which is what the reading side expects.
pub fn write_animation<N, W: Write>(scene: &BakedScene<N>, out: &mut W) -> io::Result<()> {
    let joints = &scene.skeleton.joints;

    writeln!(out, "<?xml version='1.0' encoding='UTF-8' ?>")?;
    writeln!(out, "<itpanim>")?;
    writeln!(out, "\t<skeleton count='{}'>", joints.len())?;
    for (id, joint) in joints.iter().enumerate() {
        writeln!(
            out,
            "\t\t<joint id='{id}' name='{}' parent='{}'>",
            joint.name, joint.parent_index
        )?;
        write_matrix(out, "\t\t\t", joint.bind_pose_inverse)?;
        writeln!(out, "\t\t</joint>")?;
    }
    writeln!(out, "\t</skeleton>")?;

    let (name, length) = match &scene.animation {
        Some(info) => (info.name.as_str(), info.length),
        None => ("", 0),
    };
    writeln!(out, "\t<animations>")?;
    writeln!(out, "\t\t<animation name='{name}' length='{length}'>")?;
    for (id, joint) in joints.iter().enumerate() {
        writeln!(out, "\t\t\t<track id='{id}' name='{}'>", joint.name)?;
        for keyframe in &joint.keyframes {
            writeln!(out, "\t\t\t\t<frame num='{}'>", keyframe.frame - 1)?;
            write_matrix(out, "\t\t\t\t\t", keyframe.global_transform)?;
            writeln!(out, "\t\t\t\t</frame>")?;
        }
        writeln!(out, "\t\t\t</track>")?;
    }
    writeln!(out, "\t\t</animation>")?;
    writeln!(out, "\t</animations>")?;
    writeln!(out, "</itpanim>")?;
    Ok(())
}
