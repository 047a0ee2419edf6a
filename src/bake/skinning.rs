use std::ops::RangeInclusive;

use glam::DMat4;

use crate::error::{ExportError, Result};
use crate::scene::{AnimationTake, Mesh, SceneProvider};

use super::control_points::{pad_blend_pairs, BlendPair, ControlPoint};
use super::skeleton::{Keyframe, Skeleton};

pub const FRAMES_PER_SECOND: f64 = 24.0;

// absorbs float noise in times that sit exactly on a frame boundary
const FRAME_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationInfo {
    pub name: String,
    /// Number of frames, both ends included.
    pub length: i64,
}

pub fn frame_number(seconds: f64) -> i64 {
    (seconds * FRAMES_PER_SECOND + FRAME_EPSILON).floor() as i64
}

pub fn frame_range(take: &AnimationTake) -> RangeInclusive<i64> {
    frame_number(take.start)..=frame_number(take.stop)
}

pub fn frame_time(frame: i64) -> f64 {
    frame as f64 / FRAMES_PER_SECOND
}

/// Binds every cluster of `mesh` to its joint: bind-pose inverse, blend
/// pairs on the influenced control points and sampled keyframes. Returns the
/// sampled take, if the scene has one.
pub fn resolve_skinning<P: SceneProvider>(
    scene: &P,
    node: P::Node,
    mesh: &Mesh<P::Node>,
    skeleton: &mut Skeleton<P::Node>,
    control_points: &mut [ControlPoint],
) -> Result<Option<AnimationInfo>> {
    let geometry = scene.geometric_transform(node);
    let take = scene.animation_take();
    if take.is_none() && !mesh.skins.is_empty() {
        log::warn!(
            "mesh '{}' is skinned but the scene has no animation take, keyframes stay empty",
            scene.name(node)
        );
    }

    for skin in &mesh.skins {
        for cluster in &skin.clusters {
            let link_name = scene.name(cluster.link);
            let joint_index = skeleton.find_joint_index(link_name)?;
            if cluster.indices.len() != cluster.weights.len() {
                return Err(ExportError::ClusterWeightMismatch {
                    joint: link_name.to_string(),
                    indices: cluster.indices.len(),
                    weights: cluster.weights.len(),
                });
            }

            let joint = &mut skeleton.joints[joint_index];
            joint.bind_pose_inverse = cluster.transform_link.inverse() * cluster.transform * geometry;
            joint.node = cluster.link;

            for (&point, &weight) in cluster.indices.iter().zip(&cluster.weights) {
                let len = control_points.len();
                let control_point = control_points.get_mut(point as usize).ok_or(
                    ExportError::AttributeIndexOutOfRange {
                        attribute: "cluster control point",
                        index: point as usize,
                        len,
                    },
                )?;
                control_point.blend_pairs.push(BlendPair {
                    joint: joint_index as u32,
                    weight,
                });
            }

            if let Some(take) = take {
                joint.keyframes = sample_keyframes(scene, node, cluster.link, geometry, take);
            }
            log::debug!(
                "cluster '{}' -> joint {}: {} influences, {} keyframes",
                link_name,
                joint_index,
                cluster.indices.len(),
                joint.keyframes.len()
            );
        }
    }

    for control_point in control_points.iter_mut() {
        pad_blend_pairs(&mut control_point.blend_pairs);
    }

    Ok(take.map(|take| {
        let frames = frame_range(take);
        AnimationInfo {
            name: take.name.clone(),
            length: frames.end() - frames.start() + 1,
        }
    }))
}

fn sample_keyframes<P: SceneProvider>(
    scene: &P,
    mesh_node: P::Node,
    link: P::Node,
    geometry: DMat4,
    take: &AnimationTake,
) -> Vec<Keyframe> {
    frame_range(take)
        .map(|frame| {
            let time = frame_time(frame);
            let mesh_global = scene.evaluate_global_transform(mesh_node, time) * geometry;
            let link_global = scene.evaluate_global_transform(link, time);
            Keyframe {
                frame,
                global_transform: mesh_global.inverse() * link_global,
            }
        })
        .collect()
}
