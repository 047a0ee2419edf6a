use glam::DMat4;

use crate::error::{ExportError, Result};
use crate::scene::{AttributeType, SceneProvider};

/// Global transform of a joint at one frame, relative to the mesh node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub frame: i64,
    pub global_transform: DMat4,
}

#[derive(Debug, Clone)]
pub struct Joint<N> {
    pub name: String,
    /// -1 for a root joint
    pub parent_index: i32,
    pub bind_pose_inverse: DMat4,
    pub node: N,
    pub keyframes: Vec<Keyframe>,
}

impl<N> Joint<N> {
    pub fn is_root(&self) -> bool {
        self.parent_index < 0
    }
}

#[derive(Debug, Clone)]
pub struct Skeleton<N> {
    pub joints: Vec<Joint<N>>,
}

impl<N> Default for Skeleton<N> {
    fn default() -> Self {
        Self { joints: vec![] }
    }
}

impl<N: Copy> Skeleton<N> {
    /// Collects every skeleton-typed node in depth-first pre-order. A joint's
    /// parent is its nearest joint ancestor; other nodes are walked through.
    pub fn build<P>(scene: &P) -> Self
    where
        P: SceneProvider<Node = N>,
    {
        let mut joints = vec![];
        collect_joints(scene, scene.root(), -1, &mut joints);

        let roots = joints.iter().filter(|joint| joint.is_root()).count();
        if roots > 1 {
            log::warn!("skeleton has {roots} root joints, expected one");
        }
        Self { joints }
    }
}

fn collect_joints<P: SceneProvider>(
    scene: &P,
    node: P::Node,
    parent_index: i32,
    joints: &mut Vec<Joint<P::Node>>,
) {
    let mut child_parent = parent_index;
    if scene.attribute_type(node) == AttributeType::Skeleton {
        child_parent = joints.len() as i32;
        joints.push(Joint {
            name: scene.name(node).to_string(),
            parent_index,
            bind_pose_inverse: DMat4::IDENTITY,
            node,
            keyframes: vec![],
        });
    }
    for &child in scene.children(node) {
        collect_joints(scene, child, child_parent, joints);
    }
}

impl<N> Skeleton<N> {
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn find_joint_index(&self, name: &str) -> Result<usize> {
        self.joints
            .iter()
            .position(|joint| joint.name == name)
            .ok_or_else(|| ExportError::SkeletonIntegrity {
                joint: name.to_string(),
            })
    }
}
