use glam::{DMat4, DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Local transform of a node, either a full matrix or translation /
/// rotation / scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transform {
    Matrix {
        /// column-major
        matrix: DMat4,
    },
    Decomposed {
        #[serde(default)]
        translation: [f64; 3],
        /// quaternion, xyzw
        #[serde(default = "identity_rotation")]
        rotation: [f64; 4],
        #[serde(default = "unit_scale")]
        scale: [f64; 3],
    },
}

fn identity_rotation() -> [f64; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

impl Default for Transform {
    fn default() -> Self {
        Transform::Decomposed {
            translation: [0.0; 3],
            rotation: identity_rotation(),
            scale: unit_scale(),
        }
    }
}

impl Transform {
    pub fn to_mat4(&self) -> DMat4 {
        match *self {
            Transform::Matrix { matrix } => matrix,
            Transform::Decomposed {
                translation,
                rotation,
                scale,
            } => DMat4::from_scale_rotation_translation(
                DVec3::from(scale),
                DQuat::from_xyzw(rotation[0], rotation[1], rotation[2], rotation[3]).normalize(),
                DVec3::from(translation),
            ),
        }
    }

    fn to_scale_rotation_translation(&self) -> (DVec3, DQuat, DVec3) {
        self.to_mat4().to_scale_rotation_translation()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalKey {
    pub time: f64,
    pub transform: Transform,
}

/// Samples a key list at `time`. Keys must be sorted by time; sampling
/// outside the keyed range holds the first / last key.
pub(crate) fn sample_keys(keys: &[LocalKey], time: f64) -> Option<DMat4> {
    let first = keys.first()?;
    let last = keys.last()?;
    if time <= first.time {
        return Some(first.transform.to_mat4());
    }
    if time >= last.time {
        return Some(last.transform.to_mat4());
    }

    let next = keys.partition_point(|key| key.time <= time);
    let (a, b) = (&keys[next - 1], &keys[next]);
    let span = b.time - a.time;
    if span <= 0.0 {
        return Some(b.transform.to_mat4());
    }
    let s = (time - a.time) / span;

    let (scale_a, rotation_a, translation_a) = a.transform.to_scale_rotation_translation();
    let (scale_b, rotation_b, translation_b) = b.transform.to_scale_rotation_translation();
    Some(DMat4::from_scale_rotation_translation(
        scale_a.lerp(scale_b, s),
        rotation_a.slerp(rotation_b, s),
        translation_a.lerp(translation_b, s),
    ))
}
