use crate::scene::Mesh;

/// Number of joint influences a vertex carries at minimum, and the number
/// the output formats store.
pub const MAX_INFLUENCES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendPair {
    pub joint: u32,
    pub weight: f64,
}

impl BlendPair {
    pub const EMPTY: BlendPair = BlendPair {
        joint: 0,
        weight: 0.0,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlPoint {
    pub position: [f32; 3],
    pub blend_pairs: Vec<BlendPair>,
}

pub fn read_control_points<N>(mesh: &Mesh<N>) -> Vec<ControlPoint> {
    mesh.control_points
        .iter()
        .map(|p| ControlPoint {
            position: [p[0] as f32, p[1] as f32, p[2] as f32],
            blend_pairs: vec![],
        })
        .collect()
}

/// Pads with empty pairs up to [`MAX_INFLUENCES`]. Longer lists are kept
/// whole.
pub fn pad_blend_pairs(pairs: &mut Vec<BlendPair>) {
    if pairs.len() < MAX_INFLUENCES {
        pairs.resize(MAX_INFLUENCES, BlendPair::EMPTY);
    }
}
