//! Right-handed scene space to the left-handed space of the text formats.
//!
//! The conversion mirrors across the Z plane. It is applied while writing
//! only; baked data always stays in scene space.

use glam::{DMat4, DVec4};

const MIRROR_Z: DMat4 = DMat4::from_cols(
    DVec4::X,
    DVec4::Y,
    DVec4::NEG_Z,
    DVec4::W,
);

pub fn mirror_point(p: [f32; 3]) -> [f32; 3] {
    [p[0], p[1], -p[2]]
}

/// Mirrors a transform across the Z plane: translation Z and the X / Y
/// rotation components flip sign, scale is untouched.
pub fn to_left_handed(m: DMat4) -> DMat4 {
    MIRROR_Z * m * MIRROR_Z
}

/// Row-major f32 values, the layout the text formats print.
pub fn row_major(m: DMat4) -> [f32; 16] {
    m.transpose().to_cols_array().map(|v| v as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DQuat, DVec3};

    #[test]
    fn translation_z_flips() {
        let m = DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0));
        let converted = to_left_handed(m);
        assert_eq!(converted.w_axis.truncate(), DVec3::new(1.0, 2.0, -3.0));
    }

    #[test]
    fn rotation_x_and_y_flip() {
        let rotation = DQuat::from_euler(glam::EulerRot::XYZ, 0.3, -0.2, 0.7);
        let converted = to_left_handed(DMat4::from_quat(rotation));
        let (_, converted_rotation, _) = converted.to_scale_rotation_translation();
        let (x, y, z) = converted_rotation.to_euler(glam::EulerRot::XYZ);
        assert!((x + 0.3).abs() < 1e-9);
        assert!((y - 0.2).abs() < 1e-9);
        assert!((z - 0.7).abs() < 1e-9);
    }

    #[test]
    fn conversion_is_an_involution() {
        let m = DMat4::from_scale_rotation_translation(
            DVec3::new(1.0, 2.0, 0.5),
            DQuat::from_rotation_y(1.1),
            DVec3::new(-4.0, 0.0, 9.0),
        );
        assert!(to_left_handed(to_left_handed(m)).abs_diff_eq(m, 1e-12));
    }

    #[test]
    fn row_major_puts_translation_last_in_rows() {
        let values = row_major(DMat4::from_translation(DVec3::new(5.0, 6.0, 7.0)));
        assert_eq!(values[3], 5.0);
        assert_eq!(values[7], 6.0);
        assert_eq!(values[11], 7.0);
        assert_eq!(values[15], 1.0);
    }
}
