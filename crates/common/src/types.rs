use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Transform at `position` with the given rotation and unit scale.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Column-major model matrix (scale, then rotation, then translation).
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn matrix_translation_matches_position() {
        let t = Transform::from_position_rotation(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(0.7),
        );
        let m = t.to_matrix();
        assert_eq!(m.w_axis.truncate(), t.position);
    }
}
