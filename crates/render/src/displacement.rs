//! Per-instance height displacement and height tint.
//!
//! These are the CPU reference versions of what the block shader does each
//! frame. The GPU program receives the same constants through its uniform
//! block.

use glam::{Mat4, Vec2, Vec3};

use crate::bridge::HeightTexture;

/// World units of lift at full height.
pub const VERTICAL_SCALE: f32 = 5.0;

/// Tint at height 0 (red-orange).
pub const LOW_COLOR: Vec3 = Vec3::new(1.0, 0.125, 0.0);

/// Tint at height 1 (cyan).
pub const HIGH_COLOR: Vec3 = Vec3::new(0.0, 1.0, 1.0);

/// Lift a base instance matrix by `height * VERTICAL_SCALE` along +Y.
///
/// Only the translation column changes; rotation and scale are untouched.
pub fn displace(base: Mat4, height: f32) -> Mat4 {
    let mut m = base;
    m.w_axis.y += height * VERTICAL_SCALE;
    m
}

/// Base colour for a normalised height.
pub fn height_color(height: f32) -> Vec3 {
    LOW_COLOR.lerp(HIGH_COLOR, height)
}

/// Displaced instance matrix for an instance sampling `texture` at `uv`.
pub fn instance_matrix(base: Mat4, texture: &HeightTexture, uv: Vec2) -> Mat4 {
    displace(base, texture.sample(uv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::TextureBridge;
    use blockfield_common::SessionRng;
    use blockfield_heightmap::{GeneratorParams, HeightfieldGenerator};
    use blockfield_layout::{InstanceLayout, PlaneParams, ReferenceMesh};

    #[test]
    fn displacement_is_height_times_scale() {
        for h in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let m = displace(Mat4::IDENTITY, h);
            assert_eq!(m.w_axis.y, h * 5.0);
            assert_eq!(m.w_axis.x, 0.0);
            assert_eq!(m.w_axis.z, 0.0);
        }
    }

    #[test]
    fn displacement_keeps_rotation() {
        let base = Mat4::from_rotation_x(0.4) * Mat4::from_rotation_z(1.1);
        let m = displace(base, 0.8);
        assert_eq!(m.x_axis, base.x_axis);
        assert_eq!(m.y_axis, base.y_axis);
        assert_eq!(m.z_axis, base.z_axis);
    }

    #[test]
    fn color_blend_boundaries() {
        assert_eq!(height_color(0.0), Vec3::new(1.0, 0.125, 0.0));
        assert_eq!(height_color(0.5), Vec3::new(0.5, 0.5625, 0.5));
        assert_eq!(height_color(1.0), Vec3::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn instances_follow_the_current_texture() {
        let mut rng = SessionRng::from_seed_u64(11);
        let mesh = ReferenceMesh::plane(PlaneParams::default());
        let layout = InstanceLayout::build(&mesh, &mut rng);

        let mut generator = HeightfieldGenerator::new(GeneratorParams::default());
        generator.attach_surface();
        let mut bridge = TextureBridge::new();
        let texture = bridge.publish(generator.regenerate(&mut rng).unwrap());

        for i in (0..layout.len()).step_by(97) {
            let base = layout.transforms()[i].to_matrix();
            let h = texture.sample(layout.uvs()[i]);
            let m = instance_matrix(base, &texture, layout.uvs()[i]);
            assert!((0.0..=1.0).contains(&h));
            assert_eq!(m.w_axis.y - base.w_axis.y, h * VERTICAL_SCALE);
            assert_eq!(m.w_axis.x, base.w_axis.x);
        }
        // Base layout is untouched by displacement.
        assert_eq!(layout.transforms()[0].position.y, 0.0);
    }
}
