use std::f32::consts::PI;

use blockfield_common::Transform;
use glam::{EulerRot, Quat, Vec2, Vec3};
use rand::Rng;

use crate::mesh::ReferenceMesh;

/// Static per-instance data: one base transform and one UV per mesh vertex.
///
/// Built once and never mutated. Instance `i` always corresponds to
/// reference-mesh vertex `i`; height displacement is applied on top of these
/// transforms at draw time and is never written back here.
#[derive(Debug, Clone)]
pub struct InstanceLayout {
    transforms: Vec<Transform>,
    uvs: Vec<Vec2>,
}

impl InstanceLayout {
    /// Place one instance at every vertex of `mesh` with a random fixed rotation.
    pub fn build<R: Rng + ?Sized>(mesh: &ReferenceMesh, rng: &mut R) -> Self {
        let count = mesh.vertex_count();
        let mut transforms = Vec::with_capacity(count);
        let mut uvs = Vec::with_capacity(count);

        for vertex in mesh.vertices() {
            transforms.push(Transform::from_position_rotation(
                vertex.position,
                random_rotation(rng),
            ));
            uvs.push(vertex.uv);
        }

        tracing::debug!(instances = count, "instance layout built");
        Self { transforms, uvs }
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Base transforms, indexed like the mesh vertices.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Per-instance texture coordinates, indexed like the mesh vertices.
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }
}

/// Euler angles drawn uniformly from `[0, PI)` on each axis.
fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> Quat {
    let angles = Vec3::new(
        rng.gen_range(0.0..1.0),
        rng.gen_range(0.0..1.0),
        rng.gen_range(0.0..1.0),
    ) * PI;
    Quat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PlaneParams;
    use blockfield_common::SessionRng;

    fn default_layout(seed: u64) -> (ReferenceMesh, InstanceLayout) {
        let mesh = ReferenceMesh::plane(PlaneParams::default());
        let layout = InstanceLayout::build(&mesh, &mut SessionRng::from_seed_u64(seed));
        (mesh, layout)
    }

    #[test]
    fn one_instance_per_vertex() {
        let (mesh, layout) = default_layout(1);
        assert_eq!(layout.len(), 10_201);
        assert_eq!(layout.len(), mesh.vertex_count());
        assert_eq!(layout.uvs().len(), mesh.vertex_count());
    }

    #[test]
    fn instance_matches_source_vertex() {
        let (mesh, layout) = default_layout(2);
        for i in 0..mesh.vertex_count() {
            assert_eq!(layout.transforms()[i].position, mesh.vertex(i).position);
            assert_eq!(layout.uvs()[i], mesh.vertex(i).uv);
        }
    }

    #[test]
    fn rotations_are_unit_and_unit_scale() {
        let (_, layout) = default_layout(3);
        for t in layout.transforms() {
            assert!(t.rotation.is_normalized());
            assert_eq!(t.scale, Vec3::ONE);
        }
    }

    #[test]
    fn rotations_vary_between_instances() {
        let (_, layout) = default_layout(4);
        let first = layout.transforms()[0].rotation;
        assert!(layout.transforms().iter().any(|t| t.rotation != first));
    }

    #[test]
    fn same_seed_same_layout() {
        let (_, a) = default_layout(5);
        let (_, b) = default_layout(5);
        assert_eq!(a.transforms(), b.transforms());
    }
}
