use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Size and subdivision of the reference plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneParams {
    /// Edge length of the square plane in world units.
    pub size: f32,
    /// Segments along each edge; the plane has `(segments + 1)^2` vertices.
    pub segments: u32,
}

impl Default for PlaneParams {
    fn default() -> Self {
        Self {
            size: 20.0,
            segments: 100,
        }
    }
}

/// One vertex of the reference mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: Vec3,
    pub uv: Vec2,
}

/// Flat, subdivided square lying in the XZ plane, centred on the origin.
///
/// Vertices are ordered row by row from -Z to +Z, and within a row from -X
/// to +X. UVs use texture space: `(0, 0)` is the first raster row and column,
/// so vertex `(ix, iz)` samples pixel column `ix / segments` and row
/// `iz / segments`.
#[derive(Debug, Clone)]
pub struct ReferenceMesh {
    params: PlaneParams,
    vertices: Vec<MeshVertex>,
}

impl ReferenceMesh {
    /// Build the plane. Panics if `segments` is zero.
    pub fn plane(params: PlaneParams) -> Self {
        assert!(params.segments > 0, "plane needs at least one segment");
        let n = params.segments;
        let step = params.size / n as f32;
        let half = params.size * 0.5;

        let mut vertices = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
        for iz in 0..=n {
            for ix in 0..=n {
                vertices.push(MeshVertex {
                    position: Vec3::new(ix as f32 * step - half, 0.0, iz as f32 * step - half),
                    uv: Vec2::new(ix as f32 / n as f32, iz as f32 / n as f32),
                });
            }
        }
        Self { params, vertices }
    }

    pub fn params(&self) -> &PlaneParams {
        &self.params
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Vertex `i`. Panics when out of range.
    pub fn vertex(&self, i: usize) -> &MeshVertex {
        &self.vertices[i]
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }
}
