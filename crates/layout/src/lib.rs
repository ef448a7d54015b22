//! Instance layout: a reference plane mesh and one block instance per vertex.
//!
//! # Invariants
//! - `InstanceLayout::len() == ReferenceMesh::vertex_count()`.
//! - Instance `i` takes its position and UV from vertex `i`.
//! - Base transforms are computed once; nothing mutates them afterwards.

mod instances;
mod mesh;

pub use instances::InstanceLayout;
pub use mesh::{MeshVertex, PlaneParams, ReferenceMesh};

pub fn crate_info() -> &'static str {
    "blockfield-layout v0.1.0"
}
