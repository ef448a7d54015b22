//! wgpu render backend for the block field.
//!
//! Draws one instanced block per reference-mesh vertex. The vertex shader
//! samples the height texture at each instance's UV and lifts the block by
//! `height * 5`; the fragment shader blends the low/high tint by height.
//!
//! # Invariants
//! - Renderer never mutates session state; it only takes dirty textures from
//!   the bridge.
//! - Blocks are drawn only once the GPU holds the texture the scene is bound to.
//! - Camera motion is not part of the session.

mod camera;
mod error;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use error::RenderError;
pub use gpu::{BLOCK_SIZE, WgpuRenderer, choose_surface_format};
pub use shaders::BLOCK_SHADER;
