//! Rendering adapter: renderer-agnostic scene graph and height texture plumbing.
//!
//! # Invariants
//! - Renderers never mutate the scene graph or the instance layout.
//! - The block field only exists in the scene once a height texture is bound.
//! - Displacement is computed per frame from the bound texture, never stored.
//!
//! The GPU backend lives in `blockfield-render-wgpu`; the `Renderer` trait and
//! `DebugTextRenderer` here let headless tools exercise the same scene.

mod bridge;
pub mod displacement;
mod renderer;
mod scene;

pub use bridge::{HeightTexture, TextureBridge, TextureId};
pub use renderer::{DebugTextRenderer, Renderer};
pub use scene::{DrawCall, HeightInstances, HemisphereLight, RenderView, Scene};

pub fn crate_info() -> &'static str {
    "blockfield-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
