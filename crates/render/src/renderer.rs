use std::fmt::Write;

use crate::scene::{DrawCall, RenderView, Scene};

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene graph and a view, then produces output. It
/// never mutates the scene or the static instance layout.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Debug text renderer.
///
/// Produces a human-readable description of the scene graph and the draws it
/// would issue. Useful for headless runs, logging, and testing the render
/// interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        let calls = scene.draw_calls();
        let _ = writeln!(out, "=== Scene (draw calls={}) ===", calls.len());
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        );
        let light = &scene.light;
        let _ = writeln!(
            out,
            "Light: sky=({:.2}, {:.2}, {:.2}) ground=({:.2}, {:.2}, {:.2}) intensity={:.2}",
            light.sky_color.x,
            light.sky_color.y,
            light.sky_color.z,
            light.ground_color.x,
            light.ground_color.y,
            light.ground_color.z,
            light.intensity
        );

        if calls.is_empty() {
            out.push_str("  (no height texture yet, block field hidden)\n");
        }
        for call in calls {
            match call {
                DrawCall::InstancedBlocks {
                    instance_count,
                    texture,
                } => {
                    let _ = writeln!(
                        out,
                        "  blocks x{instance_count} height_texture=#{}",
                        texture.0
                    );
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::TextureBridge;
    use blockfield_heightmap::HeightRaster;

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = Scene::default();
        let renderer = DebugTextRenderer::new();
        let output = renderer.render(&scene, &scene.view);

        assert!(output.contains("draw calls=0"));
        assert!(output.contains("block field hidden"));
        assert!(output.contains("fov=60"));
    }

    #[test]
    fn debug_renderer_with_blocks() {
        let mut bridge = TextureBridge::new();
        let tex = bridge.publish(&HeightRaster::new());
        let mut scene = Scene::default();
        scene.bind_height_texture(&tex, 10_201);

        let renderer = DebugTextRenderer::new();
        let output = renderer.render(&scene, &RenderView::default());

        assert!(output.contains("draw calls=1"));
        assert!(output.contains("blocks x10201"));
        assert!(output.contains("height_texture=#1"));
    }
}
