use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::bridge::{HeightTexture, TextureId};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 5.0, 10.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
        }
    }
}

/// Sky/ground ambient light. Surfaces facing up get the sky colour, surfaces
/// facing down the ground colour, with a linear blend in between.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HemisphereLight {
    pub sky_color: Vec3,
    pub ground_color: Vec3,
    pub intensity: f32,
}

impl Default for HemisphereLight {
    fn default() -> Self {
        Self {
            sky_color: Vec3::ONE,
            ground_color: Vec3::splat(127.0 / 255.0),
            intensity: 1.0,
        }
    }
}

impl HemisphereLight {
    /// Incoming light for a surface with the given unit normal.
    pub fn irradiance(&self, normal: Vec3) -> Vec3 {
        let w = 0.5 * normal.y + 0.5;
        self.ground_color.lerp(self.sky_color, w) * self.intensity
    }

    /// Lit colour of a diffuse surface.
    pub fn shade(&self, base_color: Vec3, normal: Vec3) -> Vec3 {
        base_color * self.irradiance(normal)
    }
}

/// The instanced block field, bound to one height texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightInstances {
    pub instance_count: u32,
    pub texture: TextureId,
}

/// One draw the renderer should issue this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    InstancedBlocks {
        instance_count: u32,
        texture: TextureId,
    },
}

/// Scene graph: view, light and the block field.
///
/// The block field is absent until a height texture has been bound, so no
/// frame can sample a texture that does not exist yet.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub view: RenderView,
    pub light: HemisphereLight,
    instances: Option<HeightInstances>,
}

impl Scene {
    pub fn new(view: RenderView, light: HemisphereLight) -> Self {
        Self {
            view,
            light,
            instances: None,
        }
    }

    /// Point the block field at `texture`, adding it on first bind.
    pub fn bind_height_texture(&mut self, texture: &HeightTexture, instance_count: u32) {
        if self.instances.is_none() {
            tracing::info!(instance_count, "block field added to scene");
        }
        self.instances = Some(HeightInstances {
            instance_count,
            texture: texture.id(),
        });
    }

    /// Remove the block field.
    pub fn unbind_height_texture(&mut self) {
        self.instances = None;
    }

    pub fn height_instances(&self) -> Option<&HeightInstances> {
        self.instances.as_ref()
    }

    /// Draws for the current state of the graph.
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.instances
            .iter()
            .map(|node| DrawCall::InstancedBlocks {
                instance_count: node.instance_count,
                texture: node.texture,
            })
            .collect()
    }
}
