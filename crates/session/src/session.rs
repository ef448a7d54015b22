use std::time::Duration;

use blockfield_common::SessionRng;
use blockfield_heightmap::{HeightRaster, HeightfieldGenerator, RegenTimer};
use blockfield_layout::{InstanceLayout, ReferenceMesh};
use blockfield_render::{HeightTexture, Scene, TextureBridge};

use crate::config::{ConfigError, SessionConfig};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Built, timer not started, no drawing surface.
    Created,
    /// Timer running, rasters being published.
    Mounted,
    /// Timer cancelled and resources released. Terminal.
    TornDown,
}

/// One running demo: static instance layout plus the periodically
/// regenerated height texture and the scene that draws them.
///
/// Everything runs on the caller's thread. Regeneration happens inside
/// `advance`, so it is always sequenced strictly before or after a frame,
/// never in the middle of one.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    rng: SessionRng,
    mesh: ReferenceMesh,
    layout: InstanceLayout,
    generator: HeightfieldGenerator,
    timer: RegenTimer,
    bridge: TextureBridge,
    scene: Scene,
    state: SessionState,
}

impl Session {
    /// Validate `config`, then build the reference mesh and instance layout.
    /// Nothing is generated yet.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = SessionRng::from_seed_u64(config.seed);
        let mesh = ReferenceMesh::plane(config.plane);
        let layout = InstanceLayout::build(&mesh, &mut rng);
        let generator = HeightfieldGenerator::new(config.heightmap);
        let timer = RegenTimer::new(config.regen_period());
        let scene = Scene::new(config.view, config.lighting);

        tracing::info!(
            seed = config.seed,
            instances = layout.len(),
            period_ms = config.regen_period_ms,
            "session created"
        );

        Ok(Self {
            config,
            rng,
            mesh,
            layout,
            generator,
            timer,
            bridge: TextureBridge::new(),
            scene,
            state: SessionState::Created,
        })
    }

    /// Attach the drawing surface and start the regeneration timer at `now`.
    pub fn mount(&mut self, now: Duration) {
        if self.state != SessionState::Created {
            tracing::warn!(state = ?self.state, "mount ignored");
            return;
        }
        self.generator.attach_surface();
        self.timer.start(now);
        self.state = SessionState::Mounted;
        tracing::info!("session mounted");

        if self.config.generate_on_mount {
            self.regenerate();
        }
    }

    /// Fire the timer up to `now`. Returns how many firings were due.
    ///
    /// Firings that piled up during a stall collapse into one regeneration;
    /// only the newest raster would ever be seen.
    pub fn advance(&mut self, now: Duration) -> u32 {
        let due = self.timer.poll(now);
        if due > 0 {
            self.regenerate();
        }
        due
    }

    /// Regenerate the raster, publish it and rebind the scene to the result.
    ///
    /// Returns `None` without side effects when there is no drawing surface.
    pub fn regenerate(&mut self) -> Option<HeightTexture> {
        let raster = self.generator.regenerate(&mut self.rng)?;
        let texture = self.bridge.publish(raster);
        self.scene.bind_height_texture(&texture, self.layout.len() as u32);
        Some(texture)
    }

    /// Cancel the timer and release the surface and texture. Idempotent.
    pub fn teardown(&mut self) {
        if self.state == SessionState::TornDown {
            return;
        }
        self.timer.cancel();
        self.generator.detach_surface();
        self.bridge.clear();
        self.scene.unbind_height_texture();
        self.state = SessionState::TornDown;
        tracing::info!(passes = self.generator.passes(), "session torn down");
    }

    /// Completed regeneration passes.
    pub fn regenerations(&self) -> u64 {
        self.generator.passes()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mesh(&self) -> &ReferenceMesh {
        &self.mesh
    }

    pub fn layout(&self) -> &InstanceLayout {
        &self.layout
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Current raster, if the surface is attached.
    pub fn raster(&self) -> Option<&HeightRaster> {
        self.generator.raster()
    }

    pub fn bridge(&self) -> &TextureBridge {
        &self.bridge
    }

    /// Mutable bridge access for the GPU side to take dirty textures.
    pub fn bridge_mut(&mut self) -> &mut TextureBridge {
        &mut self.bridge
    }

    /// When the next regeneration is due, if the timer is running.
    pub fn next_regen(&self) -> Option<Duration> {
        self.timer.next_due()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}
