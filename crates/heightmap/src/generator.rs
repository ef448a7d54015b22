use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::gradient::RadialGradient;
use crate::raster::{HeightRaster, RASTER_SIZE};

/// Tunables for one regeneration pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorParams {
    /// Number of gradients stamped per pass.
    pub stamps: u32,
    /// Radius at which a stamp is still at full intensity.
    pub inner_radius: f32,
    /// Radius at which a stamp becomes fully transparent.
    pub outer_radius: f32,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            stamps: 100,
            inner_radius: 1.0,
            outer_radius: 50.0,
        }
    }
}

/// Produces height rasters by stamping random radial gradients.
///
/// The generator owns its drawing surface. Until `attach_surface` is called
/// there is nothing to draw into and `regenerate` does nothing.
#[derive(Debug, Default)]
pub struct HeightfieldGenerator {
    params: GeneratorParams,
    surface: Option<HeightRaster>,
    passes: u64,
}

impl HeightfieldGenerator {
    pub fn new(params: GeneratorParams) -> Self {
        Self {
            params,
            surface: None,
            passes: 0,
        }
    }

    pub fn params(&self) -> &GeneratorParams {
        &self.params
    }

    /// Allocate the drawing surface. Idempotent.
    pub fn attach_surface(&mut self) {
        if self.surface.is_none() {
            self.surface = Some(HeightRaster::new());
        }
    }

    /// Release the drawing surface.
    pub fn detach_surface(&mut self) {
        self.surface = None;
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Current raster, if a surface is attached.
    pub fn raster(&self) -> Option<&HeightRaster> {
        self.surface.as_ref()
    }

    /// Number of completed passes since construction.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Clear the surface and stamp a fresh set of gradients onto it.
    ///
    /// Returns the regenerated raster, or `None` when no surface is attached.
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&HeightRaster> {
        let _span = tracing::info_span!("regenerate_heightfield").entered();
        let Some(raster) = self.surface.as_mut() else {
            tracing::trace!("no drawing surface, skipping regeneration");
            return None;
        };

        raster.clear();
        for _ in 0..self.params.stamps {
            random_stamp(&self.params, rng).composite_onto(raster);
        }
        self.passes += 1;

        tracing::debug!(pass = self.passes, "heightfield regenerated");
        self.surface.as_ref()
    }
}

/// Draw one gradient with a uniform integer centre and intensity.
fn random_stamp<R: Rng + ?Sized>(params: &GeneratorParams, rng: &mut R) -> RadialGradient {
    let x = rng.gen_range(0..RASTER_SIZE);
    let y = rng.gen_range(0..RASTER_SIZE);
    let intensity = rng.gen_range(0..=u8::MAX);
    RadialGradient {
        center: Vec2::new(x as f32, y as f32),
        inner_radius: params.inner_radius,
        outer_radius: params.outer_radius,
        intensity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfield_common::SessionRng;

    #[test]
    fn regenerate_without_surface_is_noop() {
        let mut rng = SessionRng::from_seed_u64(1);
        let mut generator = HeightfieldGenerator::new(GeneratorParams::default());
        assert!(generator.regenerate(&mut rng).is_none());
        assert_eq!(generator.passes(), 0);
    }

    #[test]
    fn raster_is_always_full_size() {
        let mut rng = SessionRng::from_seed_u64(2);
        let mut generator = HeightfieldGenerator::default();
        generator.attach_surface();
        for _ in 0..3 {
            let raster = generator.regenerate(&mut rng).unwrap();
            assert_eq!(raster.width(), 256);
            assert_eq!(raster.height(), 256);
            assert_eq!(raster.intensities().count(), 256 * 256);
        }
    }

    #[test]
    fn default_params_paint_something() {
        let mut rng = SessionRng::from_seed_u64(3);
        let mut generator = HeightfieldGenerator::new(GeneratorParams::default());
        generator.attach_surface();
        let stats = generator.regenerate(&mut rng).unwrap().stats();
        assert!(stats.max > 0);
        assert!(stats.mean > 0.0);
    }

    #[test]
    fn same_seed_same_raster() {
        let mut a = HeightfieldGenerator::new(GeneratorParams::default());
        let mut b = HeightfieldGenerator::new(GeneratorParams::default());
        a.attach_surface();
        b.attach_surface();
        let ra = a.regenerate(&mut SessionRng::from_seed_u64(9)).cloned();
        let rb = b.regenerate(&mut SessionRng::from_seed_u64(9)).cloned();
        assert_eq!(ra, rb);
    }

    #[test]
    fn passes_are_independent_of_previous_raster() {
        let mut generator = HeightfieldGenerator::new(GeneratorParams::default());
        generator.attach_surface();
        generator.regenerate(&mut SessionRng::from_seed_u64(100));
        let second = generator
            .regenerate(&mut SessionRng::from_seed_u64(5))
            .cloned();

        let mut fresh = HeightfieldGenerator::new(GeneratorParams::default());
        fresh.attach_surface();
        let only = fresh.regenerate(&mut SessionRng::from_seed_u64(5)).cloned();
        assert_eq!(second, only);
    }

    #[test]
    fn zero_stamps_leave_black_raster() {
        let params = GeneratorParams {
            stamps: 0,
            ..GeneratorParams::default()
        };
        let mut generator = HeightfieldGenerator::new(params);
        generator.attach_surface();
        let raster = generator
            .regenerate(&mut SessionRng::from_seed_u64(4))
            .unwrap();
        assert_eq!(raster.stats().max, 0);
    }

    #[test]
    fn detach_drops_surface() {
        let mut generator = HeightfieldGenerator::default();
        generator.attach_surface();
        assert!(generator.has_surface());
        generator.detach_surface();
        assert!(generator.raster().is_none());
    }
}
