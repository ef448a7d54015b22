//! Heightfield generation: a 256x256 grey raster built from stamped radial
//! gradients, regenerated on a fixed timer.
//!
//! # Invariants
//! - Rasters are always exactly `RASTER_SIZE` x `RASTER_SIZE`.
//! - Each pass starts from a full clear; no state carries over between passes.
//! - All randomness comes from the caller's RNG.

mod generator;
mod gradient;
mod raster;
mod timer;

pub use generator::{GeneratorParams, HeightfieldGenerator};
pub use gradient::RadialGradient;
pub use raster::{HeightRaster, RASTER_SIZE, RasterStats};
pub use timer::RegenTimer;

pub fn crate_info() -> &'static str {
    "blockfield-heightmap v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("heightmap"));
    }
}
