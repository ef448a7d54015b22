use glam::Vec2;

use crate::raster::{HeightRaster, RASTER_SIZE};

/// Concentric radial gradient from an opaque grey at `inner_radius` to fully
/// transparent at `outer_radius`.
///
/// Inside the inner circle the first stop is padded; outside the outer circle
/// the gradient is transparent. Colours are interpolated premultiplied, so at
/// parameter `t` the source alpha is `1 - t` and the premultiplied value is
/// `intensity * (1 - t)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub intensity: u8,
}

impl RadialGradient {
    /// Source alpha at a point.
    pub fn alpha_at(&self, point: Vec2) -> f32 {
        let d = point.distance(self.center);
        if d >= self.outer_radius {
            return 0.0;
        }
        let span = self.outer_radius - self.inner_radius;
        let t = ((d - self.inner_radius) / span).clamp(0.0, 1.0);
        1.0 - t
    }

    /// Composite this gradient onto `raster` with source-over blending.
    ///
    /// Only the bounding box of the outer circle is visited. Pixels are
    /// sampled at their centres.
    pub fn composite_onto(&self, raster: &mut HeightRaster) {
        let max = RASTER_SIZE as f32 - 1.0;
        let x0 = (self.center.x - self.outer_radius).floor().clamp(0.0, max) as u32;
        let x1 = (self.center.x + self.outer_radius).ceil().clamp(0.0, max) as u32;
        let y0 = (self.center.y - self.outer_radius).floor().clamp(0.0, max) as u32;
        let y1 = (self.center.y + self.outer_radius).ceil().clamp(0.0, max) as u32;

        let src = self.intensity as f32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let alpha = self.alpha_at(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if alpha <= 0.0 {
                    continue;
                }
                let dst = raster.intensity(x, y) as f32;
                let out = src * alpha + dst * (1.0 - alpha);
                raster.set_intensity(x, y, out.round().clamp(0.0, 255.0) as u8);
            }
        }
    }
}
