/// Width and height of every height raster, in pixels.
pub const RASTER_SIZE: u32 = 256;

const CHANNELS: usize = 4;

/// Square grid of 8-bit intensities stored as RGBA pixels (R = G = B, A = 255).
///
/// The layout is row-major with row 0 at the top, which is the layout
/// `Queue::write_texture` expects for an `Rgba8Unorm` texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightRaster {
    pixels: Vec<u8>,
}

/// Summary of a raster's intensities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterStats {
    pub min: u8,
    pub max: u8,
    pub mean: f32,
}

impl Default for HeightRaster {
    fn default() -> Self {
        Self::new()
    }
}

impl HeightRaster {
    /// A black, fully opaque raster.
    pub fn new() -> Self {
        let mut raster = Self {
            pixels: vec![0; (RASTER_SIZE * RASTER_SIZE) as usize * CHANNELS],
        };
        raster.clear();
        raster
    }

    pub fn width(&self) -> u32 {
        RASTER_SIZE
    }

    pub fn height(&self) -> u32 {
        RASTER_SIZE
    }

    /// Bytes per row of the RGBA pixel buffer.
    pub fn bytes_per_row(&self) -> u32 {
        RASTER_SIZE * CHANNELS as u32
    }

    /// Reset every pixel to black.
    pub fn clear(&mut self) {
        for px in self.pixels.chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&[0, 0, 0, 255]);
        }
    }

    /// Intensity at `(x, y)`. Panics when out of bounds.
    pub fn intensity(&self, x: u32, y: u32) -> u8 {
        self.pixels[Self::offset(x, y)]
    }

    /// Write an intensity to all three colour channels.
    pub fn set_intensity(&mut self, x: u32, y: u32, value: u8) {
        let i = Self::offset(x, y);
        self.pixels[i..i + 3].fill(value);
    }

    /// Iterate intensities in row-major order.
    pub fn intensities(&self) -> impl Iterator<Item = u8> + '_ {
        self.pixels.chunks_exact(CHANNELS).map(|px| px[0])
    }

    /// Raw RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn stats(&self) -> RasterStats {
        let mut min = u8::MAX;
        let mut max = u8::MIN;
        let mut sum = 0u64;
        for v in self.intensities() {
            min = min.min(v);
            max = max.max(v);
            sum += v as u64;
        }
        RasterStats {
            min,
            max,
            mean: sum as f32 / (RASTER_SIZE * RASTER_SIZE) as f32,
        }
    }

    fn offset(x: u32, y: u32) -> usize {
        assert!(
            x < RASTER_SIZE && y < RASTER_SIZE,
            "pixel ({x}, {y}) outside raster"
        );
        (y * RASTER_SIZE + x) as usize * CHANNELS
    }
}
