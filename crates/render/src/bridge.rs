use std::sync::Arc;

use blockfield_heightmap::HeightRaster;
use glam::Vec2;

/// Identity of a published height texture. Every publish mints a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// Immutable snapshot of a raster, ready to be sampled or uploaded.
///
/// Clones share the same texel storage. Two handles refer to the same
/// texture exactly when their ids match.
#[derive(Debug, Clone)]
pub struct HeightTexture {
    id: TextureId,
    width: u32,
    height: u32,
    texels: Arc<[u8]>,
}

impl HeightTexture {
    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA8 texel bytes, row-major, row 0 first.
    pub fn texels(&self) -> &[u8] {
        &self.texels
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }

    /// True when both handles point at the same texel storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.texels, &other.texels)
    }

    /// Bilinear sample of the red channel at `uv`, normalised to `[0, 1]`.
    ///
    /// Mirrors a linear-filtered, clamp-to-edge GPU sampler.
    pub fn sample(&self, uv: Vec2) -> f32 {
        let uv = uv.clamp(Vec2::ZERO, Vec2::ONE);
        let x = (uv.x * self.width as f32 - 0.5).max(0.0);
        let y = (uv.y * self.height as f32 - 0.5).max(0.0);
        let x0 = (x.floor() as u32).min(self.width - 1);
        let y0 = (y.floor() as u32).min(self.height - 1);
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let top = self.red(x0, y0) * (1.0 - fx) + self.red(x1, y0) * fx;
        let bottom = self.red(x0, y1) * (1.0 - fx) + self.red(x1, y1) * fx;
        (top * (1.0 - fy) + bottom * fy) / 255.0
    }

    fn red(&self, x: u32, y: u32) -> f32 {
        self.texels[((y * self.width + x) * 4) as usize] as f32
    }
}

/// Turns rasters into published textures and tracks whether the GPU copy
/// is stale.
///
/// The bridge holds the single current texture. A publish replaces it and
/// marks it dirty; the GPU side takes the dirty texture, uploads it, and the
/// bridge is clean again until the next publish.
#[derive(Debug, Default)]
pub struct TextureBridge {
    current: Option<HeightTexture>,
    dirty: bool,
    next_id: u64,
}

impl TextureBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `raster` into a new texture, make it current and mark it dirty.
    pub fn publish(&mut self, raster: &HeightRaster) -> HeightTexture {
        self.next_id += 1;
        let texture = HeightTexture {
            id: TextureId(self.next_id),
            width: raster.width(),
            height: raster.height(),
            texels: Arc::from(raster.as_bytes()),
        };
        tracing::debug!(id = texture.id.0, "height texture published");
        self.current = Some(texture.clone());
        self.dirty = true;
        texture
    }

    /// Most recently published texture.
    pub fn current(&self) -> Option<&HeightTexture> {
        self.current.as_ref()
    }

    /// Whether the current texture still needs uploading.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Hand out the current texture for upload if it is dirty, marking it clean.
    pub fn take_dirty(&mut self) -> Option<HeightTexture> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        self.current.clone()
    }

    /// Forget the current texture (session teardown).
    pub fn clear(&mut self) {
        self.current = None;
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster_with(value: u8) -> HeightRaster {
        let mut r = HeightRaster::new();
        for y in 0..r.height() {
            for x in 0..r.width() {
                r.set_intensity(x, y, value);
            }
        }
        r
    }

    #[test]
    fn publish_marks_dirty_and_take_cleans() {
        let mut bridge = TextureBridge::new();
        assert!(bridge.current().is_none());
        assert!(bridge.take_dirty().is_none());

        let tex = bridge.publish(&HeightRaster::new());
        assert!(bridge.is_dirty());
        let taken = bridge.take_dirty().unwrap();
        assert_eq!(taken.id(), tex.id());
        assert!(!bridge.is_dirty());
        assert!(bridge.take_dirty().is_none());
    }

    #[test]
    fn each_publish_yields_a_new_texture() {
        let mut bridge = TextureBridge::new();
        let raster = HeightRaster::new();
        let a = bridge.publish(&raster);
        let b = bridge.publish(&raster);
        assert_ne!(a.id(), b.id());
        assert!(!a.ptr_eq(&b));
        assert_eq!(bridge.current().unwrap().id(), b.id());
    }

    #[test]
    fn published_texture_is_a_snapshot() {
        let mut bridge = TextureBridge::new();
        let mut raster = raster_with(10);
        let tex = bridge.publish(&raster);
        raster.set_intensity(0, 0, 250);
        assert_eq!(tex.texels()[0], 10);
        assert_eq!(tex.width(), 256);
        assert_eq!(tex.bytes_per_row(), 1024);
    }

    #[test]
    fn sample_normalises_intensity() {
        let mut bridge = TextureBridge::new();
        let tex = bridge.publish(&raster_with(255));
        assert_eq!(tex.sample(Vec2::new(0.5, 0.5)), 1.0);
        let tex = bridge.publish(&raster_with(0));
        assert_eq!(tex.sample(Vec2::new(0.25, 0.75)), 0.0);
    }

    #[test]
    fn sample_reads_the_addressed_texel() {
        let mut raster = HeightRaster::new();
        raster.set_intensity(0, 0, 255);
        let mut bridge = TextureBridge::new();
        let tex = bridge.publish(&raster);
        // Centre of texel (0, 0) and beyond the edge both clamp to it.
        assert_eq!(tex.sample(Vec2::new(0.5 / 256.0, 0.5 / 256.0)), 1.0);
        assert_eq!(tex.sample(Vec2::ZERO), 1.0);
        assert_eq!(tex.sample(Vec2::ONE), 0.0);
    }

    #[test]
    fn clear_forgets_texture() {
        let mut bridge = TextureBridge::new();
        bridge.publish(&HeightRaster::new());
        bridge.clear();
        assert!(bridge.current().is_none());
        assert!(!bridge.is_dirty());
    }
}
