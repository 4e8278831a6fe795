//! CPU-side pixel buffers produced by the glyph rasterizer

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::render::{RenderError, RenderResult};

/// Byte order of the four channels in each texel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// Red, green, blue, alpha
    #[default]
    Rgba,
    /// Blue, green, red, alpha
    Bgra,
}

impl PixelFormat {
    /// Arrange RGBA channels into this format's byte order
    pub const fn encode(self, [r, g, b, a]: [u8; 4]) -> [u8; 4] {
        match self {
            Self::Rgba => [r, g, b, a],
            Self::Bgra => [b, g, r, a],
        }
    }

    /// Recover RGBA channels from a texel in this format
    pub const fn decode(self, texel: [u8; 4]) -> [u8; 4] {
        // The swizzle is its own inverse
        self.encode(texel)
    }
}

/// Fixed pixel dimensions of a raster and the texture it is uploaded to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
}

impl CanvasSize {
    /// Canonical canvas used when nothing else is configured
    pub const DEFAULT: Self = Self::new(500, 500);

    /// Create a canvas size
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of texels
    pub const fn texel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of bytes at four bytes per texel
    pub const fn byte_len(self) -> usize {
        self.texel_count() * 4
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A canvas-sized grid of 8-bit four-channel texels, row-major, top row first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    size: CanvasSize,
    format: PixelFormat,
    pixels: Vec<u8>,
    font_family: Option<String>,
}

impl Raster {
    /// A fully transparent raster
    pub fn transparent(size: CanvasSize, format: PixelFormat) -> Self {
        Self {
            size,
            format,
            pixels: vec![0; size.byte_len()],
            font_family: None,
        }
    }

    pub(crate) fn set_font_family(&mut self, family: Option<String>) {
        self.font_family = family;
    }

    /// Canvas dimensions
    pub const fn size(&self) -> CanvasSize {
        self.size
    }

    /// Channel order of [`Raster::pixels`]
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw texel bytes in [`Raster::format`] order
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Family name of the face that drew the glyphs
    ///
    /// `None` when no face could be resolved and the raster is blank.
    pub fn font_family(&self) -> Option<&str> {
        self.font_family.as_deref()
    }

    /// Texel at `(x, y)` in RGBA order, `None` outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = self.offset(x, y);
        let texel = [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ];
        Some(self.format.decode(texel))
    }

    /// Overwrite the texel at `(x, y)` from RGBA channels; out-of-canvas writes are dropped
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.size.width || y >= self.size.height {
            return;
        }
        let i = self.offset(x, y);
        self.pixels[i..i + 4].copy_from_slice(&self.format.encode(rgba));
    }

    /// Write the texel at `(x, y)` unless it already holds a higher alpha
    ///
    /// Used for glyph coverage, where neighbouring glyph boxes overlap and a
    /// faint edge must not erase a solid stem.
    pub fn cover_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.size.width || y >= self.size.height {
            return;
        }
        let i = self.offset(x, y);
        if self.pixels[i + 3] < rgba[3] {
            self.pixels[i..i + 4].copy_from_slice(&self.format.encode(rgba));
        }
    }

    /// Whether every texel has zero alpha
    pub fn is_transparent(&self) -> bool {
        self.pixels.chunks_exact(4).all(|texel| texel[3] == 0)
    }

    /// Number of texels with non-zero alpha
    pub fn covered_texels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|texel| texel[3] != 0).count()
    }

    /// Copy of this raster with channels rearranged to `format`
    pub fn to_format(&self, format: PixelFormat) -> Self {
        if format == self.format {
            return self.clone();
        }
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for texel in self.pixels.chunks_exact(4) {
            let rgba = self.format.decode([texel[0], texel[1], texel[2], texel[3]]);
            pixels.extend_from_slice(&format.encode(rgba));
        }
        Self {
            size: self.size,
            format,
            pixels,
            font_family: self.font_family.clone(),
        }
    }

    /// Write the raster to a PNG file for debugging
    pub fn save_png(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let rgba = self.to_format(PixelFormat::Rgba);
        let image = image::RgbaImage::from_raw(self.size.width, self.size.height, rgba.pixels)
            .ok_or_else(|| RenderError::RenderingFailed("raster size mismatch".to_string()))?;
        image
            .save(path.as_ref())
            .map_err(|e| RenderError::RenderingFailed(format!("failed to save raster: {e}")))
    }

    const fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.size.width as usize + x as usize) * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparent_raster_dimensions() {
        let raster = Raster::transparent(CanvasSize::new(8, 4), PixelFormat::Rgba);
        assert_eq!(raster.pixels().len(), 8 * 4 * 4);
        assert!(raster.is_transparent());
        assert_eq!(raster.pixel(8, 0), None);
        assert_eq!(raster.pixel(7, 3), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_cover_keeps_stronger_alpha() {
        let mut raster = Raster::transparent(CanvasSize::new(2, 1), PixelFormat::Bgra);
        raster.cover_pixel(0, 0, [1, 2, 3, 200]);
        raster.cover_pixel(0, 0, [9, 9, 9, 40]);
        assert_eq!(raster.pixel(0, 0), Some([1, 2, 3, 200]));

        raster.cover_pixel(0, 0, [4, 5, 6, 255]);
        assert_eq!(raster.pixel(0, 0), Some([4, 5, 6, 255]));

        raster.cover_pixel(5, 0, [1, 1, 1, 255]);
        assert_eq!(raster.pixel(1, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_bgra_storage_order() {
        let mut raster = Raster::transparent(CanvasSize::new(2, 2), PixelFormat::Bgra);
        raster.put_pixel(1, 0, [10, 20, 30, 40]);

        assert_eq!(&raster.pixels()[4..8], &[30, 20, 10, 40]);
        assert_eq!(raster.pixel(1, 0), Some([10, 20, 30, 40]));
        assert_eq!(raster.covered_texels(), 1);

        let rgba = raster.to_format(PixelFormat::Rgba);
        assert_eq!(&rgba.pixels()[4..8], &[10, 20, 30, 40]);
    }

    #[test]
    fn test_out_of_canvas_writes_are_clipped() {
        let mut raster = Raster::transparent(CanvasSize::new(2, 2), PixelFormat::Rgba);
        raster.put_pixel(2, 0, [255; 4]);
        raster.put_pixel(0, 5, [255; 4]);
        assert!(raster.is_transparent());
    }

    #[test]
    fn test_save_png() {
        let mut raster = Raster::transparent(CanvasSize::new(4, 4), PixelFormat::Rgba);
        raster.put_pixel(1, 1, [255, 0, 0, 255]);

        let path = std::env::temp_dir().join("text_quad_raster_test.png");
        raster.save_png(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.get_pixel(1, 1).0, [255, 0, 0, 255]);
        let _ = std::fs::remove_file(&path);
    }
}
