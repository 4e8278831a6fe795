//! Glyph rasterizer
//!
//! Renders a single line of text into a fixed-size canvas using `fontdue` for
//! glyph coverage and a [`FontBook`] for family lookup. This module never
//! touches the GPU; the output is a plain [`Raster`].

use std::collections::HashMap;

use crate::error::{TextError, TextResult};
use crate::foundation::math::Vec2;

use super::color::Color;
use super::font_book::{FontBook, LoadedFont};
use super::raster::{CanvasSize, PixelFormat, Raster};

/// Family substituted when a requested family is not installed
pub const DEFAULT_FALLBACK_FAMILY: &str = "Arial";

/// Everything that determines the content of a raster
#[derive(Debug, Clone, Copy)]
pub struct RasterRequest<'a> {
    /// Text to draw on a single line
    pub text: &'a str,
    /// Requested font family name
    pub font_family: &'a str,
    /// Font size in pixels; negative sizes are rejected
    pub font_size: i32,
    /// Glyph color; coverage scales its alpha
    pub color: Color,
    /// Top-left of the line box in raster coordinates (y down)
    pub anchor: Vec2,
    /// Output dimensions
    pub canvas: CanvasSize,
    /// Output channel order
    pub format: PixelFormat,
}

/// Turns text into canvas-sized pixel buffers
///
/// Resolved faces are cached per requested family name, so repeated
/// rasterization with the same family only parses the font once.
pub struct GlyphRasterizer {
    fonts: FontBook,
    fallback_family: String,
    cache: HashMap<String, Option<LoadedFont>>,
}

impl GlyphRasterizer {
    /// Create a rasterizer over `fonts` with the default fallback family
    pub fn new(fonts: FontBook) -> Self {
        Self::with_fallback(fonts, DEFAULT_FALLBACK_FAMILY)
    }

    /// Create a rasterizer with a custom fallback family
    pub fn with_fallback(fonts: FontBook, fallback_family: impl Into<String>) -> Self {
        Self {
            fonts,
            fallback_family: fallback_family.into(),
            cache: HashMap::new(),
        }
    }

    /// Family tried when a requested family is missing
    pub fn fallback_family(&self) -> &str {
        &self.fallback_family
    }

    /// Font registry backing this rasterizer
    pub const fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Render `request` into a fresh raster
    ///
    /// # Errors
    ///
    /// Returns [`TextError::InvalidArgument`] when `font_size` is negative.
    /// A missing font family is not an error: the fallback family is used,
    /// then any available face, and if nothing resolves the raster is left
    /// fully transparent.
    pub fn rasterize(&mut self, request: &RasterRequest<'_>) -> TextResult<Raster> {
        let px = u32::try_from(request.font_size).map_err(|_| {
            TextError::invalid(format!(
                "font size must be non-negative, got {}",
                request.font_size
            ))
        })?;

        let mut raster = Raster::transparent(request.canvas, request.format);

        let Some(loaded) = self.resolve(request.font_family) else {
            log::warn!(
                "No font face available for '{}'; rendering blank text",
                request.font_family
            );
            return Ok(raster);
        };
        raster.set_font_family(Some(loaded.family.clone()));

        if px == 0 || request.text.is_empty() {
            return Ok(raster);
        }

        draw_line(&mut raster, &loaded.font, px as f32, request);

        log::debug!(
            "Rasterized {} chars at {}px with '{}' into {}x{} canvas",
            request.text.chars().count(),
            px,
            loaded.family,
            request.canvas.width,
            request.canvas.height
        );
        Ok(raster)
    }

    /// Family that `requested` currently resolves to, if any
    pub fn resolved_family(&mut self, requested: &str) -> Option<String> {
        self.resolve(requested).map(|loaded| loaded.family.clone())
    }

    fn resolve(&mut self, requested: &str) -> Option<&LoadedFont> {
        if !self.cache.contains_key(requested) {
            let loaded = self.lookup(requested);
            self.cache.insert(requested.to_string(), loaded);
        }
        self.cache.get(requested).and_then(Option::as_ref)
    }

    fn lookup(&self, requested: &str) -> Option<LoadedFont> {
        if let Some(font) = self.fonts.load(requested) {
            return Some(font);
        }

        let substitute = self
            .fonts
            .load(&self.fallback_family)
            .or_else(|| self.fonts.load_any());
        if let Some(font) = &substitute {
            log::warn!(
                "Font family '{}' not found, substituting '{}'",
                requested,
                font.family
            );
        }
        substitute
    }
}

impl std::fmt::Debug for GlyphRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphRasterizer")
            .field("fonts", &self.fonts)
            .field("fallback_family", &self.fallback_family)
            .field("cached_families", &self.cache.len())
            .finish()
    }
}

/// Smallest coverage buffer a single glyph may use, in texels
const MIN_GLYPH_BUDGET: usize = 64 * 64;

/// Draw `request.text` on one line, clipping anything off-canvas
///
/// Glyph boxes come from `Font::metrics`, which allocates nothing. Glyphs
/// that miss the canvas are skipped. A glyph whose coverage would exceed a
/// canvas-sized buffer is rasterized at a reduced size and stretched back
/// over its full box, so memory stays bounded for any font size.
fn draw_line(raster: &mut Raster, font: &fontdue::Font, px: f32, request: &RasterRequest<'_>) {
    let canvas = request.canvas;
    let budget = canvas.texel_count().max(MIN_GLYPH_BUDGET);
    let ascent = font
        .horizontal_line_metrics(px)
        .map_or(px, |metrics| metrics.ascent);
    let baseline = request.anchor.y + ascent;
    let mut pen_x = request.anchor.x;
    let color = request.color;

    for ch in request.text.chars().filter(|c| !c.is_control()) {
        let metrics = font.metrics(ch, px);
        let left = pen_x.round() as i64 + i64::from(metrics.xmin);
        let top = baseline.round() as i64 - (i64::from(metrics.ymin) + metrics.height as i64);
        pen_x += metrics.advance_width;

        let x0 = left.max(0);
        let x1 = left
            .saturating_add(metrics.width as i64)
            .min(i64::from(canvas.width));
        let y0 = top.max(0);
        let y1 = top
            .saturating_add(metrics.height as i64)
            .min(i64::from(canvas.height));
        if x0 >= x1 || y0 >= y1 {
            continue;
        }

        let coverage = GlyphCoverage::new(font, ch, px, &metrics, budget);
        if coverage.is_empty() {
            continue;
        }

        for y in y0..y1 {
            let row = (y - top) as usize;
            for x in x0..x1 {
                let col = (x - left) as usize;
                let alpha = coverage.sample(col, row, &metrics);
                if alpha == 0 {
                    continue;
                }
                let a = (u16::from(color.a) * u16::from(alpha) + 127) / 255;
                raster.cover_pixel(x as u32, y as u32, [color.r, color.g, color.b, a as u8]);
            }
        }
    }
}

/// Coverage bitmap of one glyph, possibly at a lower resolution than its box
struct GlyphCoverage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GlyphCoverage {
    fn new(font: &fontdue::Font, ch: char, px: f32, full: &fontdue::Metrics, budget: usize) -> Self {
        let area = full.width.saturating_mul(full.height);
        let size = if area <= budget {
            px
        } else {
            let shrink = (budget as f64 / area as f64).sqrt();
            log::debug!(
                "Glyph {:?} at {}px needs {} texels, rasterizing at {:.1}px",
                ch,
                px,
                area,
                f64::from(px) * shrink
            );
            (f64::from(px) * shrink) as f32
        };
        let (metrics, data) = font.rasterize(ch, size);
        Self {
            width: metrics.width,
            height: metrics.height,
            data,
        }
    }

    fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Coverage at `(col, row)` of the full-size box described by `full`
    fn sample(&self, col: usize, row: usize, full: &fontdue::Metrics) -> u8 {
        let src_col = (col * self.width / full.width).min(self.width - 1);
        let src_row = (row * self.height / full.height).min(self.height - 1);
        self.data[src_row * self.width + src_col]
    }
}
