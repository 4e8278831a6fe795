//! Text rasterization
//!
//! Font lookup, colors, and the off-screen glyph raster that becomes the
//! texture of a text quad.

pub mod color;
pub mod font_book;
pub mod raster;
pub mod rasterizer;

pub use color::Color;
pub use font_book::{FontBook, LoadedFont};
pub use raster::{CanvasSize, PixelFormat, Raster};
pub use rasterizer::{GlyphRasterizer, RasterRequest, DEFAULT_FALLBACK_FAMILY};
