//! Defaults for new text entities

use serde::{Deserialize, Serialize};

use crate::text::{CanvasSize, Color, PixelFormat, DEFAULT_FALLBACK_FAMILY};

use super::{Config, ConfigError};

/// Construction-time settings for a text entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Initial font size in pixels
    pub font_size: u32,
    /// Initial font family
    pub font_family: String,
    /// Family substituted for missing ones
    pub fallback_family: String,
    /// Channel order of rasters handed to the GPU
    pub pixel_format: PixelFormat,
    /// Raster and texture dimensions
    pub canvas: CanvasSize,
    /// Initial text color
    pub color: Color,
}

impl TextConfig {
    /// Set the canvas dimensions
    pub fn with_canvas(mut self, width: u32, height: u32) -> Self {
        self.canvas = CanvasSize::new(width, height);
        self
    }

    /// Set the initial font size
    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Set the initial font family
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Set the initial color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the raster channel order
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }

    /// Check values that deserialization alone cannot rule out
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        if self.font_size > i32::MAX as u32 {
            return Err(ConfigError::Invalid(format!(
                "font size {} is too large",
                self.font_size
            )));
        }
        if self.fallback_family.trim().is_empty() {
            return Err(ConfigError::Invalid("fallback family is empty".to_string()));
        }
        Ok(())
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_size: 50,
            font_family: DEFAULT_FALLBACK_FAMILY.to_string(),
            fallback_family: DEFAULT_FALLBACK_FAMILY.to_string(),
            pixel_format: PixelFormat::Rgba,
            canvas: CanvasSize::DEFAULT,
            color: Color::BLACK,
        }
    }
}

impl Config for TextConfig {}
