//! Text color with validated constructors
//!
//! Colors are stored as straight-alpha RGBA bytes. Callers may supply them in
//! normalized float form (`[0, 1]` per channel) or byte form (`[0, 255]`),
//! with or without an explicit alpha. Byte-form constructors accept `i32` so
//! out-of-range input is reported instead of silently wrapping.

use serde::{Deserialize, Serialize};

use crate::error::{TextError, TextResult};

/// RGBA color with 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel (255 = opaque)
    pub a: u8,
}

impl Color {
    /// Opaque black, the default text color
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);

    /// Opaque white
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Fully transparent black
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Build a color from raw bytes
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from normalized float channels
    ///
    /// Each channel must lie in `[0, 1]`; the stored byte is
    /// `round(channel * 255)`.
    pub fn from_rgb_f32(r: f32, g: f32, b: f32) -> TextResult<Self> {
        Self::from_argb_f32(1.0, r, g, b)
    }

    /// Color with alpha from normalized float channels, alpha first
    pub fn from_argb_f32(a: f32, r: f32, g: f32, b: f32) -> TextResult<Self> {
        Ok(Self {
            r: unit_to_byte("red", r)?,
            g: unit_to_byte("green", g)?,
            b: unit_to_byte("blue", b)?,
            a: unit_to_byte("alpha", a)?,
        })
    }

    /// Opaque color from byte channels in `[0, 255]`
    pub fn from_rgb(r: i32, g: i32, b: i32) -> TextResult<Self> {
        Self::from_argb(255, r, g, b)
    }

    /// Color with alpha from byte channels in `[0, 255]`, alpha first
    pub fn from_argb(a: i32, r: i32, g: i32, b: i32) -> TextResult<Self> {
        Ok(Self {
            r: int_to_byte("red", r)?,
            g: int_to_byte("green", g)?,
            b: int_to_byte("blue", b)?,
            a: int_to_byte("alpha", a)?,
        })
    }

    /// Channels in RGBA order
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::rgba(r, g, b, a)
    }
}

fn unit_to_byte(channel: &str, value: f32) -> TextResult<u8> {
    // NaN fails the range check too
    if !(0.0..=1.0).contains(&value) {
        return Err(TextError::invalid(format!(
            "{channel} channel {value} is outside [0, 1]"
        )));
    }
    Ok((value * 255.0).round() as u8)
}

fn int_to_byte(channel: &str, value: i32) -> TextResult<u8> {
    u8::try_from(value).map_err(|_| {
        TextError::invalid(format!("{channel} channel {value} is outside [0, 255]"))
    })
}
