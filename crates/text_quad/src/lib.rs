//! # Text Quad
//!
//! Renders a string of text as a textured, rotatable quad.
//!
//! ## Features
//!
//! - **Text as texture**: text is rasterized on the CPU with `fontdue` into a
//!   fixed-size canvas and uploaded as one RGBA texture
//! - **Property mutators**: text, font family, size and color changes
//!   re-rasterize immediately, so the GPU copy is never stale
//! - **Rotation about the center**: the quad spins in place around the middle
//!   of its rectangle
//! - **Backend seam**: an OpenGL-style [`GraphicsContext`] trait with a `glow`
//!   implementation (feature `opengl`) and a recording [`HeadlessContext`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use text_quad::prelude::*;
//!
//! # fn run(ctx: Rc<HeadlessContext>, shader: HeadlessShader) -> TextResult<()> {
//! let mut text = TextEntity::new(
//!     ctx,
//!     shader,
//!     "Hello",
//!     Vec2::new(-0.5, -0.25),
//!     Vec2::new(1.0, 0.5),
//! )?;
//! text.set_color_rgb(200, 30, 30)?;
//!
//! loop {
//!     text.shape_mut().rotate_by(0.01);
//!     text.render();
//! }
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod entity;
pub mod error;
pub mod foundation;
pub mod render;
pub mod shape;
pub mod text;

pub use config::{Config, ConfigError, TextConfig};
pub use entity::TextEntity;
pub use error::{TextError, TextResult};
pub use render::{GraphicsContext, HeadlessContext, HeadlessShader, RenderError, ShaderConfig, ShaderProgram};
pub use shape::Rect;
pub use text::{CanvasSize, Color, FontBook, PixelFormat, Raster};

#[cfg(feature = "opengl")]
pub use render::opengl::{GlowContext, GlowShader};

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{Config, TextConfig},
        foundation::math::{Mat4, Vec2},
        render::{GraphicsContext, HeadlessContext, HeadlessShader, ShaderConfig, ShaderProgram},
        shape::Rect,
        text::{CanvasSize, Color, FontBook, PixelFormat},
        TextEntity, TextError, TextResult,
    };

    #[cfg(feature = "opengl")]
    pub use crate::render::opengl::{GlowContext, GlowShader};
}
