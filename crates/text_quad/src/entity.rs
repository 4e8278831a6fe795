//! Text entity: the text-as-texture facade
//!
//! A [`TextEntity`] owns one texture and one quad mesh. Property mutators
//! re-rasterize the text and replace the texture image before returning, so
//! the GPU copy always matches the current text, font, size and color.
//! [`TextEntity::render`] draws the quad with the shape's current position,
//! extent and rotation.
//!
//! ```
//! use std::rc::Rc;
//! use text_quad::prelude::*;
//!
//! let ctx = Rc::new(HeadlessContext::new());
//! let mut text = TextEntity::with_config(
//!     Rc::clone(&ctx),
//!     HeadlessShader::new(),
//!     "Hello",
//!     Rect::new(Vec2::new(0.0, 0.0), Vec2::new(0.5, 0.25)),
//!     &TextConfig::default(),
//!     FontBook::empty(),
//! )?;
//!
//! text.set_color_rgb_f32(1.0, 0.5, 0.0)?;
//! text.shape_mut().rotate_by(0.1);
//! text.render();
//! assert!(ctx.is_unbound());
//! # Ok::<(), text_quad::TextError>(())
//! ```

use std::rc::Rc;

use crate::config::TextConfig;
use crate::error::{TextError, TextResult};
use crate::foundation::math::Vec2;
use crate::render::geometry::QuadMesh;
use crate::render::shader::{ShaderProgram, TRANSFORM_UNIFORM};
use crate::render::texture::TextTexture;
use crate::render::transform::model_matrix;
use crate::render::GraphicsContext;
use crate::shape::Rect;
use crate::text::{
    CanvasSize, Color, FontBook, GlyphRasterizer, PixelFormat, Raster, RasterRequest,
};

/// Properties that determine the raster
#[derive(Debug, Clone, PartialEq, Eq)]
struct TextStyle {
    content: String,
    font_family: String,
    font_size: u32,
    color: Color,
}

/// A string rendered as a textured, rotatable quad
///
/// The entity holds its graphics context through an `Rc`, which keeps it on
/// the thread that owns the context.
pub struct TextEntity<C: GraphicsContext, S: ShaderProgram> {
    ctx: Rc<C>,
    shader: S,
    style: TextStyle,
    shape: Rect,
    canvas: CanvasSize,
    pixel_format: PixelFormat,
    rasterizer: GlyphRasterizer,
    resolved_family: Option<String>,
    texture: TextTexture<C>,
    mesh: QuadMesh<C>,
}

impl<C: GraphicsContext, S: ShaderProgram> TextEntity<C, S> {
    /// Create a text entity with default styling
    ///
    /// Opaque black, 50px, "Arial", on a 500x500 canvas, using the fonts
    /// installed on this machine.
    pub fn new(
        ctx: Rc<C>,
        shader: S,
        text: impl Into<String>,
        position: Vec2,
        extent: Vec2,
    ) -> TextResult<Self> {
        Self::with_config(
            ctx,
            shader,
            text,
            Rect::new(position, extent),
            &TextConfig::default(),
            FontBook::system(),
        )
    }

    /// Create a text entity from explicit configuration and fonts
    ///
    /// The raster is produced before any GPU object is created, and GPU
    /// objects created before a failure are deleted again.
    pub fn with_config(
        ctx: Rc<C>,
        shader: S,
        text: impl Into<String>,
        shape: Rect,
        config: &TextConfig,
        fonts: FontBook,
    ) -> TextResult<Self> {
        config.validate()?;

        let style = TextStyle {
            content: text.into(),
            font_family: config.font_family.clone(),
            font_size: config.font_size,
            color: config.color,
        };
        let mut rasterizer = GlyphRasterizer::with_fallback(fonts, config.fallback_family.clone());
        let raster = rasterize(
            &mut rasterizer,
            &style,
            &shape,
            config.canvas,
            config.pixel_format,
        )?;

        let texture = TextTexture::new(&*ctx, config.canvas)?;
        let mesh = match QuadMesh::new(&*ctx, &shader, shape.position, shape.extent) {
            Ok(mesh) => mesh,
            Err(e) => {
                texture.release(&*ctx);
                return Err(e.into());
            }
        };

        let entity = Self {
            ctx,
            shader,
            resolved_family: raster.font_family().map(str::to_string),
            style,
            shape,
            canvas: config.canvas,
            pixel_format: config.pixel_format,
            rasterizer,
            texture,
            mesh,
        };
        // On failure the entity drops and deletes its GPU objects
        entity.texture.upload(&*entity.ctx, &raster)?;

        log::info!(
            "Created text entity {:?} ({} chars, {}px '{}')",
            entity.texture.handle(),
            entity.style.content.chars().count(),
            entity.style.font_size,
            entity.style.font_family
        );
        Ok(entity)
    }

    /// Replace the text
    pub fn set_text(&mut self, text: impl Into<String>) -> TextResult<()> {
        let text = text.into();
        self.update(|style| style.content = text)
    }

    /// Change the font size in pixels
    ///
    /// # Errors
    ///
    /// [`crate::TextError::InvalidArgument`] when `size` is negative; the
    /// previous size stays in effect.
    pub fn set_font_size(&mut self, size: i32) -> TextResult<()> {
        let size = u32::try_from(size).map_err(|_| {
            TextError::invalid(format!("font size must be non-negative, got {size}"))
        })?;
        self.update(|style| style.font_size = size)
    }

    /// Change the font family
    ///
    /// Unknown families silently fall back; see
    /// [`TextEntity::resolved_font_family`] for the face actually used.
    pub fn set_font(&mut self, family: impl Into<String>) -> TextResult<()> {
        let family = family.into();
        self.update(|style| style.font_family = family)
    }

    /// Change the color
    pub fn set_color(&mut self, color: Color) -> TextResult<()> {
        self.update(|style| style.color = color)
    }

    /// Change the color from normalized RGB floats; alpha becomes opaque
    pub fn set_color_rgb_f32(&mut self, r: f32, g: f32, b: f32) -> TextResult<()> {
        self.set_color(Color::from_rgb_f32(r, g, b)?)
    }

    /// Change the color from normalized ARGB floats
    pub fn set_color_argb_f32(&mut self, a: f32, r: f32, g: f32, b: f32) -> TextResult<()> {
        self.set_color(Color::from_argb_f32(a, r, g, b)?)
    }

    /// Change the color from RGB bytes; alpha becomes opaque
    pub fn set_color_rgb(&mut self, r: i32, g: i32, b: i32) -> TextResult<()> {
        self.set_color(Color::from_rgb(r, g, b)?)
    }

    /// Change the color from ARGB bytes
    pub fn set_color_argb(&mut self, a: i32, r: i32, g: i32, b: i32) -> TextResult<()> {
        self.set_color(Color::from_argb(a, r, g, b)?)
    }

    /// Scale the shape's position and extent; the raster is left alone
    pub fn scale(&mut self, factor: f32) {
        self.shape.scale(factor);
    }

    /// Draw the quad
    ///
    /// Call once per frame after the shape is final for that frame. Leaves no
    /// texture, vertex array or buffer bound.
    pub fn render(&mut self) {
        let ctx = &*self.ctx;
        self.shader.activate();

        let _texture = self.texture.bind(ctx);
        self.mesh.sync(ctx, self.shape.position, self.shape.extent);

        let transform = model_matrix(self.shape.position, self.shape.extent, self.shape.rotation);
        self.shader.set_matrix4(TRANSFORM_UNIFORM, &transform);

        self.mesh.draw(ctx);
    }

    /// Current text
    pub fn text(&self) -> &str {
        &self.style.content
    }

    /// Current font size in pixels
    pub const fn font_size(&self) -> u32 {
        self.style.font_size
    }

    /// Requested font family
    pub fn font_family(&self) -> &str {
        &self.style.font_family
    }

    /// Family that actually drew the glyphs, `None` if no font was available
    pub fn resolved_font_family(&self) -> Option<&str> {
        self.resolved_family.as_deref()
    }

    /// Current color
    pub const fn color(&self) -> Color {
        self.style.color
    }

    /// The rectangle the text is drawn onto
    pub const fn shape(&self) -> &Rect {
        &self.shape
    }

    /// Mutable access to the rectangle, e.g. to animate rotation
    pub fn shape_mut(&mut self) -> &mut Rect {
        &mut self.shape
    }

    /// Raster and texture dimensions
    pub const fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Texture handle
    pub fn texture(&self) -> C::Texture {
        self.texture.handle()
    }

    /// GPU quad
    pub const fn mesh(&self) -> &QuadMesh<C> {
        &self.mesh
    }

    /// Shader program used for drawing
    pub const fn shader(&self) -> &S {
        &self.shader
    }

    /// Produce the raster for the current properties without uploading it
    pub fn raster(&mut self) -> TextResult<Raster> {
        rasterize(
            &mut self.rasterizer,
            &self.style,
            &self.shape,
            self.canvas,
            self.pixel_format,
        )
    }

    /// Apply `edit` to a copy of the style, re-rasterize and upload, and only
    /// then commit; a failure leaves the entity unchanged
    fn update(&mut self, edit: impl FnOnce(&mut TextStyle)) -> TextResult<()> {
        let mut next = self.style.clone();
        edit(&mut next);

        let raster = rasterize(
            &mut self.rasterizer,
            &next,
            &self.shape,
            self.canvas,
            self.pixel_format,
        )?;
        self.texture.upload(&*self.ctx, &raster)?;

        self.style = next;
        self.resolved_family = raster.font_family().map(str::to_string);
        Ok(())
    }
}

impl<C: GraphicsContext, S: ShaderProgram> Drop for TextEntity<C, S> {
    fn drop(&mut self) {
        self.mesh.release(&*self.ctx);
        self.texture.release(&*self.ctx);
    }
}

fn rasterize(
    rasterizer: &mut GlyphRasterizer,
    style: &TextStyle,
    shape: &Rect,
    canvas: CanvasSize,
    format: PixelFormat,
) -> TextResult<Raster> {
    rasterizer.rasterize(&RasterRequest {
        text: &style.content,
        font_family: &style.font_family,
        font_size: i32::try_from(style.font_size).unwrap_or(i32::MAX),
        color: style.color,
        anchor: shape.position,
        canvas,
        format,
    })
}
