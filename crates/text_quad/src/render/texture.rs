//! Texture manager for a single text raster
//!
//! The texture store is allocated once at canvas size; afterwards every
//! property change replaces the whole image in place. Glyph changes are not
//! local, so there is no partial update path.

use crate::text::{CanvasSize, Raster};

use super::binding::TextureBinding;
use super::context::GraphicsContext;
use super::{RenderError, RenderResult};

/// One canvas-sized RGBA8 texture owned by a text entity
#[derive(Debug)]
pub struct TextTexture<C: GraphicsContext> {
    texture: C::Texture,
    canvas: CanvasSize,
}

impl<C: GraphicsContext> TextTexture<C> {
    /// Create the texture and allocate its storage
    ///
    /// Sets linear filtering and enables standard alpha blending. The texture
    /// is left unbound.
    pub fn new(ctx: &C, canvas: CanvasSize) -> RenderResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(RenderError::ResourceCreationFailed(format!(
                "texture canvas must be non-empty, got {}x{}",
                canvas.width, canvas.height
            )));
        }

        let texture = ctx.create_texture()?;
        {
            let _bound = TextureBinding::new(ctx, texture);
            ctx.set_linear_filtering();
            ctx.allocate_texture_storage(canvas.width, canvas.height);
        }
        ctx.enable_alpha_blending();

        log::info!(
            "Created text texture {:?} ({}x{})",
            texture,
            canvas.width,
            canvas.height
        );
        Ok(Self { texture, canvas })
    }

    /// Replace the full image with `raster`
    ///
    /// # Errors
    ///
    /// Fails without touching the GPU when the raster's dimensions differ
    /// from the allocated canvas; the store is never resized.
    pub fn upload(&self, ctx: &C, raster: &Raster) -> RenderResult<()> {
        if raster.size() != self.canvas {
            return Err(RenderError::RenderingFailed(format!(
                "raster is {}x{} but texture is {}x{}",
                raster.size().width,
                raster.size().height,
                self.canvas.width,
                self.canvas.height
            )));
        }

        let _bound = TextureBinding::new(ctx, self.texture);
        ctx.upload_texture_pixels(
            self.canvas.width,
            self.canvas.height,
            raster.format(),
            raster.pixels(),
        );
        log::debug!("Uploaded {} bytes to texture {:?}", raster.pixels().len(), self.texture);
        Ok(())
    }

    /// Bind the texture for the lifetime of the returned guard
    pub fn bind<'a>(&self, ctx: &'a C) -> TextureBinding<'a, C> {
        TextureBinding::new(ctx, self.texture)
    }

    /// Underlying texture handle
    pub fn handle(&self) -> C::Texture {
        self.texture
    }

    /// Allocated dimensions
    pub const fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Delete the GPU texture
    pub fn release(&self, ctx: &C) {
        ctx.delete_texture(self.texture);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::{GlCall, HeadlessContext};
    use crate::text::PixelFormat;

    #[test]
    fn test_initialize_leaves_texture_unbound() {
        let ctx = HeadlessContext::new();
        let texture = TextTexture::new(&ctx, CanvasSize::new(4, 2)).unwrap();

        assert_eq!(ctx.bound_texture(), None);
        assert!(ctx.blending_enabled());
        assert!(ctx.texture_is_linear(texture.handle()));
        assert_eq!(ctx.texture_size(texture.handle()), Some((4, 2)));
        assert!(ctx.take_errors().is_empty());
    }

    #[test]
    fn test_upload_is_scoped_full_replace() {
        let ctx = HeadlessContext::new();
        let texture = TextTexture::new(&ctx, CanvasSize::new(2, 2)).unwrap();
        let mut raster = Raster::transparent(CanvasSize::new(2, 2), PixelFormat::Rgba);
        raster.put_pixel(0, 1, [1, 2, 3, 4]);

        ctx.clear_calls();
        texture.upload(&ctx, &raster).unwrap();

        assert_eq!(
            ctx.calls(),
            vec![
                GlCall::BindTexture(Some(texture.handle())),
                GlCall::UploadTexturePixels {
                    width: 2,
                    height: 2,
                    format: PixelFormat::Rgba,
                },
                GlCall::BindTexture(None),
            ]
        );
        assert_eq!(ctx.texture_pixels(texture.handle()).unwrap(), raster.pixels());
    }

    #[test]
    fn test_mismatched_raster_rejected_before_gpu_work() {
        let ctx = HeadlessContext::new();
        let texture = TextTexture::new(&ctx, CanvasSize::new(2, 2)).unwrap();
        let raster = Raster::transparent(CanvasSize::new(3, 3), PixelFormat::Rgba);

        ctx.clear_calls();
        assert!(texture.upload(&ctx, &raster).is_err());
        assert!(ctx.calls().is_empty());
    }

    #[test]
    fn test_empty_canvas_rejected() {
        let ctx = HeadlessContext::new();
        assert!(TextTexture::new(&ctx, CanvasSize::new(0, 10)).is_err());
        assert_eq!(ctx.live_textures(), 0);
    }

    #[test]
    fn test_release_deletes_texture() {
        let ctx = HeadlessContext::new();
        let texture = TextTexture::new(&ctx, CanvasSize::DEFAULT).unwrap();
        texture.release(&ctx);
        assert_eq!(ctx.live_textures(), 0);
    }
}
