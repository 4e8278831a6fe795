//! Scoped bindings
//!
//! Each guard binds on construction and unbinds when dropped, so the context
//! is returned to its unbound state on every exit path, early returns and
//! `?` included.

use super::context::{BufferTarget, GraphicsContext};

/// Keeps a texture bound for the guard's lifetime
#[must_use = "the texture is unbound as soon as the guard is dropped"]
pub struct TextureBinding<'a, C: GraphicsContext> {
    ctx: &'a C,
}

impl<'a, C: GraphicsContext> TextureBinding<'a, C> {
    /// Bind `texture`
    pub fn new(ctx: &'a C, texture: C::Texture) -> Self {
        ctx.bind_texture(Some(texture));
        Self { ctx }
    }
}

impl<C: GraphicsContext> Drop for TextureBinding<'_, C> {
    fn drop(&mut self) {
        self.ctx.bind_texture(None);
    }
}

/// Keeps a vertex array bound for the guard's lifetime
#[must_use = "the vertex array is unbound as soon as the guard is dropped"]
pub struct VertexArrayBinding<'a, C: GraphicsContext> {
    ctx: &'a C,
}

impl<'a, C: GraphicsContext> VertexArrayBinding<'a, C> {
    /// Bind `vertex_array`
    pub fn new(ctx: &'a C, vertex_array: C::VertexArray) -> Self {
        ctx.bind_vertex_array(Some(vertex_array));
        Self { ctx }
    }
}

impl<C: GraphicsContext> Drop for VertexArrayBinding<'_, C> {
    fn drop(&mut self) {
        self.ctx.bind_vertex_array(None);
    }
}

/// Keeps a buffer bound to one target for the guard's lifetime
#[must_use = "the buffer is unbound as soon as the guard is dropped"]
pub struct BufferBinding<'a, C: GraphicsContext> {
    ctx: &'a C,
    target: BufferTarget,
}

impl<'a, C: GraphicsContext> BufferBinding<'a, C> {
    /// Bind `buffer` to `target`
    pub fn new(ctx: &'a C, target: BufferTarget, buffer: C::Buffer) -> Self {
        ctx.bind_buffer(target, Some(buffer));
        Self { ctx, target }
    }

    /// Replace the bound buffer's contents
    pub fn data(&self, bytes: &[u8]) {
        self.ctx.buffer_data(self.target, bytes);
    }
}

impl<C: GraphicsContext> Drop for BufferBinding<'_, C> {
    fn drop(&mut self) {
        self.ctx.bind_buffer(self.target, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::{GlCall, HeadlessContext};

    #[test]
    fn test_texture_guard_unbinds_on_drop() {
        let ctx = HeadlessContext::new();
        let texture = ctx.create_texture().unwrap();
        {
            let _bound = TextureBinding::new(&ctx, texture);
            assert_eq!(ctx.bound_texture(), Some(texture));
        }
        assert_eq!(ctx.bound_texture(), None);
    }

    #[test]
    fn test_guard_unbinds_on_early_return() {
        fn fails<C: GraphicsContext>(ctx: &C, texture: C::Texture) -> Result<(), ()> {
            let _bound = TextureBinding::new(ctx, texture);
            Err(())
        }

        let ctx = HeadlessContext::new();
        let texture = ctx.create_texture().unwrap();
        assert!(fails(&ctx, texture).is_err());
        assert_eq!(ctx.bound_texture(), None);
    }

    #[test]
    fn test_buffer_guard_scopes_target() {
        let ctx = HeadlessContext::new();
        let buffer = ctx.create_buffer().unwrap();
        ctx.clear_calls();
        {
            let bound = BufferBinding::new(&ctx, BufferTarget::Array, buffer);
            bound.data(&[1, 2, 3]);
        }
        assert_eq!(
            ctx.calls(),
            vec![
                GlCall::BindBuffer(BufferTarget::Array, Some(buffer)),
                GlCall::BufferData(BufferTarget::Array, 3),
                GlCall::BindBuffer(BufferTarget::Array, None),
            ]
        );
        assert_eq!(ctx.buffer_contents(buffer), Some(vec![1, 2, 3]));
        assert!(ctx.take_errors().is_empty());
    }

    #[test]
    fn test_vertex_array_guard() {
        let ctx = HeadlessContext::new();
        let vao = ctx.create_vertex_array().unwrap();
        {
            let _bound = VertexArrayBinding::new(&ctx, vao);
            assert_eq!(ctx.bound_vertex_array(), Some(vao));
        }
        assert_eq!(ctx.bound_vertex_array(), None);
    }
}
