//! Graphics context abstraction
//!
//! This trait is the seam between the text pipeline and the graphics API. It
//! mirrors the small slice of an OpenGL-style API the pipeline needs: one
//! "current" texture, vertex array and buffer per target, all of it global
//! state owned by a single rendering thread. Methods take `&self` because the
//! underlying context is itself a shared, implicitly mutable object.

use std::fmt::Debug;

use crate::text::PixelFormat;

use super::RenderResult;

/// Buffer binding points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data
    Array,
    /// Index data; recorded into the bound vertex array
    ElementArray,
}

/// Layout of one float vertex attribute inside an interleaved buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Shader attribute location
    pub location: u32,
    /// Number of `f32` components
    pub components: u32,
    /// Distance between consecutive vertices in bytes
    pub stride: u32,
    /// Offset of the first component in bytes
    pub offset: u32,
}

/// Minimal OpenGL-style graphics API
///
/// Implementations must be driven from a single thread. Binding calls with
/// `None` unbind the target.
pub trait GraphicsContext {
    /// Texture handle
    type Texture: Copy + Debug + PartialEq;
    /// Buffer handle
    type Buffer: Copy + Debug + PartialEq;
    /// Vertex array handle
    type VertexArray: Copy + Debug + PartialEq;

    /// Create a texture object
    fn create_texture(&self) -> RenderResult<Self::Texture>;

    /// Delete a texture object
    fn delete_texture(&self, texture: Self::Texture);

    /// Bind (or with `None`, unbind) the current 2D texture
    fn bind_texture(&self, texture: Option<Self::Texture>);

    /// Allocate uninitialized RGBA8 storage for the bound texture
    fn allocate_texture_storage(&self, width: u32, height: u32);

    /// Replace the whole image of the bound texture
    ///
    /// `pixels` holds `width * height` texels in `format` order and the
    /// dimensions must match the allocated storage.
    fn upload_texture_pixels(&self, width: u32, height: u32, format: PixelFormat, pixels: &[u8]);

    /// Use linear minification and magnification filtering on the bound texture
    fn set_linear_filtering(&self);

    /// Enable blending with `SRC_ALPHA, ONE_MINUS_SRC_ALPHA`
    fn enable_alpha_blending(&self);

    /// Create a vertex array object
    fn create_vertex_array(&self) -> RenderResult<Self::VertexArray>;

    /// Delete a vertex array object
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    /// Bind (or unbind) the current vertex array
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);

    /// Create a buffer object
    fn create_buffer(&self) -> RenderResult<Self::Buffer>;

    /// Delete a buffer object
    fn delete_buffer(&self, buffer: Self::Buffer);

    /// Bind (or unbind) a buffer to `target`
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);

    /// Replace the contents of the buffer bound to `target`
    fn buffer_data(&self, target: BufferTarget, data: &[u8]);

    /// Point an attribute at the bound array buffer and enable it
    fn vertex_attribute(&self, attribute: VertexAttribute);

    /// Draw `index_count` `u32` indices from the bound vertex array as triangles
    fn draw_indexed_triangles(&self, index_count: u32);
}
