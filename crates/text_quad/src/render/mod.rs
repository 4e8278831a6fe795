//! Rendering: the graphics-context seam and the GPU half of a text quad
//!
//! The [`GraphicsContext`] trait abstracts an OpenGL-style API whose binding
//! state is global. Everything built on top of it scopes its bindings with the
//! guards in [`binding`], so each public operation leaves the context unbound.

pub mod binding;
pub mod context;
pub mod geometry;
pub mod headless;
pub mod shader;
pub mod texture;
pub mod transform;

#[cfg(feature = "opengl")]
pub mod opengl;

pub use binding::{BufferBinding, TextureBinding, VertexArrayBinding};
pub use context::{BufferTarget, GraphicsContext, VertexAttribute};
pub use geometry::{build_vertices, QuadMesh, QuadVertex, QUAD_INDICES};
pub use headless::{GlCall, HeadlessContext, HeadlessShader};
pub use shader::{ShaderConfig, ShaderProgram};
pub use texture::TextTexture;
pub use transform::{model_matrix, pivot_matrix};

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised by graphics backends and GPU resource management
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The graphics context could not be set up
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// A texture, buffer or vertex array could not be created
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// A rendering operation was given inconsistent data
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// A shader failed to compile or link
    #[error("Shader compilation failed: {0}")]
    ShaderCompilation(String),

    /// Backend-specific failure (file I/O for shader sources, driver errors)
    #[error("Backend error: {0}")]
    BackendError(String),
}
