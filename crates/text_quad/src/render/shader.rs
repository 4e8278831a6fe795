//! Shader program seam and shader source configuration

use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::foundation::math::Mat4;

/// Attribute name for vertex positions
pub const POSITION_ATTRIBUTE: &str = "aPosition";

/// Attribute name for texture coordinates
pub const TEX_COORD_ATTRIBUTE: &str = "aTexCoord";

/// Uniform name for the model transform
pub const TRANSFORM_UNIFORM: &str = "transform";

/// A linked GPU program as seen by the text pipeline
pub trait ShaderProgram {
    /// Make this the current program
    fn activate(&self);

    /// Upload a 4x4 matrix uniform; unknown names are ignored
    fn set_matrix4(&self, name: &str, matrix: &Mat4);

    /// Location of a vertex attribute, `None` if the program lacks it
    fn attribute_location(&self, name: &str) -> Option<u32>;
}

impl<S: ShaderProgram + ?Sized> ShaderProgram for Rc<S> {
    fn activate(&self) {
        (**self).activate();
    }

    fn set_matrix4(&self, name: &str, matrix: &Mat4) {
        (**self).set_matrix4(name, matrix);
    }

    fn attribute_location(&self, name: &str) -> Option<u32> {
        (**self).attribute_location(name)
    }
}

/// Configuration for shader loading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderConfig {
    /// Path to the vertex shader GLSL source
    pub vertex_shader_path: String,
    /// Path to the fragment shader GLSL source
    pub fragment_shader_path: String,
}

impl ShaderConfig {
    /// Create a new shader configuration
    pub fn new(vertex_path: impl Into<String>, fragment_path: impl Into<String>) -> Self {
        Self {
            vertex_shader_path: vertex_path.into(),
            fragment_shader_path: fragment_path.into(),
        }
    }

    /// Create shader config with automatic path resolution
    ///
    /// Useful for binaries that may be launched from the workspace root or
    /// from their own crate directory.
    pub fn with_path_resolution(base_vertex: &str, base_fragment: &str) -> Self {
        Self {
            vertex_shader_path: resolve_shader_path(base_vertex),
            fragment_shader_path: resolve_shader_path(base_fragment),
        }
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self::with_path_resolution("shaders/text.vert", "shaders/text.frag")
    }
}

/// Resolve shader path by checking a few common locations
fn resolve_shader_path(base_path: &str) -> String {
    if Path::new(base_path).exists() {
        return base_path.to_string();
    }

    let demo_path = Path::new("text_demo").join(base_path);
    if demo_path.exists() {
        return demo_path.to_string_lossy().into_owned();
    }

    // Fall back to the path as given
    base_path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolvable_paths_are_kept() {
        let config = ShaderConfig::with_path_resolution("missing/a.vert", "missing/a.frag");
        assert_eq!(config.vertex_shader_path, "missing/a.vert");
        assert_eq!(config.fragment_shader_path, "missing/a.frag");
    }
}
