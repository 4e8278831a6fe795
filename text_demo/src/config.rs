//! Demo configuration
//!
//! Loaded from `config/demo.toml`; every section falls back to defaults.

use serde::{Deserialize, Serialize};
use text_quad::{Config, ShaderConfig, TextConfig};

/// Top-level demo settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub window: WindowConfig,
    pub scene: SceneConfig,
    pub text: TextConfig,
    pub shaders: ShaderConfig,
}

impl Config for DemoConfig {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Text Quad Demo".to_string(),
            width: 800,
            height: 800,
            vsync: true,
        }
    }
}

/// What is drawn and how it moves
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Phrases cycled with Space; the first is shown at startup
    pub phrases: Vec<String>,
    /// Families cycled with F
    pub fonts: Vec<String>,
    /// Normalized window coordinates of the quad's corner
    pub position: [f32; 2],
    pub extent: [f32; 2],
    /// Radians per second
    pub spin_speed: f32,
    pub clear_color: [f32; 4],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            phrases: vec![
                "Hello, World!".to_string(),
                "Spinning text".to_string(),
                "Rust + OpenGL".to_string(),
            ],
            fonts: vec![
                "Arial".to_string(),
                "DejaVu Sans".to_string(),
                "Liberation Serif".to_string(),
            ],
            position: [0.25, 0.25],
            extent: [0.5, 0.5],
            spin_speed: 0.8,
            clear_color: [0.1, 0.1, 0.15, 1.0],
        }
    }
}

impl DemoConfig {
    /// Re-resolve shader paths against the launch directory
    pub fn resolve_paths(&mut self) {
        self.shaders = ShaderConfig::with_path_resolution(
            &self.shaders.vertex_shader_path,
            &self.shaders.fragment_shader_path,
        );
    }
}
