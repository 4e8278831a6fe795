//! Crate-level error type

use crate::config::ConfigError;
use crate::render::RenderError;

/// Result type for text entity operations
pub type TextResult<T> = Result<T, TextError>;

/// Errors surfaced by the text pipeline
///
/// Argument validation always happens before any raster or GPU work, so a
/// returned `InvalidArgument` guarantees nothing was modified.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// A font size or color channel was outside its valid range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The graphics backend failed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Configuration could not be loaded or is inconsistent
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TextError {
    /// Shorthand for building an [`TextError::InvalidArgument`]
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Whether this error came from argument validation
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
