//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math type aliases over nalgebra
//! - Logging setup

pub mod math;
pub mod logging;
