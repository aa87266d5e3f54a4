//! Shader sources.
//!
//! Shader text is opaque here: it is located through [`ShaderConfig`], read by a
//! [`ShaderLoader`], and handed to the platform as [`LoadedStage`]s.

mod config;
mod loader;

pub use config::{LoadedStage, ShaderConfig, ShaderStage};
pub use loader::{FsShaderLoader, MemoryShaderLoader, ShaderLoader};
