//! Shader source assets
//!
//! Sources are kept as text; compilation belongs to the renderer.

use std::path::PathBuf;
use tracing::debug;

use super::cache::{AssetCache, AssetLoader};
use crate::utils::paths::lowercase_extension;

/// Cache of shader sources keyed by their path relative to the asset root
pub type ShaderCache = AssetCache<ShaderLoader>;

/// Errors that can occur during shader loading
#[derive(Debug, thiserror::Error)]
pub enum ShaderLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Shader source is empty: {0}")]
    Empty(String),
}

/// Pipeline stage a shader source is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    /// A module holding several entry points, as WGSL does
    Combined,
    Unknown,
}

impl ShaderStage {
    /// Guess the stage from a file name's extension
    pub fn from_path(path: &str) -> Self {
        match lowercase_extension(path).as_str() {
            "vert" | "vs" => ShaderStage::Vertex,
            "frag" | "fs" => ShaderStage::Fragment,
            "wgsl" => ShaderStage::Combined,
            _ => ShaderStage::Unknown,
        }
    }
}

/// A shader's source text
#[derive(Debug, Clone, PartialEq)]
pub struct Shader {
    pub source: String,
    pub stage: ShaderStage,
}

/// Loads shader sources from files beneath `root`
#[derive(Debug, Clone)]
pub struct ShaderLoader {
    root: PathBuf,
}

impl ShaderLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader for ShaderLoader {
    type Asset = Shader;
    type Error = ShaderLoadError;

    fn load(&self, key: &str) -> Result<Shader, ShaderLoadError> {
        let path = self.root.join(key);
        let source = std::fs::read_to_string(&path)?;
        if source.trim().is_empty() {
            return Err(ShaderLoadError::Empty(key.to_string()));
        }

        let stage = ShaderStage::from_path(key);
        debug!(path = ?path, stage = ?stage, bytes = source.len(), "Loaded shader source");

        Ok(Shader { source, stage })
    }
}
