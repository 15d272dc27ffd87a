//! Configuration types for the asset pipeline

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::utils::paths::normalize_path;

/// Errors produced while loading or validating an [`AssetConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Directory not found: {0:?}")]
    MissingDirectory(PathBuf),

    #[error("Invalid asset name: {0}")]
    InvalidName(String),
}

/// Configuration for asset paths
///
/// Cache keys are relative path strings such as `textures/brick.png`. The
/// directory fields only decide which prefix a referenced file gets; every
/// key is then resolved against `asset_root` by the individual loaders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Root directory for all assets
    pub asset_root: PathBuf,
    /// Directory holding `.mtl` libraries referenced by models (relative to asset_root)
    pub materials_dir: String,
    /// Directory holding textures referenced by materials (relative to asset_root)
    pub textures_dir: String,
    /// Directory holding shader sources (relative to asset_root)
    pub shaders_dir: String,
}

impl AssetConfig {
    /// Create a new AssetConfig rooted at `asset_root` with the default directory names
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        let asset_root = asset_root.into();
        debug!(asset_root = ?asset_root, "Creating new AssetConfig");
        Self {
            asset_root,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        debug!(path = ?path, asset_root = ?config.asset_root, "Loaded AssetConfig");
        Ok(config)
    }

    /// Resolve a cache key to a path on disk
    pub fn resolve(&self, key: &str) -> PathBuf {
        self.asset_root.join(key)
    }

    /// Directory that `mtllib` statements are resolved against
    pub fn materials_path(&self) -> PathBuf {
        self.asset_root.join(&self.materials_dir)
    }

    /// Cache key for a texture named by a material
    pub fn texture_key(&self, name: &str) -> Result<String, ConfigError> {
        Self::prefixed_key(&self.textures_dir, name)
    }

    /// Cache key for a shader source file
    pub fn shader_key(&self, name: &str) -> Result<String, ConfigError> {
        Self::prefixed_key(&self.shaders_dir, name)
    }

    fn prefixed_key(dir: &str, name: &str) -> Result<String, ConfigError> {
        let name = normalize_path(name.trim());
        let name = name.to_string_lossy();
        // Reject path traversal out of the asset directory
        if name.is_empty() || name.starts_with('/') || name.split('/').any(|part| part == "..") {
            return Err(ConfigError::InvalidName(name.into_owned()));
        }
        let key = if dir.is_empty() {
            name.into_owned()
        } else {
            format!("{}/{name}", dir.trim_end_matches('/'))
        };
        debug!(key = %key, "Generated asset key");
        Ok(key)
    }

    /// Check if the asset directories exist
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.asset_root.is_dir() {
            return Err(ConfigError::MissingDirectory(self.asset_root.clone()));
        }

        for dir in [&self.materials_dir, &self.textures_dir, &self.shaders_dir] {
            let path = self.asset_root.join(dir);
            if !path.is_dir() {
                return Err(ConfigError::MissingDirectory(path));
            }
        }

        Ok(())
    }
}

impl Default for AssetConfig {
    /// Default layout: `assets/{materials,textures,shaders}`
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            materials_dir: "materials".to_string(),
            textures_dir: "textures".to_string(),
            shaders_dir: "shaders".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_key() {
        let config = AssetConfig::default();
        assert_eq!(config.texture_key("brick.png").unwrap(), "textures/brick.png");
        assert_eq!(
            config.texture_key("sub\\brick.png").unwrap(),
            "textures/sub/brick.png"
        );
    }

    #[test]
    fn test_shader_key() {
        let config = AssetConfig::default();
        assert_eq!(config.shader_key("basic.wgsl").unwrap(), "shaders/basic.wgsl");
    }

    #[test]
    fn test_key_rejects_path_traversal() {
        let config = AssetConfig::default();
        assert!(matches!(
            config.texture_key("../evil.png"),
            Err(ConfigError::InvalidName(_))
        ));
        assert!(matches!(
            config.texture_key("a/../../evil.png"),
            Err(ConfigError::InvalidName(_))
        ));
        assert!(matches!(config.texture_key("  "), Err(ConfigError::InvalidName(_))));
    }

    #[test]
    fn test_resolve_and_materials_path() {
        let config = AssetConfig::new("game/assets");
        assert_eq!(
            config.resolve("models/crate.obj"),
            PathBuf::from("game/assets/models/crate.obj")
        );
        assert_eq!(config.materials_path(), PathBuf::from("game/assets/materials"));
    }

    #[test]
    fn test_default_config() {
        let config = AssetConfig::default();
        assert_eq!(config.asset_root, PathBuf::from("assets"));
        assert_eq!(config.materials_dir, "materials");
        assert_eq!(config.textures_dir, "textures");
        assert_eq!(config.shaders_dir, "shaders");
    }

    #[test]
    fn test_load_from_file_with_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.json");
        fs::write(&path, r#"{ "asset_root": "data", "textures_dir": "tex" }"#).unwrap();

        let config = AssetConfig::load_from_file(&path).unwrap();
        assert_eq!(config.asset_root, PathBuf::from("data"));
        assert_eq!(config.textures_dir, "tex");
        assert_eq!(config.materials_dir, "materials");
    }

    #[test]
    fn test_validate_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("materials")).unwrap();
        fs::create_dir(dir.path().join("textures")).unwrap();

        let config = AssetConfig::new(dir.path());
        match config.validate() {
            Err(ConfigError::MissingDirectory(path)) => {
                assert_eq!(path, dir.path().join("shaders"))
            }
            other => panic!("expected missing shaders dir, got {other:?}"),
        }

        fs::create_dir(dir.path().join("shaders")).unwrap();
        assert!(config.validate().is_ok());
    }
}
