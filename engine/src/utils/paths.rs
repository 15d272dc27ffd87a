//! Cross-platform path utilities for handling Windows and Unix paths

use std::path::{Path, PathBuf};

/// Normalize path for cross-platform compatibility
///
/// Converts backslashes to forward slashes for consistency. Material
/// libraries authored on Windows routinely name textures as `maps\wood.png`,
/// and cache keys must not depend on which separator the author used.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let path_str = path.as_ref().to_string_lossy().replace('\\', "/");
    PathBuf::from(path_str)
}

/// File extension in lowercase, or an empty string
pub fn lowercase_extension<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default()
}
