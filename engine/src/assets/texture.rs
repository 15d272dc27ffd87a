//! Texture assets decoded to RGBA8 before GPU upload

use std::path::PathBuf;
use tracing::debug;

use super::cache::{AssetCache, AssetLoader};

/// Cache of textures keyed by their path relative to the asset root
pub type TextureCache = AssetCache<TextureLoader>;

/// Errors that can occur during texture loading
#[derive(Debug, thiserror::Error)]
pub enum TextureLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Texture data in CPU-friendly format
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 pixels, row by row
    pub pixels: Vec<u8>,
}

impl Texture {
    /// Wrap already decoded RGBA8 pixels
    ///
    /// Returns `None` if `pixels` does not hold exactly `width * height` texels.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * 4;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A single-texel texture of the given color
    pub fn solid(color: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: color.to_vec(),
        }
    }
}

/// Loads textures from files beneath `root`
#[derive(Debug, Clone)]
pub struct TextureLoader {
    root: PathBuf,
}

impl TextureLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader for TextureLoader {
    type Asset = Texture;
    type Error = TextureLoadError;

    fn load(&self, key: &str) -> Result<Texture, TextureLoadError> {
        let path = self.root.join(key);
        let bytes = std::fs::read(&path)?;
        let rgba = image::load_from_memory(&bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();

        debug!(path = ?path, width, height, "Loaded texture");

        Ok(Texture {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba8_checks_size() {
        assert!(Texture::from_rgba8(2, 2, vec![0; 16]).is_some());
        assert!(Texture::from_rgba8(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn test_load_png() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("textures")).unwrap();
        let image = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        image.save(dir.path().join("textures/tile.png")).unwrap();

        let texture = TextureLoader::new(dir.path())
            .load("textures/tile.png")
            .unwrap();
        assert_eq!((texture.width, texture.height), (3, 2));
        assert_eq!(&texture.pixels[..4], &[10, 20, 30, 255]);
        assert_eq!(texture.pixels.len(), 3 * 2 * 4);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = TextureLoader::new(dir.path()).load("textures/nope.png");
        assert!(matches!(result, Err(TextureLoadError::Io(_))));
    }

    #[test]
    fn test_garbage_file_is_image_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.png"), b"definitely not a png").unwrap();
        let result = TextureLoader::new(dir.path()).load("bad.png");
        assert!(matches!(result, Err(TextureLoadError::Image(_))));
    }

    #[test]
    fn test_texture_cache_shares_instances() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbaImage::new(1, 1)
            .save(dir.path().join("white.png"))
            .unwrap();

        let cache = TextureCache::new(TextureLoader::new(dir.path()));
        let a = cache.cache("white.png").unwrap();
        let b = cache.cache("white.png").unwrap();
        assert!(std::rc::Rc::ptr_eq(&a, &b));
        assert!(cache.cache("black.png").is_none());
    }
}
