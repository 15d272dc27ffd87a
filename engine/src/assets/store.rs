//! The [`AssetStore`] bundles one cache per asset type under a single config.
//!
//! Models resolve their material textures through the same texture cache
//! that [`AssetStore::texture`] uses, so a texture shared by several
//! materials (or requested directly) is loaded once while anything holds it.

use std::rc::Rc;
use tracing::debug;

use super::model_loader::{ModelCache, ModelLoader};
use super::shader::{Shader, ShaderCache, ShaderLoader};
use super::texture::{Texture, TextureCache, TextureLoader};
use crate::config::AssetConfig;
use crate::graphics::model::Model;

#[derive(Debug)]
pub struct AssetStore {
    pub config: AssetConfig,
    pub textures: Rc<TextureCache>,
    pub shaders: ShaderCache,
    pub models: ModelCache,
}

impl AssetStore {
    pub fn new(config: AssetConfig) -> Self {
        debug!(asset_root = ?config.asset_root, "Creating asset store");
        let textures = Rc::new(TextureCache::new(TextureLoader::new(&config.asset_root)));
        let shaders = ShaderCache::new(ShaderLoader::new(&config.asset_root));
        let models = ModelCache::new(ModelLoader::new(config.clone(), Rc::clone(&textures)));

        Self {
            config,
            textures,
            shaders,
            models,
        }
    }

    /// Load or fetch a model by key, e.g. `models/crate.obj`
    pub fn model(&self, key: &str) -> Option<Rc<Model>> {
        self.models.cache(key)
    }

    /// Load or fetch a texture by key, e.g. `textures/crate.png`
    pub fn texture(&self, key: &str) -> Option<Rc<Texture>> {
        self.textures.cache(key)
    }

    /// Load or fetch a shader by its name inside the shaders directory
    pub fn shader(&self, name: &str) -> Option<Rc<Shader>> {
        let key = self.config.shader_key(name).ok()?;
        self.shaders.cache(&key)
    }

    /// Drop dead entries from every cache
    pub fn purge(&self) -> usize {
        self.textures.purge() + self.shaders.purge() + self.models.purge()
    }
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new(AssetConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_store_shares_texture_cache_with_models() {
        let store = AssetStore::new(AssetConfig::new("does-not-exist"));
        assert!(Rc::ptr_eq(&store.textures, store.models.loader().textures()));
    }

    #[test]
    fn test_shader_lookup_goes_through_shaders_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("shaders")).unwrap();
        fs::write(dir.path().join("shaders/basic.wgsl"), "@vertex fn vs() {}").unwrap();

        let store = AssetStore::new(AssetConfig::new(dir.path()));
        let shader = store.shader("basic.wgsl").unwrap();
        assert!(Rc::ptr_eq(&shader, &store.shaders.lookup("shaders/basic.wgsl").unwrap()));
        assert!(store.shader("../basic.wgsl").is_none());
        assert!(store.shader("missing.wgsl").is_none());
    }

    #[test]
    fn test_purge_counts_all_caches() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("shaders")).unwrap();
        fs::write(dir.path().join("shaders/a.frag"), "void main() {}").unwrap();

        let store = AssetStore::new(AssetConfig::new(dir.path()));
        drop(store.shader("a.frag"));
        assert_eq!(store.purge(), 1);
        assert_eq!(store.purge(), 0);
    }
}
