//! Asset loading and caching
//!
//! Every asset type shares the same [`AssetCache`] mechanics and plugs in its
//! own [`AssetLoader`].

pub mod cache;
pub mod model_loader;
pub mod shader;
pub mod store;
pub mod texture;

pub use cache::{AssetCache, AssetLoader};
pub use model_loader::{ModelCache, ModelLoadError, ModelLoader};
pub use shader::{Shader, ShaderCache, ShaderLoadError, ShaderLoader, ShaderStage};
pub use store::AssetStore;
pub use texture::{Texture, TextureCache, TextureLoadError, TextureLoader};
