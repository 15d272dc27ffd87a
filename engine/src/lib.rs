//! Asset pipeline for the engine
//!
//! This crate provides the CPU side of asset handling: a weak-reference
//! cache shared by all asset types, OBJ model loading with per-material
//! index ranges, and bounding volume computation for loaded models.

pub mod assets;
pub mod config;
pub mod graphics;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    // Asset caching
    pub use crate::assets::{
        AssetCache, AssetLoader, AssetStore, ModelCache, ModelLoader, Shader, ShaderCache,
        Texture, TextureCache,
    };

    // Mesh and model data
    pub use crate::graphics::{
        BoundingVolume, IndexRange, Material, MaterialRange, Mesh, Model, ShapeData, Vertex,
    };

    // Config types
    pub use crate::config::AssetConfig;

    // Math types
    pub use glam::{Vec2, Vec3};
}

/// Initialize logging for the asset pipeline
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
