//! Graphics module
//!
//! CPU-side mesh, material and model data handed to the renderer.

pub mod bounds;
pub mod material;
pub mod mesh;
pub mod model;

// Re-export commonly used types
pub use bounds::BoundingVolume;
pub use material::{Material, MaterialResolver, MaterialSource, MaterialUniform, NO_MATERIAL};
pub use mesh::{
    partition_material_ranges, IndexRange, MaterialRange, Mesh, MeshError, ShapeData, Vertex,
};
pub use model::Model;
