//! Loaded models: meshes plus their bounding volume

use glam::Vec3;

use crate::graphics::bounds::BoundingVolume;
use crate::graphics::mesh::Mesh;

/// A model ready for GPU upload
///
/// The model owns its meshes, and each mesh owns its material ranges. Textures
/// referenced by those materials are shared through the texture cache.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub bounds: BoundingVolume,
}

impl Model {
    /// Create a model, deriving its bounds from the meshes
    pub fn new(meshes: Vec<Mesh>) -> Self {
        let bounds = BoundingVolume::from_meshes(&meshes);
        Self { meshes, bounds }
    }

    /// Radius of the origin-centred bounding sphere
    pub fn bounding_radius(&self) -> f32 {
        self.bounds.radius
    }

    /// Corner points of the bounding box
    pub fn bounding_box(&self) -> [Vec3; 8] {
        self.bounds.corners()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(Mesh::vertex_count).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }

    /// Find a mesh by the name of the shape it was built from
    pub fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|mesh| mesh.name == name)
    }
}
