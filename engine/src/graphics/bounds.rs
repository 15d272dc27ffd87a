//! Bounding volumes derived from mesh vertices
//!
//! Both volumes are anchored at the model origin: the sphere is centred on
//! it, and the box bounds start out as the origin, so they always contain it.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graphics::mesh::Mesh;

/// Bounding sphere radius and axis-aligned box of a model
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolume {
    /// Largest vertex distance from the origin
    pub radius: f32,
    /// Minimum bounds
    pub min: Vec3,
    /// Maximum bounds
    pub max: Vec3,
}

impl BoundingVolume {
    /// Compute the volume over every vertex of every mesh in one pass
    pub fn from_meshes(meshes: &[Mesh]) -> Self {
        let volume =
            Self::from_positions(meshes.iter().flat_map(|mesh| mesh.positions.iter().copied()));
        debug!(
            meshes = meshes.len(),
            radius = volume.radius,
            min = ?volume.min,
            max = ?volume.max,
            "Computed bounding volume"
        );
        volume
    }

    /// Compute the volume over a stream of positions
    ///
    /// Bounds start at the origin, so a coordinate raising the maximum can
    /// never also lower the minimum.
    pub fn from_positions<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut max_distance_sq = 0.0f32;
        let mut min = [0.0f32; 3];
        let mut max = [0.0f32; 3];

        for position in positions {
            max_distance_sq = max_distance_sq.max(position.length_squared());

            for (axis, value) in position.to_array().into_iter().enumerate() {
                max[axis] = max[axis].max(value);
                min[axis] = min[axis].min(value);
            }
        }

        Self {
            radius: max_distance_sq.sqrt(),
            min: Vec3::from_array(min),
            max: Vec3::from_array(max),
        }
    }

    /// The 8 corners of the box
    ///
    /// Bottom face (`min.z`) first, then top face (`max.z`), each walked
    /// `(min,min) (min,max) (max,max) (max,min)` over x and y.
    pub fn corners(&self) -> [Vec3; 8] {
        let (min, max) = (self.min, self.max);
        [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(min.x, max.y, max.z),
            Vec3::new(max.x, max.y, max.z),
            Vec3::new(max.x, min.y, max.z),
        ]
    }

    /// Get the center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size/extents of the box
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Whether `point` lies inside the box (inclusive)
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}
