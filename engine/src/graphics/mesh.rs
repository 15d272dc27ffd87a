//! Mesh data and material range partitioning
//!
//! A parsed shape arrives as flat parallel arrays plus one material id per
//! triangle. [`Mesh::from_shape`] checks those arrays, converts them into
//! vector types, and splits the index buffer into contiguous
//! [`MaterialRange`]s so the renderer can issue one draw per range.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use std::rc::Rc;
use tracing::trace;

use crate::graphics::material::Material;

/// Reasons a shape is rejected before it becomes a [`Mesh`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("position array length {0} is not a multiple of 3")]
    Positions(usize),

    #[error("texcoord array length {0} is not a multiple of 2")]
    Texcoords(usize),

    #[error("normal array length {normals} does not match position array length {positions}")]
    Normals { normals: usize, positions: usize },

    #[error("index array length {0} is not a multiple of 3")]
    Indices(usize),

    #[error("{ids} material ids for {triangles} triangles")]
    MaterialIds { ids: usize, triangles: usize },

    #[error("index {index} out of bounds for {vertices} vertices")]
    IndexOutOfBounds { index: u32, vertices: usize },
}

/// One shape as produced by the model parser
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeData {
    pub name: String,
    /// xyz triples
    pub positions: Vec<f32>,
    /// xyz triples, parallel to `positions`, or empty
    pub normals: Vec<f32>,
    /// uv pairs, parallel to `positions`, or empty
    pub texcoords: Vec<f32>,
    /// Three vertex indices per triangle
    pub indices: Vec<u32>,
    /// One id per triangle, [`NO_MATERIAL`](crate::graphics::material::NO_MATERIAL) for none
    pub material_ids: Vec<i32>,
}

impl ShapeData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check the array lengths and indices agree with each other
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.positions.len() % 3 != 0 {
            return Err(MeshError::Positions(self.positions.len()));
        }
        if self.texcoords.len() % 2 != 0 {
            return Err(MeshError::Texcoords(self.texcoords.len()));
        }
        if !self.normals.is_empty() && self.normals.len() != self.positions.len() {
            return Err(MeshError::Normals {
                normals: self.normals.len(),
                positions: self.positions.len(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::Indices(self.indices.len()));
        }
        if self.material_ids.len() != self.triangle_count() {
            return Err(MeshError::MaterialIds {
                ids: self.material_ids.len(),
                triangles: self.triangle_count(),
            });
        }

        let vertices = self.vertex_count();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertices) {
            return Err(MeshError::IndexOutOfBounds { index, vertices });
        }

        Ok(())
    }
}

/// Half-open `[start, end)` span of the index buffer, counted in indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub const fn triangle_count(&self) -> usize {
        self.len() / 3
    }
}

/// A run of triangles drawn with one material
#[derive(Debug, Clone)]
pub struct MaterialRange {
    pub range: IndexRange,
    pub material: Option<Rc<Material>>,
}

/// Split an index buffer into runs of equal per-triangle material id
///
/// `resolve` is called once per emitted range, with that range's id. Ranges
/// come out in index order, never overlap, and cover all `3 * material_ids.len()`
/// indices.
pub fn partition_material_ranges<F>(material_ids: &[i32], mut resolve: F) -> Vec<MaterialRange>
where
    F: FnMut(i32) -> Option<Rc<Material>>,
{
    let mut ranges = Vec::new();
    let Some(&first) = material_ids.first() else {
        return ranges;
    };

    let mut current = first;
    let mut start = 0;
    for (triangle, &id) in material_ids.iter().enumerate().skip(1) {
        if id != current {
            let end = triangle * 3;
            trace!(start, end, material_id = current, "Closing material range");
            ranges.push(MaterialRange {
                range: IndexRange::new(start, end),
                material: resolve(current),
            });
            start = end;
            current = id;
        }
    }

    let end = material_ids.len() * 3;
    if start != end {
        ranges.push(MaterialRange {
            range: IndexRange::new(start, end),
            material: resolve(current),
        });
    }

    ranges
}

/// Interleaved vertex ready for GPU upload
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],
    /// Surface normal vector (normalized)
    pub normal: [f32; 3],
    /// Texture coordinates (UV mapping)
    pub uv: [f32; 2],
}

impl Vertex {
    /// Create a new vertex with the given attributes
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Renderer-ready mesh with its material ranges
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// Parallel to `positions`, or empty when the source had no normals
    pub normals: Vec<Vec3>,
    /// Parallel to `positions`, or empty when the source had no texcoords
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    pub materials: Vec<MaterialRange>,
}

impl Mesh {
    /// Build a mesh from a parsed shape
    ///
    /// `resolve` maps a material id to its material; see
    /// [`MaterialResolver`](crate::graphics::material::MaterialResolver).
    pub fn from_shape<F>(shape: &ShapeData, resolve: F) -> Result<Self, MeshError>
    where
        F: FnMut(i32) -> Option<Rc<Material>>,
    {
        shape.validate()?;

        let positions = bytemuck::try_cast_slice::<f32, Vec3>(&shape.positions)
            .map_err(|_| MeshError::Positions(shape.positions.len()))?
            .to_vec();
        let normals = bytemuck::try_cast_slice::<f32, Vec3>(&shape.normals)
            .map_err(|_| MeshError::Normals {
                normals: shape.normals.len(),
                positions: shape.positions.len(),
            })?
            .to_vec();
        let uvs = bytemuck::try_cast_slice::<f32, Vec2>(&shape.texcoords)
            .map_err(|_| MeshError::Texcoords(shape.texcoords.len()))?
            .to_vec();

        let materials = partition_material_ranges(&shape.material_ids, resolve);

        let mesh = Self {
            name: shape.name.clone(),
            positions,
            normals,
            uvs,
            indices: shape.indices.clone(),
            materials,
        };
        debug_assert!(mesh.validate_ranges(), "material ranges must cover the mesh");
        Ok(mesh)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the material ranges are contiguous, ordered and cover every index
    pub fn validate_ranges(&self) -> bool {
        let mut expected_start = 0;
        for MaterialRange { range, .. } in &self.materials {
            if range.start != expected_start || range.is_empty() || range.len() % 3 != 0 {
                return false;
            }
            expected_start = range.end;
        }
        expected_start == self.indices.len()
    }

    /// The indices drawn by one material range
    pub fn range_indices(&self, range: IndexRange) -> &[u32] {
        &self.indices[range.start..range.end]
    }

    /// Interleave the vertex attributes for upload
    ///
    /// Missing texcoords become `(0, 0)`. Missing normals are generated from
    /// face geometry.
    pub fn vertices(&self) -> Vec<Vertex> {
        let mut vertices: Vec<Vertex> = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, position)| {
                let normal = self.normals.get(i).copied().unwrap_or(Vec3::Y);
                let uv = self.uvs.get(i).copied().unwrap_or(Vec2::ZERO);
                Vertex::new(position.to_array(), normal.to_array(), uv.to_array())
            })
            .collect();

        if self.normals.is_empty() {
            calculate_normals(&mut vertices, &self.indices);
        }

        vertices
    }
}

/// Calculate normals for vertices based on face geometry
fn calculate_normals(vertices: &mut [Vertex], indices: &[u32]) {
    for vertex in vertices.iter_mut() {
        vertex.normal = [0.0, 0.0, 0.0];
    }

    for chunk in indices.chunks_exact(3) {
        let [i0, i1, i2] = [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize];
        if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
            continue;
        }

        let v0 = Vec3::from(vertices[i0].position);
        let v1 = Vec3::from(vertices[i1].position);
        let v2 = Vec3::from(vertices[i2].position);

        // Area weighted: the cross product is left unnormalized
        let face_normal = (v1 - v0).cross(v2 - v0);

        for i in [i0, i1, i2] {
            let accumulated = Vec3::from(vertices[i].normal) + face_normal;
            vertices[i].normal = accumulated.to_array();
        }
    }

    for vertex in vertices.iter_mut() {
        let normal = Vec3::from(vertex.normal).normalize_or(Vec3::Y);
        vertex.normal = normal.to_array();
    }
}
