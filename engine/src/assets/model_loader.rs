//! Model loading from Wavefront OBJ files
//!
//! The OBJ text itself is parsed by `tobj`. This module regroups its output
//! into shapes with a per-triangle material id array, turns each shape into
//! a [`Mesh`], and wraps the meshes in a [`Model`] with its bounding volume.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

use super::cache::{AssetCache, AssetLoader};
use super::texture::{Texture, TextureCache};
use crate::config::AssetConfig;
use crate::graphics::material::{MaterialResolver, MaterialSource, NO_MATERIAL};
use crate::graphics::mesh::{Mesh, ShapeData};
use crate::graphics::model::Model;

/// Cache of models keyed by their path relative to the asset root
pub type ModelCache = AssetCache<ModelLoader>;

/// Errors that can occur during model loading
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OBJ loading error: {0}")]
    ObjLoad(#[from] tobj::LoadError),

    #[error("No shapes found in file")]
    NoShapes,
}

/// Loads OBJ models, resolving their textures through a shared texture cache
#[derive(Debug)]
pub struct ModelLoader {
    config: AssetConfig,
    textures: Rc<TextureCache>,
}

impl ModelLoader {
    pub fn new(config: AssetConfig, textures: Rc<TextureCache>) -> Self {
        Self { config, textures }
    }

    pub fn textures(&self) -> &Rc<TextureCache> {
        &self.textures
    }

    /// Load a model from OBJ text, resolving `mtllib` statements in the materials directory
    pub fn load_from_reader<B: BufRead>(&self, reader: &mut B) -> Result<Model, ModelLoadError> {
        let (shapes, materials) = parse_obj(reader, &self.config.materials_path())?;
        Ok(build_model(&shapes, &materials, &*self.textures, &self.config))
    }
}

impl AssetLoader for ModelLoader {
    type Asset = Model;
    type Error = ModelLoadError;

    fn load(&self, key: &str) -> Result<Model, ModelLoadError> {
        let path = self.config.resolve(key);
        info!("Loading OBJ file: {:?}", path);

        let file = File::open(&path)?;
        self.load_from_reader(&mut BufReader::new(file))
            .inspect_err(|e| error!(path = ?path, error = %e, "Failed to load model"))
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Parse OBJ text into shapes and the material table they index into
///
/// A broken material library is not fatal: the shapes are still returned,
/// with an empty table, so every triangle ends up without a material.
pub fn parse_obj<B: BufRead>(
    reader: &mut B,
    materials_dir: &Path,
) -> Result<(Vec<ShapeData>, Vec<MaterialSource>), ModelLoadError> {
    let (models, materials) = tobj::load_obj_buf(reader, &load_options(), |mtl| {
        tobj::load_mtl(materials_dir.join(mtl))
    })?;

    let materials: Vec<MaterialSource> = match materials {
        Ok(materials) => materials.iter().map(MaterialSource::from).collect(),
        Err(e) => {
            warn!(dir = ?materials_dir, error = %e, "Failed to load material library");
            Vec::new()
        }
    };

    let shapes: Vec<ShapeData> = merge_shapes(models)
        .into_iter()
        .filter(|shape| !shape.positions.is_empty() || !shape.indices.is_empty())
        .collect();

    if shapes.is_empty() {
        return Err(ModelLoadError::NoShapes);
    }

    debug!(
        shapes = shapes.len(),
        materials = materials.len(),
        "Parsed OBJ data"
    );

    Ok((shapes, materials))
}

/// Stitch tobj's per-material pieces back into whole shapes
///
/// tobj starts a new model, under the same name, whenever `usemtl` switches
/// material inside an object. Consecutive pieces with the same name are
/// concatenated, with each piece's material repeated once per triangle.
/// Pieces only join a shape that is well-formed and has the same set of
/// vertex attributes, so a malformed piece cannot hide inside a valid shape.
fn merge_shapes(models: Vec<tobj::Model>) -> Vec<ShapeData> {
    let mut shapes = Vec::new();
    let mut current: Option<ShapeData> = None;

    for model in models {
        let mesh = &model.mesh;
        let continues = current.as_ref().is_some_and(|shape| {
            shape.name == model.name
                && shape.normals.is_empty() == mesh.normals.is_empty()
                && shape.texcoords.is_empty() == mesh.texcoords.is_empty()
                && shape.validate().is_ok()
        });

        if !continues {
            shapes.extend(current.take());
            current = Some(ShapeData {
                name: model.name.clone(),
                ..Default::default()
            });
        }

        if let Some(shape) = current.as_mut() {
            append_piece(shape, mesh);
        }
    }

    shapes.extend(current);
    shapes
}

fn append_piece(shape: &mut ShapeData, mesh: &tobj::Mesh) {
    let base = shape.vertex_count() as u32;
    let material_id = mesh
        .material_id
        .and_then(|id| i32::try_from(id).ok())
        .unwrap_or(NO_MATERIAL);

    shape.positions.extend_from_slice(&mesh.positions);
    shape.normals.extend_from_slice(&mesh.normals);
    shape.texcoords.extend_from_slice(&mesh.texcoords);
    shape.indices.extend(mesh.indices.iter().map(|&i| i + base));
    shape
        .material_ids
        .extend(std::iter::repeat(material_id).take(mesh.indices.len() / 3));
}

/// Turn parsed shapes into a model, skipping shapes that fail validation
pub fn build_model<L>(
    shapes: &[ShapeData],
    materials: &[MaterialSource],
    textures: &AssetCache<L>,
    config: &AssetConfig,
) -> Model
where
    L: AssetLoader<Asset = Texture>,
{
    let mut meshes = Vec::with_capacity(shapes.len());

    for shape in shapes {
        let mut resolver = MaterialResolver::new(materials, textures, config);
        match Mesh::from_shape(shape, |id| resolver.resolve(id)) {
            Ok(mesh) => {
                debug!(
                    shape = %shape.name,
                    vertices = mesh.vertex_count(),
                    triangles = mesh.triangle_count(),
                    ranges = mesh.materials.len(),
                    "Built mesh"
                );
                meshes.push(mesh);
            }
            Err(e) => {
                warn!(shape = %shape.name, error = %e, "Skipping malformed shape");
            }
        }
    }

    Model::new(meshes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::texture::TextureLoader;
    use crate::graphics::material::tests::{source, FakeTextures};
    use std::io::Cursor;

    fn piece(
        name: &str,
        material_id: Option<usize>,
        positions: Vec<f32>,
        indices: Vec<u32>,
    ) -> tobj::Model {
        tobj::Model::new(
            tobj::Mesh {
                positions,
                indices,
                material_id,
                ..Default::default()
            },
            name.to_string(),
        )
    }

    fn tri() -> Vec<f32> {
        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
    }

    #[test]
    fn test_merge_restitches_material_pieces() {
        let shapes = merge_shapes(vec![
            piece("hull", Some(0), tri(), vec![0, 1, 2]),
            piece("hull", None, tri(), vec![0, 1, 2, 2, 1, 0]),
            piece("mast", Some(1), tri(), vec![0, 1, 2]),
        ]);

        assert_eq!(shapes.len(), 2);
        let hull = &shapes[0];
        assert_eq!(hull.name, "hull");
        assert_eq!(hull.vertex_count(), 6);
        assert_eq!(hull.indices, vec![0, 1, 2, 3, 4, 5, 5, 4, 3]);
        assert_eq!(hull.material_ids, vec![0, -1, -1]);
        assert!(hull.validate().is_ok());
        assert_eq!(shapes[1].material_ids, vec![1]);
    }

    #[test]
    fn test_merge_keeps_malformed_piece_separate() {
        let mut broken = tri();
        broken.pop();
        let shapes = merge_shapes(vec![
            piece("hull", Some(0), broken, vec![0, 1, 2]),
            piece("hull", Some(1), tri(), vec![0, 1, 2]),
        ]);

        assert_eq!(shapes.len(), 2);
        assert!(shapes[0].validate().is_err());
        assert!(shapes[1].validate().is_ok());
    }

    #[test]
    fn test_build_model_skips_malformed_shapes() {
        let good = ShapeData {
            name: "good".to_string(),
            positions: tri(),
            indices: vec![0, 1, 2],
            material_ids: vec![0],
            ..Default::default()
        };
        let mut bad = good.clone();
        bad.name = "bad".to_string();
        bad.positions.push(1.0);

        let table = vec![source("paint", "paint.png")];
        let textures = AssetCache::new(FakeTextures::with(&["textures/paint.png"]));
        let model = build_model(&[bad, good], &table, &textures, &AssetConfig::default());

        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.meshes[0].name, "good");
        let material = model.meshes[0].materials[0].material.as_ref().unwrap();
        assert!(material.diffuse_texture.is_some());
        assert_eq!(model.bounding_radius(), 1.0);
    }

    #[test]
    fn test_parse_obj_without_material_library() {
        let obj = "\
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3
f 1 3 4
";
        let dir = tempfile::tempdir().unwrap();
        let (shapes, materials) = parse_obj(&mut Cursor::new(obj), dir.path()).unwrap();

        assert!(materials.is_empty());
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].name, "quad");
        assert_eq!(shapes[0].triangle_count(), 2);
        assert_eq!(shapes[0].material_ids, vec![-1, -1]);
    }

    #[test]
    fn test_parse_obj_with_no_geometry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = parse_obj(&mut Cursor::new("# nothing here\n"), dir.path());
        assert!(matches!(result, Err(ModelLoadError::NoShapes)));
    }

    #[test]
    fn test_missing_material_library_is_not_fatal() {
        let obj = "\
mtllib missing.mtl
o tri
v 0 0 0
v 1 0 0
v 0 1 0
usemtl red
f 1 2 3
";
        let dir = tempfile::tempdir().unwrap();
        let (shapes, materials) = parse_obj(&mut Cursor::new(obj), dir.path()).unwrap();

        assert!(materials.is_empty());
        assert_eq!(shapes[0].material_ids, vec![-1]);
    }

    #[test]
    fn test_missing_model_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let textures = Rc::new(TextureCache::new(TextureLoader::new(dir.path())));
        let loader = ModelLoader::new(AssetConfig::new(dir.path()), textures);

        assert!(matches!(
            loader.load("models/none.obj"),
            Err(ModelLoadError::Io(_))
        ));
    }
}
