//! Surface materials resolved from a model's material table
//!
//! A [`MaterialSource`] is the record the OBJ parser hands us. Resolving it
//! copies its scalar fields and turns every texture name into a shared handle
//! from the texture cache. Textures that fail to load leave their slot empty.

use bytemuck::{Pod, Zeroable};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use tracing::{debug, warn};

use crate::assets::cache::{AssetCache, AssetLoader};
use crate::assets::texture::Texture;
use crate::config::AssetConfig;

/// Material id used by shapes for triangles without a material
pub const NO_MATERIAL: i32 = -1;

/// Material record as read from a material library
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSource {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub transmittance: [f32; 3],
    pub emission: [f32; 3],
    pub shininess: f32,
    pub ior: f32,
    pub dissolve: f32,
    pub ambient_texture: String,
    pub diffuse_texture: String,
    pub specular_texture: String,
    pub normal_texture: String,
    /// Statements the parser did not recognise, keyed by statement name
    pub parameters: BTreeMap<String, String>,
}

impl Default for MaterialSource {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: [0.0; 3],
            diffuse: [0.0; 3],
            specular: [0.0; 3],
            transmittance: [0.0; 3],
            emission: [0.0; 3],
            shininess: 1.0,
            ior: 1.0,
            dissolve: 1.0,
            ambient_texture: String::new(),
            diffuse_texture: String::new(),
            specular_texture: String::new(),
            normal_texture: String::new(),
            parameters: BTreeMap::new(),
        }
    }
}

impl From<&tobj::Material> for MaterialSource {
    fn from(material: &tobj::Material) -> Self {
        let defaults = Self::default();
        let parameters: BTreeMap<String, String> = material
            .unknown_param
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        // tobj has no fields for these two, it leaves them with the unknown statements
        let transmittance = parameters
            .get("Tf")
            .and_then(|value| parse_color(value))
            .unwrap_or(defaults.transmittance);
        let emission = parameters
            .get("Ke")
            .and_then(|value| parse_color(value))
            .unwrap_or(defaults.emission);

        Self {
            name: material.name.clone(),
            ambient: material.ambient.unwrap_or(defaults.ambient),
            diffuse: material.diffuse.unwrap_or(defaults.diffuse),
            specular: material.specular.unwrap_or(defaults.specular),
            transmittance,
            emission,
            shininess: material.shininess.unwrap_or(defaults.shininess),
            ior: material.optical_density.unwrap_or(defaults.ior),
            dissolve: material.dissolve.unwrap_or(defaults.dissolve),
            ambient_texture: material.ambient_texture.clone().unwrap_or_default(),
            diffuse_texture: material.diffuse_texture.clone().unwrap_or_default(),
            specular_texture: material.specular_texture.clone().unwrap_or_default(),
            normal_texture: material.normal_texture.clone().unwrap_or_default(),
            parameters,
        }
    }
}

/// Parse an `r g b` triple. A single value is used for all three channels.
fn parse_color(value: &str) -> Option<[f32; 3]> {
    let components = value
        .split_whitespace()
        .map(str::parse::<f32>)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    match components.as_slice() {
        [v] => Some([*v; 3]),
        [r, g, b, ..] => Some([*r, *g, *b]),
        _ => None,
    }
}

/// Material used to draw a range of a mesh
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub transmittance: [f32; 3],
    pub emission: [f32; 3],
    pub shininess: f32,
    pub index_of_refraction: f32,
    pub opacity: f32,
    pub ambient_texture: Option<Rc<Texture>>,
    pub diffuse_texture: Option<Rc<Texture>>,
    pub specular_texture: Option<Rc<Texture>>,
    pub normal_texture: Option<Rc<Texture>>,
    /// Unrecognised material statements, passed through unchanged
    pub parameters: BTreeMap<String, String>,
}

impl Material {
    /// Resolve a material record, loading its textures through `textures`
    pub fn load<L>(source: &MaterialSource, textures: &AssetCache<L>, config: &AssetConfig) -> Self
    where
        L: AssetLoader<Asset = Texture>,
    {
        let texture = |name: &str| -> Option<Rc<Texture>> {
            if name.trim().is_empty() {
                return None;
            }
            match config.texture_key(name) {
                Ok(key) => textures.cache(&key),
                Err(e) => {
                    warn!(material = %source.name, texture = name, error = %e, "Skipping texture");
                    None
                }
            }
        };

        Self {
            name: source.name.clone(),
            ambient: source.ambient,
            diffuse: source.diffuse,
            specular: source.specular,
            transmittance: source.transmittance,
            emission: source.emission,
            shininess: source.shininess,
            index_of_refraction: source.ior,
            opacity: source.dissolve,
            ambient_texture: texture(&source.ambient_texture),
            diffuse_texture: texture(&source.diffuse_texture),
            specular_texture: texture(&source.specular_texture),
            normal_texture: texture(&source.normal_texture),
            parameters: source.parameters.clone(),
        }
    }

    /// Whether any texture slot is filled
    pub fn has_textures(&self) -> bool {
        self.ambient_texture.is_some()
            || self.diffuse_texture.is_some()
            || self.specular_texture.is_some()
            || self.normal_texture.is_some()
    }
}

/// Resolves material ids of one mesh, each distinct id exactly once
pub struct MaterialResolver<'a, L: AssetLoader<Asset = Texture>> {
    table: &'a [MaterialSource],
    textures: &'a AssetCache<L>,
    config: &'a AssetConfig,
    resolved: HashMap<i32, Option<Rc<Material>>>,
}

impl<'a, L: AssetLoader<Asset = Texture>> MaterialResolver<'a, L> {
    pub fn new(
        table: &'a [MaterialSource],
        textures: &'a AssetCache<L>,
        config: &'a AssetConfig,
    ) -> Self {
        Self {
            table,
            textures,
            config,
            resolved: HashMap::new(),
        }
    }

    /// Material for `id`, or `None` for [`NO_MATERIAL`] and unknown ids
    pub fn resolve(&mut self, id: i32) -> Option<Rc<Material>> {
        if id == NO_MATERIAL {
            return None;
        }
        if let Some(material) = self.resolved.get(&id) {
            return material.clone();
        }

        let material = match usize::try_from(id).ok().and_then(|i| self.table.get(i)) {
            Some(source) => {
                debug!(material = %source.name, id, "Resolving material");
                Some(Rc::new(Material::load(source, self.textures, self.config)))
            }
            None => {
                warn!(id, table_len = self.table.len(), "Material id out of range");
                None
            }
        };
        self.resolved.insert(id, material.clone());
        material
    }

    /// Number of distinct ids resolved so far
    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }
}

/// Material data for GPU uniform buffer
///
/// Laid out as four vec4s so it needs no padding under std140.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    /// Diffuse color, opacity in w
    pub diffuse: [f32; 4],
    /// Ambient color, index of refraction in w
    pub ambient: [f32; 4],
    /// Specular color, shininess in w
    pub specular: [f32; 4],
    /// Emissive color, w unused
    pub emission: [f32; 4],
}

impl From<&Material> for MaterialUniform {
    fn from(material: &Material) -> Self {
        let [dr, dg, db] = material.diffuse;
        let [ar, ag, ab] = material.ambient;
        let [sr, sg, sb] = material.specular;
        let [er, eg, eb] = material.emission;
        Self {
            diffuse: [dr, dg, db, material.opacity],
            ambient: [ar, ag, ab, material.index_of_refraction],
            specular: [sr, sg, sb, material.shininess],
            emission: [er, eg, eb, 0.0],
        }
    }
}
