//! CLI tool for inspecting how models load
//!
//! Usage: cargo run --bin inspect_model <asset_root> <model.obj>...
//!
//! If `<asset_root>/assets.json` exists it is used as the asset config.

use engine_assets::config::AssetConfig;
use engine_assets::graphics::{Mesh, Model};
use engine_assets::prelude::AssetStore;
use std::env;
use std::path::Path;
use std::process;

fn main() {
    engine_assets::init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <asset_root> <model.obj>...", args[0]);
        eprintln!("\nLoads each model through the asset cache and prints its meshes,");
        eprintln!("material ranges and bounding volume.");
        eprintln!("\nExample:");
        eprintln!("  {} game/assets models/crate.obj", args[0]);
        process::exit(1);
    }

    let config = load_config(Path::new(&args[1]));
    let store = AssetStore::new(config);
    let mut all_loaded = true;

    for key in &args[2..] {
        println!("=== {key} ===");
        match store.model(key) {
            Some(model) => print_model(&model),
            None => {
                eprintln!("✗ Failed to load model '{key}'");
                all_loaded = false;
            }
        }
    }

    println!("Textures alive: {}", store.textures.live_count());

    if !all_loaded {
        process::exit(1);
    }
}

fn load_config(asset_root: &Path) -> AssetConfig {
    let config_path = asset_root.join("assets.json");
    if !config_path.exists() {
        return AssetConfig::new(asset_root);
    }

    match AssetConfig::load_from_file(&config_path) {
        Ok(mut config) => {
            if config.asset_root.is_relative() {
                config.asset_root = asset_root.join(&config.asset_root);
            }
            config
        }
        Err(e) => {
            eprintln!("✗ Ignoring {}: {e}", config_path.display());
            AssetConfig::new(asset_root)
        }
    }
}

fn print_model(model: &Model) {
    println!("✓ Model loaded");
    println!("  Meshes: {}", model.meshes.len());
    println!("  Vertices: {}", model.vertex_count());
    println!("  Triangles: {}", model.triangle_count());
    println!("  Bounding radius: {:.4}", model.bounding_radius());
    println!("  Bounding box: {} .. {}", model.bounds.min, model.bounds.max);

    for mesh in &model.meshes {
        print_mesh(mesh);
    }
}

fn print_mesh(mesh: &Mesh) {
    println!(
        "  - {} ({} vertices, {} triangles, normals: {}, uvs: {})",
        mesh.name,
        mesh.vertex_count(),
        mesh.triangle_count(),
        !mesh.normals.is_empty(),
        !mesh.uvs.is_empty()
    );

    for range in &mesh.materials {
        let material = match &range.material {
            Some(material) => {
                let textured = if material.has_textures() { ", textured" } else { "" };
                format!("{}{textured}", material.name)
            }
            None => "<none>".to_string(),
        };
        println!(
            "      [{:>6}, {:>6})  {:>6} triangles  {material}",
            range.range.start,
            range.range.end,
            range.range.triangle_count()
        );
    }
}
