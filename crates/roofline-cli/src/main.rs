use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::Parser;
use roofline_pipeline::{reconstruct, ReconstructionConfig, SceneInput};

/// Multi-view roof reconstruction from aerial surveys.
#[derive(Debug, Parser)]
#[command(author, version, about = "Reconstruct 3D roof outlines from an aerial survey")]
struct Args {
    /// Path to the JSON scene file (cameras, terrain, footprints).
    #[arg(long)]
    scene: String,

    /// Optional JSON configuration; omitted sections keep their defaults.
    #[arg(long)]
    config: Option<String>,

    /// Write the report here instead of stdout.
    #[arg(long)]
    output: Option<String>,
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn run_from_files(scene_path: &str, config_path: Option<&str>) -> Result<String> {
    let scene: SceneInput = load_json_file(Path::new(scene_path))?;
    log::info!(
        "loaded {}: {} cameras, {} footprints",
        scene_path,
        scene.cameras.len(),
        scene.footprints.len()
    );
    let config = match config_path {
        Some(path) => load_json_file::<ReconstructionConfig>(Path::new(path))?,
        None => ReconstructionConfig::default(),
    };
    let report = reconstruct(scene, &config)?;
    log::info!(
        "reconstructed {} building groups, {} solved edges",
        report.summary.building_groups,
        report.summary.solved_edges
    );
    Ok(serde_json::to_string_pretty(&report)?)
}

fn main() {
    env_logger::init();
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    let json = run_from_files(&args.scene, args.config.as_deref())?;
    match args.output {
        Some(path) => fs::write(&path, json).with_context(|| format!("writing {path}"))?,
        None => println!("{json}"),
    }
    Ok(())
}
