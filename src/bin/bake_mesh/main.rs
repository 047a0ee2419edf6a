use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use mesh_baker::resource_system::file_formats::{animationfile, meshfile, staticmeshfile};
use mesh_baker::{bake_scene, BakedScene, ExportOptions, SceneDescription};

mod utils;
use utils::{ensure_parent_dir_exists, filename_without_extension};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum OutputFormat {
    /// `.itpmesh` and, for skinned scenes, `.itpanim`
    Text,
    /// `.static_mesh` with embedded textures
    Binary,
    #[default]
    Both,
}

/// Bakes a JSON scene description into mesh, skeleton and animation assets.
#[derive(Parser, Debug)]
#[command(name = "bake_mesh", version)]
struct Args {
    /// Scene description to bake.
    input: PathBuf,

    /// Output directory. Defaults to `assets/local/<scene name>`.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Both)]
    format: OutputFormat,

    /// Directory relative texture paths are resolved against. Defaults to
    /// the input file's directory.
    #[arg(long)]
    texture_root: Option<PathBuf>,
}

fn write_text<N>(baked: &BakedScene<N>, out_dir: &Path, name: &str) -> anyhow::Result<()> {
    let mesh_path = out_dir.join(format!("{name}.{}", meshfile::EXTENSION));
    ensure_parent_dir_exists(&mesh_path)?;
    let mut out = BufWriter::new(File::create(&mesh_path)?);
    meshfile::write_mesh(baked, &mut out)?;
    out.flush()?;
    log::info!("wrote {}", mesh_path.display());

    if baked.has_skeleton() {
        let anim_path = out_dir.join(format!("{name}.{}", animationfile::EXTENSION));
        let mut out = BufWriter::new(File::create(&anim_path)?);
        animationfile::write_animation(baked, &mut out)?;
        out.flush()?;
        log::info!("wrote {}", anim_path.display());
    }
    Ok(())
}

fn write_binary<N>(baked: &BakedScene<N>, options: &ExportOptions, out_dir: &Path, name: &str) -> anyhow::Result<()> {
    let path = out_dir.join(format!("{name}.{}", staticmeshfile::EXTENSION));
    let mesh = staticmeshfile::StaticMesh::from_baked(baked, options)?;
    ensure_parent_dir_exists(&path)?;
    mesh.write_to(&path)?;
    log::info!(
        "wrote {} ({} textures embedded)",
        path.display(),
        mesh.header.texture_count
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let name = filename_without_extension(&args.input)
        .with_context(|| format!("no file name in {}", args.input.display()))?
        .to_string();
    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("assets/local/{name}")));
    let options = ExportOptions {
        texture_root: args
            .texture_root
            .clone()
            .or_else(|| args.input.parent().map(Path::to_path_buf)),
    };

    let scene = SceneDescription::load(&args.input)
        .with_context(|| format!("failed to load scene {}", args.input.display()))?;
    log::info!("loaded {} ({} nodes)", args.input.display(), scene.node_count());

    let baked = bake_scene(&scene).with_context(|| format!("failed to bake {}", args.input.display()))?;

    if matches!(args.format, OutputFormat::Text | OutputFormat::Both) {
        write_text(&baked, &out_dir, &name).context("failed to write text assets")?;
    }
    if matches!(args.format, OutputFormat::Binary | OutputFormat::Both) {
        write_binary(&baked, &options, &out_dir, &name).context("failed to write binary asset")?;
    }
    Ok(())
}
