//! gltfcomp CLI
//!
//! Command-line interface for exporting JSON scene descriptions to glTF and
//! inspecting what the extraction pipeline produces for them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use gltfcomp_core::{CompressionOptions, SceneExportPackage};
use gltfcomp_export::logging::{self, TracingConfig};
use gltfcomp_export::{
    ExportOrchestrator, ExportRequest, ExportSummary, GltfBackend, GltfOptions, InMemoryScene, PackageStats,
};

/// gltfcomp - compressed glTF export for 3D scenes
#[derive(Parser)]
#[command(name = "gltfcomp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Export a scene to glTF
    Export(ExportArgs),

    /// Run the extraction pipeline and report per-object statistics
    Inspect(InspectArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Path to the JSON scene description
    #[arg(short, long)]
    scene: PathBuf,

    /// Output file (.gltf or .glb); its directory is created if missing
    #[arg(short, long)]
    output: PathBuf,

    /// Export only selected objects
    #[arg(long)]
    selected_only: bool,

    /// Disable Draco mesh compression
    #[arg(long)]
    no_draco: bool,

    /// Draco compression level (1-9)
    #[arg(long, default_value_t = 5)]
    draco_level: u8,

    /// Write textures as PNG instead of JPEG
    #[arg(long)]
    no_jpeg: bool,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = 75)]
    jpeg_quality: u8,

    /// Bundle the output files into a ZIP archive
    #[arg(long)]
    zip: bool,

    /// Keep the scene's Z-up axis instead of converting to Y-up
    #[arg(long)]
    keep_z_up: bool,
}

impl ExportArgs {
    fn compression_options(&self) -> CompressionOptions {
        CompressionOptions {
            draco_enabled: !self.no_draco,
            draco_level: self.draco_level,
            jpeg_enabled: !self.no_jpeg,
            jpeg_quality: self.jpeg_quality,
            zip_enabled: self.zip,
        }
    }
}

#[derive(Args)]
struct InspectArgs {
    /// Path to the JSON scene description
    #[arg(short, long)]
    scene: PathBuf,

    /// Only consider selected objects
    #[arg(long)]
    selected_only: bool,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let mut config = TracingConfig::with_level(level);
    config.show_target = verbosity >= 2;
    config.show_thread_ids = verbosity >= 3;
    config.show_file = verbosity >= 3;
    config.show_line_number = verbosity >= 3;

    logging::init_with_config(config);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Export(args) => cmd_export(args),
        Commands::Inspect(args) => cmd_inspect(args),
    }
}

fn load_scene(path: &Path) -> Result<InMemoryScene> {
    info!("Loading scene: {:?}", path);
    InMemoryScene::from_json_file(path).with_context(|| format!("Failed to load scene {:?}", path))
}

fn cmd_export(args: ExportArgs) -> Result<()> {
    let scene = load_scene(&args.scene)?;

    let backend = GltfBackend::new(GltfOptions {
        convert_z_up: !args.keep_z_up,
        ..Default::default()
    });
    let request = ExportRequest::new(&args.output)
        .with_options(args.compression_options())
        .with_selected_only(args.selected_only);

    let summary = ExportOrchestrator::new(backend)
        .export(&scene, &request)
        .context("Export failed")?;

    println!(
        "Exported {} object(s) to {}",
        summary.exported_objects,
        primary_output(&summary).display()
    );

    Ok(())
}

/// File the success line names: the backend's main output, else the requested path
fn primary_output(summary: &ExportSummary) -> &Path {
    summary
        .report
        .files
        .first()
        .map(PathBuf::as_path)
        .unwrap_or(&summary.output_path)
}

fn cmd_inspect(args: InspectArgs) -> Result<()> {
    let scene = load_scene(&args.scene)?;

    let orchestrator = ExportOrchestrator::new(GltfBackend::default());
    let (package, stats) = orchestrator.build_package(&scene, args.selected_only);

    match args.format {
        OutputFormat::Json => print_inspect_json(&package, &stats)?,
        OutputFormat::Text => print_inspect_text(&package, &stats),
    }

    Ok(())
}

fn material_texture_count(package: &SceneExportPackage, mesh: usize) -> usize {
    package.meshes[mesh]
        .materials
        .iter()
        .map(|m| m.textures.len())
        .sum()
}

fn inspect_json(package: &SceneExportPackage, stats: &PackageStats) -> serde_json::Value {
    let objects: Vec<_> = package
        .meshes
        .iter()
        .enumerate()
        .map(|(i, record)| {
            serde_json::json!({
                "object": record.object_name,
                "mesh": record.local_name,
                "triangles": record.mesh.triangle_count(),
                "vertices": record.mesh.vertex_count(),
                "has_uvs": record.mesh.has_uvs(),
                "size": record.mesh.bounds().map(|b| b.size()),
                "materials": record.materials.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
                "textures": material_texture_count(package, i),
            })
        })
        .collect();

    serde_json::json!({
        "objects": objects,
        "exported": stats.exported_objects,
        "skipped": stats.skipped_objects,
        "failed": stats.failed_objects,
        "textures": package.textures.len(),
    })
}

fn print_inspect_json(package: &SceneExportPackage, stats: &PackageStats) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&inspect_json(package, stats))?);
    Ok(())
}

fn print_inspect_text(package: &SceneExportPackage, stats: &PackageStats) {
    println!(
        "{:<24} {:>10} {:>10} {:>10} {:>10}",
        "Object", "Triangles", "Vertices", "Materials", "Textures"
    );
    println!("{:-<24} {:->10} {:->10} {:->10} {:->10}", "", "", "", "", "");
    for (i, record) in package.meshes.iter().enumerate() {
        println!(
            "{:<24} {:>10} {:>10} {:>10} {:>10}",
            record.object_name,
            record.mesh.triangle_count(),
            record.mesh.vertex_count(),
            record.materials.len(),
            material_texture_count(package, i)
        );
    }
    println!();
    println!(
        "Exported: {}  Skipped: {}  Failed: {}  Textures: {}",
        stats.exported_objects,
        stats.skipped_objects,
        stats.failed_objects,
        package.textures.len()
    );
}
