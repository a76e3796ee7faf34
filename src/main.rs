//! bamcraft CLI
//!
//! Command-line interface for converting authored scene documents into
//! virtual scene graphs ready for a binary container writer.

use std::collections::BTreeMap;
use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use bamcraft_export::json::JsonGraphSink;
use bamcraft_export::{BamVersion, ExportSession, ExportSettings, GraphSink};
use bamcraft_scene::{ObjectData, Scene};

/// bamcraft - scene to binary-scene-graph conversion tool
#[derive(Parser)]
#[command(name = "bamcraft")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a scene document into a scene graph
    Export(ExportArgs),

    /// Show information about a scene document
    Info(InfoArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Path to the scene document (JSON)
    scene: PathBuf,

    /// Output file for the converted graph
    #[arg(short, long)]
    output: PathBuf,

    /// Texture materialization mode: absolute, relative or copy
    #[arg(long, default_value = "copy")]
    tex_mode: String,

    /// Folder beside the output file that copy mode writes textures into
    #[arg(long, default_value = "tex")]
    tex_copy_path: String,

    /// Use the conventional material encoding instead of the packed
    /// physically-based one
    #[arg(long)]
    conventional: bool,

    /// Container format version passed through to the writer
    #[arg(long, default_value = "6.41")]
    bam_version: String,

    /// Pretty-print the output document
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Path to the scene document (JSON)
    scene: PathBuf,
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_file(verbosity >= 3)
        .with_line_number(verbosity >= 3)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Export(args) => cmd_export(args),
        Commands::Info(args) => cmd_info(args),
    }
}

fn load_scene(path: &PathBuf) -> Result<Scene> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene document {}", path.display()))?;
    serde_json::from_str(&text).context("Failed to parse scene document")
}

fn cmd_export(args: ExportArgs) -> Result<()> {
    info!("Loading scene: {:?}", args.scene);
    let scene = load_scene(&args.scene)?;

    let settings = ExportSettings {
        tex_mode: args.tex_mode.parse()?,
        tex_copy_path: args.tex_copy_path,
        use_pbs: !args.conventional,
        bam_version: BamVersion::parse(&args.bam_version)?,
    };
    let version = settings.bam_version;

    let start = Instant::now();
    let mut session = ExportSession::new(settings, &args.output);
    let root = session.build(&scene.objects)?;

    let file = fs::File::create(&args.output)
        .with_context(|| format!("Failed to create output file {}", args.output.display()))?;
    let mut sink = JsonGraphSink::new(BufWriter::new(file), args.pretty);
    sink.write_graph(&root, version)?;

    println!("{}", "-".repeat(79));
    println!(
        "Export finished in {:.4} seconds.",
        start.elapsed().as_secs_f64()
    );
    println!("{}", session.stats());
    println!("{}", "-".repeat(79));
    Ok(())
}

fn cmd_info(args: InfoArgs) -> Result<()> {
    let scene = load_scene(&args.scene)?;

    let name = if scene.name.is_empty() {
        args.scene.display().to_string()
    } else {
        scene.name.clone()
    };
    println!("Scene: {}", name);
    println!("Objects: {}", scene.objects.len());

    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    let mut triangles = 0usize;
    for object in &scene.objects {
        *kinds.entry(object.kind_name()).or_default() += 1;
        if let ObjectData::Mesh(mesh) = &object.data {
            triangles += mesh.triangle_count();
        }
    }

    for (kind, count) in &kinds {
        println!("  {:<10} {}", kind, count);
    }
    println!("Triangles: {}", triangles);
    Ok(())
}
