//! meshpacker
//!
//! Packs exported meshes, their materials and textures into archives,
//! namespacing every material and texture by its mesh name.

mod discover;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use meshpacker_core::Archive;
use meshpacker_export::{ArchivePacker, PackOptions, PackReport, DEFAULT_CONVERTER_COMMAND};
use meshpacker_parsers::ProjectParser;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

use crate::discover::{resolve_single_asset, SingleAssetArgs};

/// meshpacker - batch mesh, material and texture packer
#[derive(Parser)]
#[command(name = "meshpacker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project file listing the archives to build; overrides the per-mesh options
    project: Option<PathBuf>,

    /// Mesh name (defaults to the mesh description file name)
    #[arg(short, long)]
    name: Option<String>,

    /// Mesh description file (.mesh.xml)
    #[arg(short = 'x', long = "xml")]
    mesh_xml: Option<PathBuf>,

    /// Material file (.material)
    #[arg(short, long)]
    material: Option<PathBuf>,

    /// Output archive (defaults to <name>.zip)
    #[arg(short, long)]
    zip: Option<PathBuf>,

    /// Keep the original files as orig_<file> before rewriting them
    #[arg(short, long)]
    keep: bool,

    /// Mesh conversion tool
    #[arg(long, env = "MESHPACKER_CONVERTER", default_value = DEFAULT_CONVERTER_COMMAND)]
    converter: String,

    /// Show what would be packed without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Output format for the run summary
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,
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

fn setup_logging(verbosity: u8, quiet: bool) {
    let level = match (quiet, verbosity) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_file(verbosity >= 3)
        .with_line_number(verbosity >= 3)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let archives = load_worklist(&cli)?;
    info!("{} archive(s) to build", archives.len());

    if cli.dry_run {
        return print_worklist(&archives, cli.format);
    }

    let options = PackOptions {
        converter: cli.converter,
        keep_originals: cli.keep,
    };
    let packer = ArchivePacker::new(options);
    let reports = packer.pack_all(archives)?;

    print_reports(&reports, cli.format)
}

/// Archives from the project file, or the single archive described by the options
fn load_worklist(cli: &Cli) -> Result<Vec<Archive>> {
    if let Some(project) = &cli.project {
        if cli.name.is_some() || cli.mesh_xml.is_some() || cli.material.is_some() || cli.zip.is_some() {
            warn!("Project file given, ignoring --name/--xml/--material/--zip");
        }
        return ProjectParser::new()
            .parse_file(project)
            .with_context(|| format!("Failed to read project file {}", project.display()));
    }

    let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
    let args = SingleAssetArgs {
        name: cli.name.clone(),
        mesh_xml: cli.mesh_xml.clone(),
        material: cli.material.clone(),
        archive: cli.zip.clone(),
    };
    let archive = resolve_single_asset(&cwd, args)?;
    Ok(vec![archive])
}

fn print_worklist(archives: &[Archive], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(archives)?);
        }
        OutputFormat::Text => {
            println!("Dry run - would build {} archive(s):", archives.len());
            for archive in archives {
                println!("\n{}", archive.path.display());
                for asset in archive.assets.values() {
                    println!("  mesh {}", asset.name);
                    println!("    xml:      {}", asset.mesh_xml_path.display());
                    println!("    material: {}", asset.material_path.display());
                }
                for extra in archive.extras.values() {
                    println!("  extra {} <- {}", extra.target_path, extra.source_path.display());
                }
                if archive.assets.is_empty() {
                    println!("  (no meshes, will be skipped)");
                }
            }
        }
    }
    Ok(())
}

fn print_reports(reports: &[PackReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(reports)?);
        }
        OutputFormat::Text => {
            for report in reports {
                println!("{}", report.archive.display());
                println!("  meshes:          {}", report.assets.join(", "));
                if !report.shared_textures.is_empty() {
                    println!("  shared textures: {}", report.shared_textures.len());
                }
                if !report.extras.is_empty() {
                    println!("  extra files:     {}", report.extras.len());
                }
                for entry in &report.entries {
                    println!("    {}", entry);
                }
            }
            println!("\nTotal: {} archive(s) written", reports.len());
        }
    }
    Ok(())
}
