use anyhow::Context;
use canvasfit_common::DeviceLimits;
use canvasfit_observe::SizeObserverRegistry;
use canvasfit_resolve::{DEFAULT_MULTIPLIER, StaticSurface};
use canvasfit_tools::{ReplayScript, SurfaceInspector};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "canvasfit-cli", about = "CLI tool for canvasfit sizing")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Resolve a buffer size for a surface that has not been observed yet
    Resolve {
        /// Intrinsic surface width
        #[arg(long)]
        width: f64,
        /// Intrinsic surface height
        #[arg(long)]
        height: f64,
        /// Layout-to-buffer multiplier
        #[arg(short, long, default_value_t = DEFAULT_MULTIPLIER)]
        multiplier: f64,
        /// Device max texture dimension
        #[arg(long, default_value_t = DeviceLimits::DEFAULT_MAX_TEXTURE_DIMENSION_2D)]
        max_dimension: u32,
    },
    /// Replay a YAML or JSON notification script, resolving every frame
    Replay {
        /// Script path (.yaml/.yml for YAML, anything else JSON)
        script: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Info => {
            println!("canvasfit-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("tools: {}", canvasfit_tools::crate_info());
            println!(
                "default max texture dimension: {}",
                DeviceLimits::default().max_texture_dimension_2d
            );
        }
        Commands::Resolve {
            width,
            height,
            multiplier,
            max_dimension,
        } => {
            let registry = SizeObserverRegistry::new();
            let surface = StaticSurface::new(width, height);
            let summary = SurfaceInspector::summary(
                &registry,
                &surface,
                DeviceLimits::new(max_dimension),
                multiplier,
            );
            println!("{summary}");
        }
        Commands::Replay { script, json } => {
            let loaded = ReplayScript::load(&script)
                .with_context(|| format!("failed to load script {}", script.display()))?;
            tracing::debug!(
                surfaces = loaded.surfaces.len(),
                frames = loaded.frames.len(),
                "replaying {}",
                script.display()
            );
            let report = loaded.run()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Replay: {} frames, max={}, multiplier={}",
                    report.frames.len(),
                    report.limits.max_texture_dimension_2d,
                    report.multiplier
                );
                for frame in &report.frames {
                    let sizes: Vec<String> = frame
                        .sizes
                        .iter()
                        .map(|(name, size)| format!("{name}={size}"))
                        .collect();
                    println!(
                        "  frame {}: applied={} {}",
                        frame.frame,
                        frame.applied,
                        sizes.join(" ")
                    );
                }
                for (name, count) in &report.callbacks {
                    println!("  callback {name}: {count} calls");
                }
            }
        }
    }

    Ok(())
}
