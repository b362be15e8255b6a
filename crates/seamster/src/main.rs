use std::path::{self, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use seamster::{Config, StitchRequest, map_path, stitch_to_disk};

#[derive(Parser)]
#[command(name = "seamster")]
#[command(about = "Stitch JavaScript modules into one namespaced bundle", long_about = None)]
#[command(version)]
struct Args {
    /// Module files to stitch, in bundle order
    files: Vec<PathBuf>,

    /// Global name the stitched modules attach to
    #[arg(short, long)]
    namespace: Option<String>,

    /// Bundle destination path
    #[arg(short, long)]
    destination: Option<PathBuf>,

    /// Project config file (defaults to ./seamster.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mirror the namespace onto module.exports / window
    #[arg(long)]
    expose: bool,

    /// Skip the source map artifact
    #[arg(long)]
    no_source_map: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    /// The command-line layer of the configuration. Flags left at their
    /// defaults stay unset so lower layers show through.
    fn overrides(&self) -> Config {
        Config {
            namespace: self.namespace.clone(),
            files: self.files.clone(),
            destination: self.destination.clone(),
            source_map: self.no_source_map.then_some(false),
            expose: self.expose.then_some(true),
        }
    }
}

fn init_logging(args: &Args) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

/// Resolve request paths against the working directory so relative source
/// references come out right even when inputs mix absolute and relative
/// paths. An empty destination is left alone for request validation to
/// report.
fn absolutize(request: &mut StitchRequest) -> Result<()> {
    for file in &mut request.files {
        *file = path::absolute(&*file)
            .with_context(|| format!("Invalid module path `{}`", file.display()))?;
    }
    if !request.destination.as_os_str().is_empty() {
        request.destination = path::absolute(&request.destination).with_context(|| {
            format!(
                "Invalid destination path `{}`",
                request.destination.display()
            )
        })?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let mut config = Config::layered(args.config.as_deref())?;
    config.merge(args.overrides());
    let mut request = config.into_request();
    absolutize(&mut request)?;

    let bundle = stitch_to_disk(&request)?;
    info!("Wrote bundle `{}`", request.destination.display());
    if bundle.source_map.is_some() {
        info!(
            "Wrote source map `{}`",
            map_path(&request.destination).display()
        );
    }
    Ok(())
}
