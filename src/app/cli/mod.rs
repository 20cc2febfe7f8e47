//! CLI Adapter.

mod logging;

use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::api::{self, BuildOptions, DEFAULT_MANIFEST};
use crate::domain::AppError;

#[derive(Parser)]
#[command(name = "tfmart")]
#[command(version)]
#[command(about = "Assemble Terraform workspaces from packaged modules", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, render and wire the modules of an installation
    #[clap(visible_alias = "b")]
    Build {
        /// Repository name of the installation
        repository: String,
        /// Installation manifest
        #[arg(short, long, default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,
        /// Directory the workspace is created under
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
        /// Tool configuration file (defaults to ./tfmart.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Render a template read from stdin against an installation's context
    #[clap(visible_alias = "t")]
    Template {
        /// Repository name of the installation
        repository: String,
        /// Installation manifest
        #[arg(short, long, default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,
    },
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result: Result<(), AppError> = match cli.command {
        Commands::Build { repository, manifest, dir, config } => {
            run_build(BuildOptions { repository, manifest, base_dir: dir, config })
        }
        Commands::Template { repository, manifest } => run_template(&repository, manifest),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_build(options: BuildOptions) -> Result<(), AppError> {
    let outcome = api::build(&options)?;
    println!(
        "✅ Assembled {} module(s) into {}",
        outcome.modules.len(),
        outcome.aggregate_file.display()
    );
    Ok(())
}

fn run_template(repository: &str, manifest: PathBuf) -> Result<(), AppError> {
    let mut template = String::new();
    io::stdin().read_to_string(&mut template)?;
    let rendered = api::render_template(&manifest, repository, &template)?;
    print!("{}", rendered);
    Ok(())
}
