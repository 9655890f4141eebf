//! # mdxtract CLI
//!
//! Command-line interface for flattening markdown trees into blog-ready MDX.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mdxtract")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the job file
    #[arg(long, default_value = "mdxtract.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an example job file
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Convert every eligible .md file under SOURCE into .mdx files in TARGET
    Extract(commands::ExtractArgs),

    /// Run the jobs listed in the job file
    Run {
        /// Only run the job with this name
        #[arg(long)]
        job: Option<String>,

        /// Print each report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename files and directories recursively by substitution
    Rename {
        /// Directory to process (its own name is kept)
        dir: PathBuf,

        /// Text (or regex with --regex) to search for in each name
        search: String,

        /// Replacement text; with --regex, `$1` refers to capture groups
        replace: String,

        /// Treat SEARCH as a regex and replace every match
        #[arg(long)]
        regex: bool,

        /// Log planned renames without touching the filesystem
        #[arg(long)]
        dry_run: bool,
    },

    /// Copy images into a public directory and rewrite MDX links to them
    FixImages(commands::FixImagesArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::Extract(args) => commands::extract_files(args),
        Commands::Run { job, json } => commands::run_jobs(&cli.config, job.as_deref(), json),
        Commands::Rename {
            dir,
            search,
            replace,
            regex,
            dry_run,
        } => commands::rename_tree(&dir, &search, &replace, regex, dry_run),
        Commands::FixImages(args) => commands::fix_images(args),
    }
}
