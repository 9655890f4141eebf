//! Fix-images command implementation.

use anyhow::{Context, Result};
use clap::Args;
use mdxtract_core::{relocate_images, ImageJob};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct FixImagesArgs {
    /// Tree to collect images from
    #[arg(long)]
    pub images: PathBuf,

    /// Directory the renamed copies are written to
    #[arg(long)]
    pub dest: PathBuf,

    /// Directory of .mdx files whose image links are rewritten
    #[arg(long)]
    pub mdx: PathBuf,

    /// Prefix for the new image file names
    #[arg(long, default_value = "img")]
    pub prefix: String,

    /// Public URL prefix under which DEST is served
    #[arg(long, default_value = "/img/")]
    pub url_prefix: String,

    /// Relative link prefix to rewrite
    #[arg(long, default_value = "./assets/")]
    pub assets_prefix: String,

    /// Image extension to collect (repeatable)
    #[arg(long = "ext", value_name = "EXT", default_value = "png")]
    pub extensions: Vec<String>,

    /// Also write a shell script that deletes the original images
    #[arg(long)]
    pub cleanup_script: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn fix_images(args: FixImagesArgs) -> Result<()> {
    let mut job = ImageJob::new(&args.images, &args.dest, &args.mdx);
    job.prefix = args.prefix;
    job.url_prefix = args.url_prefix;
    job.assets_prefix = args.assets_prefix;
    job.extensions = args.extensions;
    job.cleanup_script = args.cleanup_script;

    let report = relocate_images(&job)
        .with_context(|| format!("Failed to relocate images from {:?}", args.images))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("✓ Done");
    println!("  - Copied images: {}", report.relocated.len());
    println!("  - Updated MDX files: {}", report.updated_files.len());
    if !report.unresolved.is_empty() {
        println!("  - Unresolved image links: {}", report.unresolved.len());
    }
    if let Some(script) = &report.cleanup_script {
        println!("  - Cleanup script: {:?} (run with: bash {})", script, script.display());
    }
    Ok(())
}
