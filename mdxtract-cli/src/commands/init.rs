//! Init command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = include_str!("../../../mdxtract.yml.example");

/// Write an example job file
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    let config_path = root.join("mdxtract.yml");
    if config_path.exists() {
        println!("mdxtract.yml already exists at {:?}", config_path);
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {:?}", config_path))?;
    println!("✓ Created {:?}", config_path);
    println!("  - Edit the jobs, then run: mdxtract run");
    Ok(())
}
