//! Rename command implementation.

use anyhow::{Context, Result};
use mdxtract_core::{rename_recursively, Replacement};
use std::path::Path;

pub fn rename_tree(dir: &Path, search: &str, replace: &str, regex: bool, dry_run: bool) -> Result<()> {
    let replacement = if regex {
        Replacement::regex(search, replace)
            .with_context(|| format!("Invalid regex: {}", search))?
    } else {
        Replacement::literal(search, replace)
    };

    let report = rename_recursively(dir, &replacement, dry_run)?;

    let verb = if dry_run { "Would rename" } else { "Renamed" };
    println!("✓ {} {} entries under {:?}", verb, report.renamed.len(), dir);
    if report.failed > 0 {
        println!("  - {} failed (see log)", report.failed);
    }
    Ok(())
}
