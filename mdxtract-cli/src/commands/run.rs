//! Run command: execute the jobs listed in the job file.

use super::extract::print_report;
use anyhow::{bail, Context, Result};
use mdxtract_core::{extract, Config};
use std::path::Path;

/// Run every job (or the named one) from the job file, each with a fresh
/// extractor. A job whose source is missing does not stop the others.
pub fn run_jobs(config_path: &Path, only: Option<&str>, json: bool) -> Result<()> {
    tracing::info!("Loading jobs from {:?}", config_path);
    let config = Config::from_file(config_path).context("Failed to load job file")?;

    let jobs = match only {
        Some(name) => vec![config.resolve(config.job(name)?)?],
        None => config.resolve_all()?,
    };

    if jobs.is_empty() {
        println!("No jobs defined in {:?}", config_path);
        return Ok(());
    }

    let mut failed = Vec::new();
    for job in jobs {
        tracing::info!("Running job '{}'", job.name);
        match extract(&job.source, &job.target, job.options) {
            Ok(report) => print_report(&report, json)?,
            Err(err) => {
                tracing::error!("Job '{}' failed: {}", job.name, err);
                failed.push(job.name);
            }
        }
    }

    if !failed.is_empty() {
        bail!("{} job(s) failed: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}
