//! Extract command implementation.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use mdxtract_core::{
    extract, CollisionPolicy, EligibilityPolicy, ExtractOptions, ExtractReport,
};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    /// Keep every file; repeats get `_1`, `_2`, ... suffixes
    AppendSuffix,
    /// Keep only the last file seen for each title
    LastWriterWins,
}

impl From<PolicyArg> for CollisionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::AppendSuffix => CollisionPolicy::AppendSuffix,
            PolicyArg::LastWriterWins => CollisionPolicy::LastWriterWins,
        }
    }
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Directory tree to read markdown from
    pub source: PathBuf,

    /// Flat directory to write .mdx files into (created if missing)
    pub target: PathBuf,

    /// Overwrite output files left by earlier runs
    #[arg(long)]
    pub overwrite: bool,

    /// Category added to newly created frontmatter
    #[arg(long, default_value = "")]
    pub category: String,

    /// Skip files matching this glob, or /regex/ (repeatable)
    #[arg(long = "blacklist", value_name = "PATTERN", conflicts_with = "cjk_only")]
    pub blacklist: Vec<String>,

    /// Only extract files whose names contain CJK characters
    #[arg(long)]
    pub cjk_only: bool,

    /// How repeated titles are handled
    #[arg(long, value_enum, default_value_t = PolicyArg::AppendSuffix)]
    pub policy: PolicyArg,

    /// Prefix last-writer-wins outputs with their sequence number
    #[arg(long)]
    pub numbered: bool,

    /// Directories containing this file are skipped (repeatable)
    #[arg(long = "marker", value_name = "FILE", default_value = "package.json")]
    pub markers: Vec<String>,

    /// Descend into every directory, ignoring project markers
    #[arg(long, conflicts_with = "markers")]
    pub no_markers: bool,

    /// Publish date to write instead of today (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl ExtractArgs {
    fn markers(&self) -> Vec<String> {
        if self.no_markers {
            Vec::new()
        } else {
            self.markers.clone()
        }
    }

    fn options(&self) -> ExtractOptions {
        let eligibility = if self.cjk_only {
            EligibilityPolicy::CjkName
        } else {
            EligibilityPolicy::blacklist(self.blacklist.iter().cloned())
        };

        let mut options = ExtractOptions::default()
            .with_overwrite(self.overwrite)
            .with_category(self.category.clone())
            .with_eligibility(eligibility)
            .with_collisions(self.policy.into())
            .with_numbered(self.numbered)
            .with_project_markers(self.markers());
        if let Some(date) = self.date {
            options = options.with_pub_date(date);
        }
        options
    }
}

/// Run a single extraction from command-line arguments
pub fn extract_files(args: ExtractArgs) -> Result<()> {
    let options = args.options();
    let report = extract(&args.source, &args.target, options)
        .with_context(|| format!("Failed to extract {:?}", args.source))?;
    print_report(&report, args.json)
}

pub(crate) fn print_report(report: &ExtractReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "✓ Converted {} markdown files into {:?}",
        report.copied, report.target
    );
    if report.replaced > 0 {
        println!("  - {} replaced by a later file with the same title", report.replaced);
    }
    if report.skipped_existing > 0 {
        println!("  - {} skipped (target exists, use --overwrite)", report.skipped_existing);
    }
    if report.failed > 0 {
        println!("  - {} failed (see log)", report.failed);
    }
    if report.patterns.is_empty() {
        println!("  - Blacklist patterns: none");
    } else {
        println!("  - Blacklist patterns: {}", report.patterns.join(", "));
    }
    Ok(())
}
