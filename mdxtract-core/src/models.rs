//! Data types shared by the extraction stages.

use crate::filter::EligibilityPolicy;
use crate::registry::CollisionPolicy;
use crate::walker::DEFAULT_PROJECT_MARKER;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A markdown file discovered under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File name without extension.
    pub stem: String,
    pub dir: PathBuf,
}

impl SourceFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self { path, stem, dir }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Parameters for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub overwrite: bool,
    /// Written into synthesized frontmatter only; empty means none.
    pub category: String,
    pub eligibility: EligibilityPolicy,
    pub collisions: CollisionPolicy,
    /// Prefix outputs with their sequence number under last-writer-wins.
    pub numbered: bool,
    pub project_markers: Vec<String>,
    pub pub_date: NaiveDate,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            category: String::new(),
            eligibility: EligibilityPolicy::default(),
            collisions: CollisionPolicy::default(),
            numbered: false,
            project_markers: vec![DEFAULT_PROJECT_MARKER.to_string()],
            pub_date: chrono::Utc::now().date_naive(),
        }
    }
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_eligibility(mut self, eligibility: EligibilityPolicy) -> Self {
        self.eligibility = eligibility;
        self
    }

    pub fn with_collisions(mut self, collisions: CollisionPolicy) -> Self {
        self.collisions = collisions;
        self
    }

    pub fn with_numbered(mut self, numbered: bool) -> Self {
        self.numbered = numbered;
        self
    }

    pub fn with_project_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.project_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pub_date(mut self, pub_date: NaiveDate) -> Self {
        self.pub_date = pub_date;
        self
    }
}

/// Why a file produced no output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Rejected by the eligibility policy.
    Ineligible { detail: String },
    /// Target exists from an earlier run and overwrite is off.
    TargetExists { target: PathBuf },
}

/// The result of processing one walked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    Written {
        source: PathBuf,
        target: PathBuf,
    },
    /// Last-writer-wins: an earlier output for the same title was deleted.
    Replaced {
        source: PathBuf,
        target: PathBuf,
        removed: PathBuf,
    },
    Skipped {
        source: PathBuf,
        reason: SkipReason,
    },
    Failed {
        source: PathBuf,
        error: String,
        /// Earlier output already deleted before the failure.
        #[serde(skip_serializing_if = "Option::is_none")]
        removed: Option<PathBuf>,
    },
}

/// Summary of one extraction run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractReport {
    pub source: PathBuf,
    pub target: PathBuf,
    /// Output files surviving at the end of the run.
    pub copied: usize,
    pub replaced: usize,
    pub skipped_existing: usize,
    pub ineligible: usize,
    pub failed: usize,
    /// Blacklist patterns in effect; empty for the CJK policy.
    pub patterns: Vec<String>,
    pub outcomes: Vec<FileOutcome>,
}

impl ExtractReport {
    pub(crate) fn record(&mut self, outcome: FileOutcome) {
        match &outcome {
            FileOutcome::Written { .. } => self.copied += 1,
            FileOutcome::Replaced { .. } => {
                self.copied += 1;
                self.replaced += 1;
            }
            FileOutcome::Skipped {
                reason: SkipReason::Ineligible { .. },
                ..
            } => self.ineligible += 1,
            FileOutcome::Skipped {
                reason: SkipReason::TargetExists { .. },
                ..
            } => self.skipped_existing += 1,
            FileOutcome::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Account for an earlier output deleted in favour of a newer file.
    pub(crate) fn record_removal(&mut self) {
        self.copied = self.copied.saturating_sub(1);
    }

    /// Output paths that still exist after the run, in write order.
    pub fn outputs(&self) -> Vec<&Path> {
        let mut outputs: Vec<&Path> = Vec::new();
        for outcome in &self.outcomes {
            match outcome {
                FileOutcome::Written { target, .. } => outputs.push(target),
                FileOutcome::Replaced {
                    target, removed, ..
                } => {
                    outputs.retain(|p| *p != removed.as_path());
                    outputs.push(target);
                }
                FileOutcome::Failed {
                    removed: Some(removed),
                    ..
                } => outputs.retain(|p| *p != removed.as_path()),
                _ => {}
            }
        }
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_file_parts() {
        let file = SourceFile::from_path("docs/guide/01-Intro.md");
        assert_eq!(file.stem, "01-Intro");
        assert_eq!(file.dir, PathBuf::from("docs/guide"));
        assert_eq!(file.file_name(), "01-Intro.md");
    }

    #[test]
    fn test_options_defaults() {
        let opts = ExtractOptions::default();
        assert!(!opts.overwrite);
        assert!(opts.category.is_empty());
        assert_eq!(opts.collisions, CollisionPolicy::AppendSuffix);
        assert_eq!(opts.project_markers, vec!["package.json".to_string()]);
        assert!(opts.eligibility.patterns().is_empty());
    }

    #[test]
    fn test_outputs_drop_replaced_files() {
        let mut report = ExtractReport::default();
        report.record(FileOutcome::Written {
            source: "a/Guide.md".into(),
            target: "out/Guide.mdx".into(),
        });
        report.record(FileOutcome::Written {
            source: "a/Intro.md".into(),
            target: "out/Intro.mdx".into(),
        });
        report.record_removal();
        report.record(FileOutcome::Replaced {
            source: "b/Guide.md".into(),
            target: "out/Guide.mdx".into(),
            removed: "out/Guide.mdx".into(),
        });

        assert_eq!(report.copied, 2);
        assert_eq!(report.replaced, 1);
        assert_eq!(
            report.outputs(),
            vec![Path::new("out/Intro.mdx"), Path::new("out/Guide.mdx")]
        );
    }
}
