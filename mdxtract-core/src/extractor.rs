//! Extraction driver: walk → filter → transform → write.
//!
//! One [`Extractor`] is one run. Its [`Registry`] lives exactly as long as the
//! run, so repeated runs never share state except through the filesystem.

use crate::filter::Eligibility;
use crate::frontmatter::{apply_frontmatter, FrontmatterFields};
use crate::heading::strip_title_heading;
use crate::models::{ExtractOptions, ExtractReport, FileOutcome, SkipReason, SourceFile};
use crate::registry::{Registry, Slot};
use crate::title::CanonicalTitle;
use crate::walker::SourceWalker;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a whole run before any file is processed.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Source path does not exist: {0:?}")]
    SourceMissing(PathBuf),

    #[error("Failed to create target directory {path:?}: {source}")]
    CreateTarget {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors confined to a single file; the run continues past them.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove {path:?}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Transform raw markdown into MDX content for `title`.
///
/// A leading `# <title>` heading is dropped, then the frontmatter is
/// synthesized or merged.
pub fn render_mdx(content: &str, title: &CanonicalTitle, options: &ExtractOptions) -> String {
    let body = strip_title_heading(content, title.as_str());
    let fields = FrontmatterFields::new(title.as_str(), options.pub_date)
        .with_category(options.category.as_str());
    apply_frontmatter(&body, &fields)
}

pub struct Extractor {
    source: PathBuf,
    target: PathBuf,
    options: ExtractOptions,
    registry: Registry,
    report: ExtractReport,
}

impl Extractor {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>, options: ExtractOptions) -> Self {
        let source = source.into();
        let target = target.into();
        let registry = Registry::new(options.collisions, options.numbered);
        let report = ExtractReport {
            source: source.clone(),
            target: target.clone(),
            patterns: options.eligibility.patterns().to_vec(),
            ..ExtractReport::default()
        };
        Self {
            source,
            target,
            options,
            registry,
            report,
        }
    }

    /// Run the extraction to completion.
    ///
    /// Only a missing source root or an uncreatable target directory is an
    /// error; every per-file problem is logged and recorded in the report.
    pub fn run(mut self) -> Result<ExtractReport, ExtractError> {
        self.prepare()?;

        let walker = SourceWalker::with_markers(&self.source, self.options.project_markers.clone());
        for entry in walker {
            match entry {
                Ok(path) => {
                    let outcome = self.process(&path);
                    self.report.record(outcome);
                }
                Err(err) => {
                    let source = err.path().map(Path::to_path_buf).unwrap_or_default();
                    let err = FileError::from(err);
                    tracing::error!("{}", err);
                    self.report.record(FileOutcome::Failed {
                        source,
                        error: err.to_string(),
                        removed: None,
                    });
                }
            }
        }

        tracing::info!(
            "Extraction complete: {} markdown files converted to .mdx in {:?}",
            self.report.copied,
            self.target
        );
        if self.report.patterns.is_empty() {
            tracing::info!("Blacklist patterns: none");
        } else {
            tracing::info!("Blacklist patterns: {}", self.report.patterns.join(", "));
        }

        Ok(self.report)
    }

    fn prepare(&self) -> Result<(), ExtractError> {
        if !self.source.exists() {
            tracing::error!("Source path does not exist: {:?}", self.source);
            return Err(ExtractError::SourceMissing(self.source.clone()));
        }

        if !self.target.exists() {
            fs::create_dir_all(&self.target).map_err(|source| ExtractError::CreateTarget {
                path: self.target.clone(),
                source,
            })?;
            tracing::info!("Created target directory {:?}", self.target);
        }
        Ok(())
    }

    /// Process one walked path and report what happened to it.
    pub fn process(&mut self, path: &Path) -> FileOutcome {
        let file = SourceFile::from_path(path);

        let title = match self.options.eligibility.check(&file.path) {
            Eligibility::Eligible(title) => title,
            Eligibility::NotMarkdown => {
                return skipped(file, "not a .md file".to_string());
            }
            other => {
                tracing::info!("Skipping {}: {}", file.file_name(), other);
                return skipped(file, other.to_string());
            }
        };
        let slot = self.registry.plan(&title);
        tracing::debug!(
            "Found markdown file: {} (seq {}, {})",
            file.file_name(),
            slot.seq(),
            self.options.collisions
        );
        let target = self.target.join(slot.file_name());

        if target.exists() && !self.options.overwrite && !self.registry.was_written(slot.file_name()) {
            tracing::warn!("Target already exists, skipping: {}", slot.file_name());
            return FileOutcome::Skipped {
                source: file.path,
                reason: SkipReason::TargetExists { target },
            };
        }

        match self.convert(&file, &title, &slot, &target) {
            Ok(removed) => {
                self.registry.commit(&title, &slot);
                tracing::info!("Converted {:?} -> {:?}", file.path, target);
                match removed {
                    Some(removed) => FileOutcome::Replaced {
                        source: file.path,
                        target,
                        removed,
                    },
                    None => FileOutcome::Written {
                        source: file.path,
                        target,
                    },
                }
            }
            Err((err, removed)) => {
                tracing::error!("Failed to process {}: {}", file.file_name(), err);
                FileOutcome::Failed {
                    source: file.path,
                    error: err.to_string(),
                    removed,
                }
            }
        }
    }

    /// Read, transform and write one file. Returns the path of an earlier
    /// output removed to make room, if any.
    fn convert(
        &mut self,
        file: &SourceFile,
        title: &CanonicalTitle,
        slot: &Slot,
        target: &Path,
    ) -> Result<Option<PathBuf>, (FileError, Option<PathBuf>)> {
        let content = fs::read_to_string(&file.path).map_err(|source| {
            (
                FileError::Read {
                    path: file.path.clone(),
                    source,
                },
                None,
            )
        })?;

        let rendered = render_mdx(&content, title, &self.options);

        let removed = match slot {
            Slot::Replace {
                previous: Some(previous),
                ..
            } => Some(self.remove_previous(title, previous).map_err(|e| (e, None))?),
            _ => None,
        };

        fs::write(target, rendered).map_err(|source| {
            (
                FileError::Write {
                    path: target.to_path_buf(),
                    source,
                },
                removed.clone(),
            )
        })?;

        Ok(removed)
    }

    fn remove_previous(&mut self, title: &CanonicalTitle, previous: &str) -> Result<PathBuf, FileError> {
        let path = self.target.join(previous);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Earlier output {:?} already gone", path);
            }
            Err(source) => return Err(FileError::Remove { path, source }),
        }
        tracing::info!("Replacing earlier output for '{}': {:?}", title, path);
        self.registry.forget_output(title);
        self.report.record_removal();
        Ok(path)
    }
}

fn skipped(file: SourceFile, detail: String) -> FileOutcome {
    FileOutcome::Skipped {
        source: file.path,
        reason: SkipReason::Ineligible { detail },
    }
}

/// Convenience wrapper for a single run.
pub fn extract(
    source: impl Into<PathBuf>,
    target: impl Into<PathBuf>,
    options: ExtractOptions,
) -> Result<ExtractReport, ExtractError> {
    Extractor::new(source, target, options).run()
}
