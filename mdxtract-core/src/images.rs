//! Image relocation: copy images out of a source tree into a public
//! directory under unique names, then point MDX image links at the copies.

use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image source directory does not exist: {0:?}")]
    Missing(PathBuf),

    #[error("Failed to create {path:?}: {source}")]
    CreateDest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write cleanup script {path:?}: {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid image link pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Parameters for one relocation run.
#[derive(Debug, Clone)]
pub struct ImageJob {
    /// Tree the images are collected from.
    pub images: PathBuf,
    /// Flat directory the copies land in.
    pub dest: PathBuf,
    /// Directory of `.mdx` files whose links are rewritten.
    pub mdx_dir: PathBuf,
    pub prefix: String,
    /// Public URL prefix of `dest`, e.g. `/img/`.
    pub url_prefix: String,
    /// Relative link prefix to rewrite, e.g. `./assets/`.
    pub assets_prefix: String,
    /// Extensions collected, without the dot; compared case-insensitively.
    pub extensions: Vec<String>,
    pub cleanup_script: Option<PathBuf>,
    /// Run stamp embedded in every new file name.
    pub stamp: i64,
}

impl ImageJob {
    pub fn new(
        images: impl Into<PathBuf>,
        dest: impl Into<PathBuf>,
        mdx_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            images: images.into(),
            dest: dest.into(),
            mdx_dir: mdx_dir.into(),
            prefix: "img".to_string(),
            url_prefix: "/img/".to_string(),
            assets_prefix: "./assets/".to_string(),
            extensions: vec!["png".to_string()],
            cleanup_script: None,
            stamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    fn wants(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    fn link_regex(&self) -> Result<Regex, regex::Error> {
        let exts = self
            .extensions
            .iter()
            .map(|e| regex::escape(e))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(
            r"!\[([^\]]*)\]\({}([^)]+\.(?i:{}))\)",
            regex::escape(&self.assets_prefix),
            exts
        ))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RelocatedImage {
    pub source: PathBuf,
    /// Path relative to the image root, `/`-separated.
    pub relative: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageReport {
    pub relocated: Vec<RelocatedImage>,
    pub failed_copies: usize,
    pub updated_files: Vec<PathBuf>,
    /// `(mdx file, image reference)` pairs with no matching copy.
    pub unresolved: Vec<(PathBuf, String)>,
    pub cleanup_script: Option<PathBuf>,
}

/// Copy images and rewrite MDX links to them.
pub fn relocate_images(job: &ImageJob) -> Result<ImageReport, ImageError> {
    if !job.images.exists() {
        return Err(ImageError::Missing(job.images.clone()));
    }
    fs::create_dir_all(&job.dest).map_err(|source| ImageError::CreateDest {
        path: job.dest.clone(),
        source,
    })?;
    let link_regex = job.link_regex()?;

    let mut report = ImageReport::default();

    tracing::info!("Collecting images under {:?}", job.images);
    let found = collect_images(job);
    tracing::info!("Found {} image files", found.len());

    for (index, source) in found.into_iter().enumerate() {
        let file_name = relocated_name(job, index + 1, &source);
        let target = job.dest.join(&file_name);
        match fs::copy(&source, &target) {
            Ok(_) => {
                let relative = source
                    .strip_prefix(&job.images)
                    .unwrap_or(&source)
                    .to_string_lossy()
                    .replace('\\', "/");
                report.relocated.push(RelocatedImage {
                    source,
                    relative,
                    file_name,
                });
                if report.relocated.len() % 50 == 0 {
                    tracing::info!("Copied {} images...", report.relocated.len());
                }
            }
            Err(err) => {
                tracing::error!("Failed to copy {:?}: {}", source, err);
                report.failed_copies += 1;
            }
        }
    }
    tracing::info!("Copied {} images to {:?}", report.relocated.len(), job.dest);

    rewrite_mdx_links(job, &link_regex, &mut report);

    if let Some(path) = &job.cleanup_script {
        write_cleanup_script(job, path)?;
        tracing::info!("Wrote cleanup script {:?}; review it before running", path);
        report.cleanup_script = Some(path.clone());
    }

    Ok(report)
}

fn collect_images(job: &ImageJob) -> Vec<PathBuf> {
    WalkDir::new(&job.images)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file() && job.wants(e.path()))
        .map(|e| e.into_path())
        .collect()
}

fn relocated_name(job: &ImageJob, index: usize, source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    format!("{}-{}-{}-{}{}", job.prefix, job.stamp, index, stem, ext)
}

fn rewrite_mdx_links(job: &ImageJob, link_regex: &Regex, report: &mut ImageReport) {
    let entries = match fs::read_dir(&job.mdx_dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!("MDX directory {:?} unavailable: {}", job.mdx_dir, err);
            return;
        }
    };

    let mut mdx_files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "mdx"))
        .collect();
    mdx_files.sort();

    for path in mdx_files {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::error!("Failed to read {:?}: {}", path, err);
                continue;
            }
        };

        let mut changed = false;
        let mut unresolved = Vec::new();
        let rewritten = link_regex.replace_all(&content, |caps: &regex::Captures<'_>| {
            let alt = &caps[1];
            let image = &caps[2];
            match report.relocated.iter().find(|r| r.relative.contains(image)) {
                Some(found) => {
                    changed = true;
                    format!("![{}]({}{})", alt, job.url_prefix, found.file_name)
                }
                None => {
                    unresolved.push(image.to_string());
                    caps[0].to_string()
                }
            }
        });

        for image in unresolved {
            tracing::warn!("No relocated image for {} in {:?}", image, path);
            report.unresolved.push((path.clone(), image));
        }

        if changed {
            match fs::write(&path, rewritten.as_bytes()) {
                Ok(()) => {
                    tracing::info!("Updated {:?}", path);
                    report.updated_files.push(path);
                }
                Err(err) => tracing::error!("Failed to write {:?}: {}", path, err),
            }
        }
    }
}

fn write_cleanup_script(job: &ImageJob, path: &Path) -> Result<(), ImageError> {
    let root = shell_quote(&job.images.to_string_lossy());
    let mut script = String::from(
        "#!/bin/bash\n# Remove the original image files\necho \"Removing original image files...\"\n",
    );
    for ext in &job.extensions {
        script.push_str(&format!(
            "find {} -iname {} -delete\n",
            root,
            shell_quote(&format!("*.{}", ext))
        ));
    }
    script.push_str("echo \"Done.\"\n");

    fs::write(path, script).map_err(|source| ImageError::Script {
        path: path.to_path_buf(),
        source,
    })
}

/// Single-quote `s` for a POSIX shell.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
