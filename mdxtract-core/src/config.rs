//! Job file parsing (`mdxtract.yml`).

use crate::filter::EligibilityPolicy;
use crate::models::ExtractOptions;
use crate::registry::CollisionPolicy;
use crate::walker::DEFAULT_PROJECT_MARKER;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Duplicate job name: {0}")]
    DuplicateJob(String),

    #[error("No job named '{0}'")]
    UnknownJob(String),

    #[error("Invalid job '{job}': {reason}")]
    InvalidJob { job: String, reason: String },
}

/// Top-level config: a list of named extraction jobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub jobs: Vec<JobConfig>,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub source: PathBuf,
    pub target: PathBuf,

    #[serde(default)]
    pub overwrite: bool,

    #[serde(default)]
    pub category: String,

    /// `append-suffix` (default) or `last-writer-wins`.
    #[serde(default)]
    pub policy: CollisionPolicy,

    #[serde(default)]
    pub numbered: bool,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default = "default_project_markers")]
    pub project_markers: Vec<String>,

    /// Pin the publish date instead of using today's.
    #[serde(default)]
    pub pub_date: Option<NaiveDate>,
}

fn default_project_markers() -> Vec<String> {
    vec![DEFAULT_PROJECT_MARKER.to_string()]
}

/// Either a blacklist or the CJK-name filter, never both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub blacklist: Vec<String>,

    #[serde(default)]
    pub cjk: bool,
}

/// A job with paths resolved and options built.
#[derive(Debug, Clone)]
pub struct ResolvedJob {
    pub name: String,
    pub source: PathBuf,
    pub target: PathBuf,
    pub options: ExtractOptions,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Parse configuration from YAML text; paths stay relative to the
    /// working directory.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for job in &self.jobs {
            if !seen.insert(job.name.as_str()) {
                return Err(ConfigError::DuplicateJob(job.name.clone()));
            }
            job.check_filter()?;
        }
        Ok(())
    }

    pub fn job(&self, name: &str) -> Result<&JobConfig, ConfigError> {
        self.jobs
            .iter()
            .find(|j| j.name == name)
            .ok_or_else(|| ConfigError::UnknownJob(name.to_string()))
    }

    /// Resolve every job, in file order.
    pub fn resolve_all(&self) -> Result<Vec<ResolvedJob>, ConfigError> {
        self.jobs.iter().map(|j| self.resolve(j)).collect()
    }

    pub fn resolve(&self, job: &JobConfig) -> Result<ResolvedJob, ConfigError> {
        let mut options = ExtractOptions::default()
            .with_overwrite(job.overwrite)
            .with_category(job.category.clone())
            .with_eligibility(job.eligibility()?)
            .with_collisions(job.policy)
            .with_numbered(job.numbered)
            .with_project_markers(job.project_markers.clone());
        if let Some(date) = job.pub_date {
            options = options.with_pub_date(date);
        }

        Ok(ResolvedJob {
            name: job.name.clone(),
            source: self.resolve_path(&job.source),
            target: self.resolve_path(&job.target),
            options,
        })
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(parent) = self.config_path.as_ref().and_then(|p| p.parent()) {
            parent.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl JobConfig {
    /// Reject a filter that asks for both policies. Patterns are not
    /// compiled here.
    fn check_filter(&self) -> Result<(), ConfigError> {
        if self.filter.cjk && !self.filter.blacklist.is_empty() {
            return Err(ConfigError::InvalidJob {
                job: self.name.clone(),
                reason: "filter.cjk and filter.blacklist are mutually exclusive".to_string(),
            });
        }
        Ok(())
    }

    pub fn eligibility(&self) -> Result<EligibilityPolicy, ConfigError> {
        self.check_filter()?;
        if self.filter.cjk {
            Ok(EligibilityPolicy::CjkName)
        } else {
            Ok(EligibilityPolicy::blacklist(self.filter.blacklist.iter().cloned()))
        }
    }
}
