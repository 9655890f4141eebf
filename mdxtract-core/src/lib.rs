//! # mdxtract-core
//!
//! Core library for flattening a tree of markdown notes into a directory of
//! blog-ready `.mdx` posts.
//!
//! The extraction pipeline is split into independently testable stages:
//! [`walker`] discovers files, [`filter`] decides eligibility, [`heading`] and
//! [`frontmatter`] transform content, [`registry`] resolves output names, and
//! [`extractor`] drives a run. [`rename`] and [`images`] are the companion
//! batch utilities for preparing a source tree and fixing image links.

pub mod config;
pub mod extractor;
pub mod filter;
pub mod frontmatter;
pub mod heading;
pub mod images;
pub mod models;
pub mod registry;
pub mod rename;
pub mod title;
pub mod walker;

pub use config::{Config, ConfigError, FilterConfig, JobConfig, ResolvedJob};
pub use extractor::{extract, render_mdx, ExtractError, Extractor, FileError};
pub use filter::{Blacklist, BlacklistPattern, Eligibility, EligibilityPolicy};
pub use frontmatter::{apply_frontmatter, FrontmatterBlock, FrontmatterFields};
pub use images::{relocate_images, ImageError, ImageJob, ImageReport};
pub use models::{ExtractOptions, ExtractReport, FileOutcome, SkipReason, SourceFile};
pub use registry::{CollisionPolicy, Registry, Slot};
pub use rename::{rename_recursively, RenameError, RenameReport, Replacement};
pub use title::CanonicalTitle;
pub use walker::SourceWalker;
