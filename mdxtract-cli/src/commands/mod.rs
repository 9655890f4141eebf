//! CLI command implementations.

pub mod extract;
pub mod images;
pub mod init;
pub mod rename;
pub mod run;

pub use extract::{extract_files, ExtractArgs};
pub use images::{fix_images, FixImagesArgs};
pub use init::init_project;
pub use rename::rename_tree;
pub use run::run_jobs;
