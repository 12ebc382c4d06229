//! Command implementations for the ventdir CLI

pub mod check;
pub mod config;
pub mod jobs;
pub mod serve;

pub use check::run_check;
pub use config::run_config;
pub use jobs::{run_image_metadata, run_import, run_migrate_images, run_migrate_photos};
pub use serve::run_serve;
