//! # Storage Layer
//!
//! Persistence for facepack with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Packs | Pretty JSON, one file per pack | `.facepack/packs/{id}.json` |
//! | Snapshots | Same as packs, timestamped | `.facepack/snapshots/{id}-{utc}.json` |
//! | Config | TOML | `.facepack/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`PackStore`] takes a shared `fs2` lock for reads
//! - Writes lock a temp file and rename it into place
//!
//! ## Project Structure
//!
//! ```text
//! .facepack/
//! ├── packs/
//! │   └── faces.json        # One manifest per pack
//! ├── snapshots/            # Local backups (ignored)
//! ├── config.toml           # Project configuration
//! └── .gitignore
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a facepack project
//! - [`PackStore`] - Read/write pack manifests
//! - [`PackRecord`] - On-disk shape of a pack
//! - [`Config`] - Project and global configuration

mod config;
mod manifest;
mod pack_store;
mod project;

pub use config::{Config, ConfigError, GlobalConfig, OrderingConfig, OutputFormat, ProjectConfig};
pub use manifest::{GroupRecord, ItemRecord, PackRecord};
pub use pack_store::{PackStore, StoreError};
pub use project::{Project, ProjectError};
