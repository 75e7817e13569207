//! Project management
//!
//! Handles project initialization and provides access to the pack store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, PackStore};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a facepack project. Run 'facepack init' first.")]
    NotInProject,
}

const DEFAULT_CONFIG: &str = r#"# facepack configuration

[ordering]
# Gap between automatically assigned priorities
priority_step = 1000

# Fail `facepack order` on cycles or dangling links
strict = false
"#;

const GITIGNORE: &str = r#"# Snapshots are local backups
snapshots/

# Interrupted writes
packs/*.tmp
"#;

/// A facepack project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(".facepack").is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Existing files are left alone, so running this twice is harmless.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let data_dir = root.join(".facepack");

        for dir in [data_dir.join("packs"), data_dir.join("snapshots")] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        let config_path = data_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = data_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, GITIGNORE).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .facepack directory path
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(".facepack")
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the pack store, using the configured priority step
    pub fn store(&self) -> PackStore {
        PackStore::for_project(&self.root)
            .with_priority_step(self.config.project.ordering.priority_step)
    }
}
