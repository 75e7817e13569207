//! Configuration handling for facepack
//!
//! Configuration is stored in `.facepack/config.toml` (project) and the
//! platform config directory (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DEFAULT_PRIORITY_STEP;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Ordering settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OrderingConfig {
    /// Gap between automatically assigned priorities
    pub priority_step: i64,

    /// Treat cycles and dangling links as errors in `order`
    pub strict: bool,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            priority_step: DEFAULT_PRIORITY_STEP,
            strict: false,
        }
    }
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    pub ordering: OrderingConfig,
}

impl ProjectConfig {
    /// Rejects values the ordering layer cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ordering.priority_step <= 0 {
            return Err(ConfigError::Invalid(format!(
                "ordering.priority_step must be positive, got {}",
                self.ordering.priority_step
            )));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project_root = Self::find_project_root();
        let project = match &project_root {
            Some(root) => Self::load_project_config(root)?,
            None => ProjectConfig::default(),
        };

        Ok(Self {
            project,
            global,
            project_root,
        })
    }

    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "facepack", "facepack")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads and validates project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(".facepack").join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;

        config
            .validate()
            .with_context(|| format!("In {}", config_path.display()))?;

        Ok(config)
    }

    /// Finds the project root by looking for `.facepack/` from the current directory up
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Finds the project root by looking for `.facepack/` from `start` up
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(".facepack").is_dir())
            .map(Path::to_path_buf)
    }

    /// Returns true if we're in a facepack project
    pub fn is_in_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Returns the project root, or an error if not in a project
    pub fn require_project_root(&self) -> Result<&Path> {
        self.project_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in a facepack project. Run 'facepack init' first."))
    }
}
