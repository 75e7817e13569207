//! JSON storage for packs
//!
//! Each pack lives in `.facepack/packs/{id}.json`. Reads take a shared file
//! lock; writes go to a locked temp file that is renamed into place.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use fs2::FileExt;
use thiserror::Error;

use super::manifest::PackRecord;
use crate::domain::{Collection, DEFAULT_PRIORITY_STEP};

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Pack not found: {0}")]
    NotFound(String),

    #[error("Pack already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid pack id: '{0}'")]
    InvalidPackId(String),
}

/// Store for pack manifests
pub struct PackStore {
    dir: PathBuf,
    snapshot_dir: PathBuf,
    step: i64,
}

impl PackStore {
    /// Creates a store over the given directories
    pub fn new(dir: impl Into<PathBuf>, snapshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            snapshot_dir: snapshot_dir.into(),
            step: DEFAULT_PRIORITY_STEP,
        }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        let data_dir = project_root.join(".facepack");
        Self::new(data_dir.join("packs"), data_dir.join("snapshots"))
    }

    /// Sets the gap for priorities assigned while loading
    pub fn with_priority_step(mut self, step: i64) -> Self {
        self.step = step;
        self
    }

    /// Returns the directory holding pack files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file path for a pack id
    pub fn path_for(&self, id: &str) -> Result<PathBuf> {
        validate_id(id)?;
        Ok(self.dir.join(format!("{}.json", id)))
    }

    /// Returns true if the pack file exists
    pub fn exists(&self, id: &str) -> bool {
        self.path_for(id).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Lists pack ids, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read pack directory: {}", self.dir.display()))?;

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        ids.sort();

        Ok(ids)
    }

    /// Reads a pack
    pub fn load(&self, id: &str) -> Result<Collection> {
        let path = self.path_for(id)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(id.to_string()).into());
        }

        let file = File::open(&path)
            .with_context(|| format!("Failed to open pack: {}", path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on pack")?;

        let record: PackRecord = serde_json::from_reader(BufReader::new(&file))
            .with_context(|| format!("Failed to parse pack: {}", path.display()))?;

        let collection = record
            .into_collection(self.step)
            .with_context(|| format!("Invalid pack: {}", path.display()))?;

        tracing::debug!(
            pack = %collection.id(),
            groups = collection.len(),
            items = collection.item_count(),
            "loaded pack"
        );

        // Lock is released when file is dropped
        Ok(collection)
    }

    /// Creates an empty pack; fails if it already exists
    pub fn create(&self, collection: &mut Collection) -> Result<PathBuf> {
        if self.exists(collection.id()) {
            return Err(StoreError::AlreadyExists(collection.id().to_string()).into());
        }
        self.save(collection)
    }

    /// Writes a pack in sorted order
    pub fn save(&self, collection: &mut Collection) -> Result<PathBuf> {
        let path = self.path_for(collection.id())?;

        collection.sort_all();
        let record = PackRecord::from_collection(collection);
        write_atomic(&path, &record)?;

        tracing::debug!(pack = %collection.id(), path = %path.display(), "saved pack");
        Ok(path)
    }

    /// Removes a pack file
    pub fn remove(&self, id: &str) -> Result<bool> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove pack: {}", path.display()))?;
        Ok(true)
    }

    /// Writes a timestamped copy of a pack into the snapshot directory
    pub fn snapshot(&self, collection: &Collection) -> Result<PathBuf> {
        validate_id(collection.id())?;

        let mut copy = collection.copy();
        copy.sort_all();

        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let path = self
            .snapshot_dir
            .join(format!("{}-{}.json", collection.id(), stamp));

        write_atomic(&path, &PackRecord::from_collection(&copy))?;
        Ok(path)
    }
}

/// Pack ids become file names, so path syntax is rejected
fn validate_id(id: &str) -> Result<(), StoreError> {
    let invalid = id.is_empty()
        || id.starts_with('.')
        || id.contains(|c: char| c == '/' || c == '\\' || c.is_control());

    if invalid {
        Err(StoreError::InvalidPackId(id.to_string()))
    } else {
        Ok(())
    }
}

fn write_atomic(path: &Path, record: &PackRecord) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    // Write to temp file first
    let temp_path = path.with_extension("json.tmp");

    {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        // Acquire exclusive lock
        file.lock_exclusive()
            .context("Failed to acquire write lock on pack")?;

        let mut writer = BufWriter::new(&file);
        serde_json::to_writer_pretty(&mut writer, record).context("Failed to serialize pack")?;
        writeln!(writer).context("Failed to write pack")?;

        writer.flush().context("Failed to flush pack")?;
    }

    // Atomic rename
    fs::rename(&temp_path, path).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}
