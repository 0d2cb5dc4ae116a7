//! FILENAME: core/datasets/src/registry.rs
//! Dataset Registry - the set of dataset files the service knows about.
//!
//! The registry is seeded from the datasets folder at startup and grows when
//! a file is uploaded. It is owned by whoever builds the service state and is
//! handed to request handlers as a trait object.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::DatasetError;

// ============================================================================
// DATASET
// ============================================================================

/// Storage format of a dataset file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DatasetKind {
    /// SQLite database file (`.db`).
    Sqlite,
    /// Delimited text with a header row (`.csv`, `.txt`).
    Delimited,
}

impl DatasetKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, extension) = filename.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "db" => Some(DatasetKind::Sqlite),
            "csv" | "txt" => Some(DatasetKind::Delimited),
            _ => None,
        }
    }
}

/// A registered dataset, resolved to its location on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub name: String,
    pub path: PathBuf,
    pub kind: DatasetKind,
}

/// True if the filename carries one of the accepted extensions
/// (`db`, `csv`, `txt`, case-insensitive).
pub fn allowed_file(filename: &str) -> bool {
    DatasetKind::from_filename(filename).is_some()
}

static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap());

/// Reduces an uploaded filename to a flat, ASCII-only name that is safe to
/// join onto the datasets folder. May return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let flattened = filename.replace(|c: char| c == '/' || c == '\\', " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    cleaned.trim_matches(|c: char| c == '.' || c == '_').to_string()
}

/// Creates `path`, which must not exist yet, and fills it with `fill`.
/// If filling fails the partial file is removed, so a failed upload never
/// blocks a retry under the same name.
fn write_new_file<F>(path: &Path, fill: F) -> std::io::Result<()>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    if let Err(e) = fill(&mut file) {
        drop(file);
        if let Err(cleanup) = std::fs::remove_file(path) {
            log::warn!("failed to remove partial file {}: {}", path.display(), cleanup);
        }
        return Err(e);
    }
    Ok(())
}

// ============================================================================
// REPOSITORY
// ============================================================================

/// Registry of known datasets.
pub trait DatasetRepository: Send + Sync {
    /// Registered dataset names, in registration order.
    fn list(&self) -> Vec<String>;

    fn contains(&self, name: &str) -> bool;

    /// Looks up a registered dataset.
    fn resolve(&self, name: &str) -> Result<Dataset, DatasetError>;

    /// Validates, stores and registers an uploaded file.
    /// Returns the name the dataset was registered under.
    fn register(&self, filename: &str, contents: &[u8]) -> Result<String, DatasetError>;
}

/// Repository backed by a flat directory of dataset files.
#[derive(Debug)]
pub struct DirectoryRepository {
    root: PathBuf,
    names: RwLock<Vec<String>>,
}

impl DirectoryRepository {
    /// Opens (creating if needed) the datasets folder and registers every
    /// dataset file already in it.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DatasetError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if allowed_file(&name) => names.push(name),
                Ok(name) => log::debug!("skipping non-dataset file {}", name),
                Err(raw) => log::warn!("skipping non UTF-8 file name {:?}", raw),
            }
        }
        names.sort();

        log::info!("registered {} datasets from {}", names.len(), root.display());

        Ok(DirectoryRepository {
            root,
            names: RwLock::new(names),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_names(&self) -> RwLockReadGuard<'_, Vec<String>> {
        self.names.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_names(&self) -> RwLockWriteGuard<'_, Vec<String>> {
        self.names.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DatasetRepository for DirectoryRepository {
    fn list(&self) -> Vec<String> {
        self.read_names().clone()
    }

    fn contains(&self, name: &str) -> bool {
        self.read_names().iter().any(|n| n == name)
    }

    fn resolve(&self, name: &str) -> Result<Dataset, DatasetError> {
        if !self.contains(name) {
            return Err(DatasetError::NotFound(name.to_string()));
        }
        let kind = DatasetKind::from_filename(name)
            .ok_or_else(|| DatasetError::UnsupportedExtension(name.to_string()))?;

        Ok(Dataset {
            name: name.to_string(),
            path: self.root.join(name),
            kind,
        })
    }

    fn register(&self, filename: &str, contents: &[u8]) -> Result<String, DatasetError> {
        if !allowed_file(filename) {
            return Err(DatasetError::UnsupportedExtension(filename.to_string()));
        }

        let name = secure_filename(filename);
        if !allowed_file(&name) {
            return Err(DatasetError::InvalidFilename(filename.to_string()));
        }

        // Held across the write so two uploads of one name cannot interleave.
        let mut names = self.write_names();
        if names.iter().any(|n| *n == name) {
            return Err(DatasetError::AlreadyExists(name));
        }

        let path = self.root.join(&name);
        let written = write_new_file(&path, |file| {
            file.write_all(contents)?;
            file.flush()
        });
        match written {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(DatasetError::AlreadyExists(name));
            }
            Err(e) => return Err(e.into()),
        }

        names.push(name.clone());
        log::info!("registered dataset {} ({} bytes)", name, contents.len());

        Ok(name)
    }
}
