// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! Filesystem-backed record store.
//!
//! Records are individual JSON files under `DATA_DIR` (see
//! [`super::StorePaths`] for the layout). Writes go through a temp file and
//! an atomic rename; unique-key creation uses `create_new` so concurrent
//! writers race on the filesystem and exactly one wins. There is no
//! in-process shared state beyond the store itself, which keeps request
//! handling stateless and horizontally scalable.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use super::StorePaths;

/// Error type for record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Record store not initialized")]
    NotInitialized,
}

/// Result type for record store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store over a plain directory tree of JSON files.
#[derive(Debug, Clone)]
pub struct RecordStore {
    paths: StorePaths,
    initialized: bool,
}

impl RecordStore {
    /// Create a new store handle. Call [`RecordStore::initialize`] before use.
    pub fn new(paths: StorePaths) -> Self {
        Self {
            paths,
            initialized: false,
        }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// Create the directory layout. Idempotent.
    pub fn initialize(&mut self) -> StoreResult<()> {
        let dirs = [
            self.paths.users_dir(),
            self.paths.wallet_index_dir(),
            self.paths.payment_methods_dir(),
            self.paths.default_methods_dir(),
            self.paths.transactions_dir(),
        ];

        for dir in dirs {
            fs::create_dir_all(&dir)?;
        }

        self.initialized = true;
        Ok(())
    }

    /// Write-read-delete probe used by the health endpoint.
    pub fn health_check(&self) -> StoreResult<()> {
        if !self.initialized {
            return Err(StoreError::NotInitialized);
        }

        let test_file = self.paths.root().join(".health_check");
        let test_data = b"health_check_data";

        fs::write(&test_file, test_data)?;
        let read_data = fs::read(&test_file)?;
        fs::remove_file(&test_file)?;

        if read_data != test_data {
            return Err(StoreError::Io(io::Error::other(
                "health check data mismatch",
            )));
        }

        Ok(())
    }

    // ========== JSON Record Operations ==========

    /// Read and deserialize a record.
    pub fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StoreResult<T> {
        if !self.initialized {
            return Err(StoreError::NotInitialized);
        }

        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let value = serde_json::from_reader(reader)?;
        Ok(value)
    }

    /// Write a record (atomic via temp file + rename).
    pub fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StoreResult<()> {
        if !self.initialized {
            return Err(StoreError::NotInitialized);
        }

        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }

        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Create a record only if no record exists at `path` yet.
    ///
    /// `create_new` makes the filesystem the arbiter for unique keys: when
    /// two writers race, exactly one succeeds and the other gets
    /// [`StoreError::AlreadyExists`].
    pub fn create_json_new<T: Serialize>(
        &self,
        path: impl AsRef<Path>,
        value: &T,
    ) -> StoreResult<()> {
        if !self.initialized {
            return Err(StoreError::NotInitialized);
        }

        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    StoreError::AlreadyExists(path.display().to_string())
                } else {
                    StoreError::Io(e)
                }
            })?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
        Ok(())
    }

    /// Check if a record exists.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref().is_file()
    }

    /// Delete a record.
    pub fn delete(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        if !self.initialized {
            return Err(StoreError::NotInitialized);
        }
        fs::remove_file(path.as_ref())?;
        Ok(())
    }

    /// List record IDs (file stems) in a directory with the given extension.
    pub fn list_files(&self, dir: impl AsRef<Path>, extension: &str) -> StoreResult<Vec<String>> {
        if !self.initialized {
            return Err(StoreError::NotInitialized);
        }

        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext == extension {
                        if let Some(stem) = path.file_stem() {
                            if let Some(id) = stem.to_str() {
                                ids.push(id.to_string());
                            }
                        }
                    }
                }
            }
        }
        Ok(ids)
    }
}
