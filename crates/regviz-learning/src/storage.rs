//! Saving and loading fitted models.
//!
//! A fitted model is stored as a single JSON document holding the learned
//! preprocessing parameters, the optional polynomial expansion and the
//! estimator coefficients. [`ModelStorage`] is the seam the service saves
//! through; [`FsModelStore`] is the file-system implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! let store = FsModelStore::new("models/saved");
//! let saved = store.save(&model, model.name())?;
//! println!("Saved as {}", saved.filename);
//!
//! let path = store.resolve(&saved.filename)?;
//! let restored = store.load(&path)?;
//! ```

use crate::catalog::FittedModel;
use crate::error::{RegressionError, Result};
use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File extension of saved model artifacts.
pub const MODEL_EXTENSION: &str = "json";

/// Handle returned after saving a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedModel {
    pub model_name: String,
    pub file_path: PathBuf,
    /// File name only, usable with [`ModelStorage::resolve`].
    pub filename: String,
}

/// Persistence capability for fitted models.
pub trait ModelStorage: Send + Sync {
    /// Save `model` under a unique name derived from `name`.
    fn save(&self, model: &FittedModel, name: &str) -> Result<SavedModel>;

    /// Load a model previously written by [`save`](Self::save).
    fn load(&self, path: &Path) -> Result<FittedModel>;

    /// Full path of a saved artifact, given only its file name.
    fn resolve(&self, filename: &str) -> Result<PathBuf>;
}

impl FittedModel {
    /// Serialize the model to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Restore a model from bytes produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Write the model to `path`. The parent directory must exist.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Read a model from `path`.
    ///
    /// # Errors
    ///
    /// - [`RegressionError::ModelNotFound`] if the file does not exist
    /// - [`RegressionError::Json`] if the file is not a saved model
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(RegressionError::ModelNotFound {
                path: path.display().to_string(),
            });
        }
        Self::from_bytes(&fs::read(path)?)
    }
}

/// Stores models as `{name}_{timestamp}.json` files in one directory.
#[derive(Debug, Clone)]
pub struct FsModelStore {
    dir: PathBuf,
}

impl FsModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ModelStorage for FsModelStore {
    fn save(&self, model: &FittedModel, name: &str) -> Result<SavedModel> {
        fs::create_dir_all(&self.dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        let filename = format!("{name}_{timestamp}.{MODEL_EXTENSION}");
        let file_path = self.dir.join(&filename);
        model.save(&file_path)?;

        info!("Saved {} to {}", name, file_path.display());
        Ok(SavedModel {
            model_name: name.to_string(),
            file_path,
            filename,
        })
    }

    fn load(&self, path: &Path) -> Result<FittedModel> {
        FittedModel::load(path)
    }

    fn resolve(&self, filename: &str) -> Result<PathBuf> {
        let not_found = || RegressionError::ModelNotFound {
            path: filename.to_string(),
        };
        if filename.is_empty() || filename.contains(['/', '\\']) || filename == ".." {
            return Err(not_found());
        }
        let path = self.dir.join(filename);
        if path.is_file() { Ok(path) } else { Err(not_found()) }
    }
}
