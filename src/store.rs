//! Local store: the JSON document on disk.
//! Whole-file read, whole-file overwrite. No locking and no atomic replace,
//! so two updaters running against the same file can clobber each other.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{error, info, warn};

use crate::document::AudienceDocument;
use crate::error::StoreError;

pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<AudienceDocument, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("{} not found, starting from an empty document", self.path.display());
                return Err(StoreError::Missing(self.path.clone()));
            }
            Err(source) => {
                error!("Could not read {}: {source}", self.path.display());
                return Err(StoreError::Io { path: self.path.clone(), source });
            }
        };

        let value: Value = serde_json::from_str(&text).map_err(|source| {
            error!("JSON decode error in {}: {source}", self.path.display());
            StoreError::Corrupt { path: self.path.clone(), source }
        })?;

        // Every section is raw JSON, so only a non-object top level can fail here
        if !value.is_object() {
            error!("{} does not hold a JSON object", self.path.display());
            return Err(StoreError::NotAnObject(self.path.clone()));
        }
        serde_json::from_value(value).map_err(|_| StoreError::NotAnObject(self.path.clone()))
    }

    /// Pretty-printed with 2-space indent; non-ASCII is written as-is.
    pub fn save(&self, document: &AudienceDocument) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(document)?;
        fs::write(&self.path, text).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!("Data saved to {}", self.path.display());
        Ok(())
    }
}
