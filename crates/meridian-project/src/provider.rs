use std::fmt;
use std::path::{Path, PathBuf};

use meridian_core::ModuleSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to read module manifest {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse module manifest {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of the module set, normally the host's compilation pipeline.
pub trait ModuleProvider: fmt::Debug {
    fn modules(&self) -> Result<ModuleSet, ProviderError>;
}

impl ModuleProvider for ModuleSet {
    fn modules(&self) -> Result<ModuleSet, ProviderError> {
        Ok(self.clone())
    }
}

/// Reads the module set from a JSON manifest on every call.
#[derive(Debug, Clone)]
pub struct ManifestProvider {
    path: PathBuf,
}

impl ManifestProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModuleProvider for ManifestProvider {
    fn modules(&self) -> Result<ModuleSet, ProviderError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| ProviderError::Io {
            path: self.path.clone(),
            source,
        })?;
        ModuleSet::from_json_str(&text).map_err(|source| ProviderError::Json {
            path: self.path.clone(),
            source,
        })
    }
}

/// One batch of asset-change notifications from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetChanges {
    pub added: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    pub moved: Vec<PathBuf>,
    pub moved_from: Vec<PathBuf>,
    pub imported: Vec<PathBuf>,
}

impl AssetChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.deleted.is_empty()
            && self.moved.is_empty()
            && self.moved_from.is_empty()
            && self.imported.is_empty()
    }
}
