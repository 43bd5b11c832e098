//! Project manifest access.
//!
//! The manifest is a JSON document (normally `package.json`) with a
//! top-level `version` string. Only that field is read or changed; the rest
//! of the document, including key order, is written back as it was read.

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::version::{self, SemanticVersion, VersionError};

/// Errors from manifest operations.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The file could not be read.
    #[error("Could not read {path} file.")]
    Read {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("Could not parse {path} file.")]
    Parse {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The document has no top-level string `version` field.
    #[error("Could not parse version in {path} file.")]
    MissingVersion {
        /// Manifest path.
        path: Utf8PathBuf,
    },

    /// The `version` field is not a valid semantic version.
    #[error("Could not parse version in {path} file.")]
    Version {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Underlying version error.
        #[source]
        source: VersionError,
    },

    /// The updated document could not be serialized.
    #[error("Could not serialize {path} file.")]
    Serialize {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The file could not be written.
    #[error("Could not write {path} file.")]
    Write {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// A loaded manifest document.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: Utf8PathBuf,
    document: Value,
}

impl Manifest {
    /// Read and parse the manifest at `path`.
    #[instrument(fields(%path))]
    pub fn load(path: &Utf8Path) -> ManifestResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_owned(),
            source,
        })?;
        let document = serde_json::from_str(&text).map_err(|source| ManifestError::Parse {
            path: path.to_owned(),
            source,
        })?;
        debug!("manifest loaded");
        Ok(Self {
            path: path.to_owned(),
            document,
        })
    }

    /// Path the manifest was loaded from and will be saved to.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The raw `version` string.
    pub fn version(&self) -> ManifestResult<&str> {
        self.document
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| ManifestError::MissingVersion {
                path: self.path.clone(),
            })
    }

    /// The `version` field parsed as a semantic version.
    pub fn current_version(&self) -> ManifestResult<SemanticVersion> {
        version::parse(self.version()?).map_err(|source| ManifestError::Version {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the `version` field in memory.
    pub fn set_version(&mut self, version: &SemanticVersion) -> ManifestResult<()> {
        let Some(object) = self.document.as_object_mut() else {
            return Err(ManifestError::MissingVersion {
                path: self.path.clone(),
            });
        };
        object.insert("version".into(), Value::String(version.to_string()));
        Ok(())
    }

    /// Write the document back to its path, pretty-printed with two-space
    /// indentation.
    #[instrument(skip(self), fields(path = %self.path))]
    pub fn save(&self) -> ManifestResult<()> {
        let text = serde_json::to_string_pretty(&self.document).map_err(|source| {
            ManifestError::Serialize {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, text).map_err(|source| ManifestError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("manifest written");
        Ok(())
    }
}
