//! Reading and writing the persisted allow-lists.
//!
//! Both registries are flat JSON arrays of strings. They are written sorted,
//! pretty printed with two-space indentation and a trailing newline so that
//! diffs stay reviewable.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AllowListError {
    #[error("Cannot read file {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot parse JSON file {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("File {path} is not a valid array")]
    NotAnArray { path: Utf8PathBuf },

    #[error("File {path} must only contain strings")]
    NotStrings { path: Utf8PathBuf },

    #[error("Cannot serialize {path}: {source}")]
    Serialize {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot write file {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AllowListError {
    pub fn path(&self) -> &Utf8Path {
        match self {
            AllowListError::Read { path, .. }
            | AllowListError::Parse { path, .. }
            | AllowListError::NotAnArray { path }
            | AllowListError::NotStrings { path }
            | AllowListError::Serialize { path, .. }
            | AllowListError::Write { path, .. } => path,
        }
    }
}

/// Read/write access to the persisted allow-lists
pub trait AllowListStore {
    /// Reads a JSON array of strings from `path`.
    ///
    /// A missing file yields an empty list when `allow_missing` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or is not an
    /// array of strings.
    fn read_json_array(
        &self,
        path: &Utf8Path,
        allow_missing: bool,
    ) -> Result<Vec<String>, AllowListError>;

    /// Overwrites `path` with `values`, in the order given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save_json_array(&self, path: &Utf8Path, values: &[String]) -> Result<(), AllowListError>;
}

impl<S: AllowListStore + ?Sized> AllowListStore for &S {
    fn read_json_array(
        &self,
        path: &Utf8Path,
        allow_missing: bool,
    ) -> Result<Vec<String>, AllowListError> {
        (**self).read_json_array(path, allow_missing)
    }

    fn save_json_array(&self, path: &Utf8Path, values: &[String]) -> Result<(), AllowListError> {
        (**self).save_json_array(path, values)
    }
}

/// [`AllowListStore`] backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsAllowListStore;

impl AllowListStore for FsAllowListStore {
    fn read_json_array(
        &self,
        path: &Utf8Path,
        allow_missing: bool,
    ) -> Result<Vec<String>, AllowListError> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if allow_missing && e.kind() == io::ErrorKind::NotFound => {
                debug!("{path} does not exist, starting from an empty list");
                return Ok(vec![]);
            }
            Err(source) => {
                return Err(AllowListError::Read {
                    path: path.to_owned(),
                    source,
                });
            }
        };

        parse_json_array(path, &contents)
    }

    fn save_json_array(&self, path: &Utf8Path, values: &[String]) -> Result<(), AllowListError> {
        let contents = to_json_array(path, values)?;

        fs::write(path, contents).map_err(|source| AllowListError::Write {
            path: path.to_owned(),
            source,
        })?;
        debug!("Saved {} entries to {path}", values.len());

        Ok(())
    }
}

/// Parses registry file contents read from `path`
///
/// # Errors
///
/// Returns an error if `contents` is not a JSON array of strings.
pub fn parse_json_array(path: &Utf8Path, contents: &str) -> Result<Vec<String>, AllowListError> {
    let value: serde_json::Value =
        serde_json::from_str(contents).map_err(|source| AllowListError::Parse {
            path: path.to_owned(),
            source,
        })?;

    let serde_json::Value::Array(items) = value else {
        return Err(AllowListError::NotAnArray {
            path: path.to_owned(),
        });
    };

    items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::String(s) => Ok(s),
            _ => Err(AllowListError::NotStrings {
                path: path.to_owned(),
            }),
        })
        .collect()
}

/// Renders `values` the way registry files are stored on disk
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_array(path: &Utf8Path, values: &[String]) -> Result<String, AllowListError> {
    let mut contents =
        serde_json::to_string_pretty(values).map_err(|source| AllowListError::Serialize {
            path: path.to_owned(),
            source,
        })?;
    contents.push('\n');
    Ok(contents)
}
