pub mod allow_list;

use camino::Utf8PathBuf;

pub use allow_list::{AllowListError, AllowListStore, FsAllowListStore};

/// Options consumed by a checking session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON array of TSC error codes that may be ignored in loosely type-checked files
    pub ignored_error_codes: Utf8PathBuf,
    /// JSON array of file paths (or glob patterns) that are loosely type-checked
    pub loosely_type_checked_files: Utf8PathBuf,
    /// Bootstrap both registries from the current diagnostics
    pub init: bool,
    /// Rewrite the registries instead of only reporting discrepancies
    pub auto_update: bool,
}

impl Config {
    pub fn default_ignored_error_codes_path() -> Utf8PathBuf {
        Utf8PathBuf::from("ignored-error-codes.json")
    }

    pub fn default_loosely_type_checked_files_path() -> Utf8PathBuf {
        Utf8PathBuf::from("loosely-type-checked-files.json")
    }

    #[must_use]
    pub fn with_init(mut self, init: bool) -> Self {
        self.init = init;
        self
    }

    #[must_use]
    pub fn with_auto_update(mut self, auto_update: bool) -> Self {
        self.auto_update = auto_update;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignored_error_codes: Self::default_ignored_error_codes_path(),
            loosely_type_checked_files: Self::default_loosely_type_checked_files_path(),
            init: false,
            auto_update: false,
        }
    }
}
