//! Recognizes the markers `tsc --watch` prints around each compilation.

use log::trace;

pub const COMPILATION_START_MARKER: &str = "Starting compilation in watch mode...";
pub const COMPILATION_FINISHED_MARKER: &str = "Watching for file changes.";
pub const FILE_CHANGE_DETECTED_MARKER: &str =
    "File change detected. Starting incremental compilation...";

/// Tracks whether compiler output comes from watch mode
///
/// Only the start marker is recognized until it has been seen once; from then
/// on the finished and file-change markers are recognized as well.
#[derive(Debug, Default)]
pub struct WatchModeSpy {
    compilation_started: bool,
}

impl WatchModeSpy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch_mode_detected(&self) -> bool {
        self.compilation_started
    }

    /// Returns `true` only for the first start marker
    pub fn detect_compilation_start(&mut self, line: &str) -> bool {
        if !self.compilation_started && line.contains(COMPILATION_START_MARKER) {
            trace!("watch mode compilation started");
            self.compilation_started = true;
            return true;
        }
        false
    }

    pub fn detect_compilation_finished(&self, line: &str) -> bool {
        self.compilation_started && line.contains(COMPILATION_FINISHED_MARKER)
    }

    pub fn detect_file_change(&self, line: &str) -> bool {
        self.compilation_started && line.contains(FILE_CHANGE_DETECTED_MARKER)
    }
}
