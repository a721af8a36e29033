use globset::{GlobBuilder, GlobMatcher};
use indexmap::IndexMap;
use thiserror::Error;

/// A configured glob entry could not be compiled
#[derive(Debug, Error)]
#[error("Invalid file path pattern '{pattern}': {source}")]
pub struct MatcherError {
    pattern: String,
    #[source]
    source: globset::Error,
}

impl MatcherError {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[derive(Debug)]
enum PathEntry {
    Literal,
    Pattern(GlobMatcher),
}

#[derive(Debug)]
struct TrackedEntry {
    entry: PathEntry,
    matches: usize,
}

/// Membership test over loosely type-checked file paths with usage tracking
///
/// Entries are literal paths or glob patterns. Every entry counts how many
/// queried paths it matched so entries that no longer match anything can be
/// reported.
#[derive(Debug, Default)]
pub struct FilePathMatcher {
    entries: IndexMap<String, TrackedEntry>,
    // indices into `entries`, in configuration order
    patterns: Vec<usize>,
}

impl FilePathMatcher {
    /// Builds a matcher from configured entries, keyed by their text
    ///
    /// `*` stays within one path segment and `**` spans segments. Both also
    /// match segments that start with a dot.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry containing glob characters is not a valid glob.
    pub fn new<I, P>(file_paths: I) -> Result<Self, MatcherError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut matcher = Self::default();

        for file_path in file_paths {
            let file_path = file_path.as_ref();
            if matcher.entries.contains_key(file_path) {
                continue;
            }

            // literal paths skip the glob engine and resolve with a single lookup
            let entry = if contains_magic_characters(file_path) {
                let glob = GlobBuilder::new(file_path)
                    .literal_separator(true)
                    .build()
                    .map_err(|source| MatcherError {
                        pattern: file_path.to_string(),
                        source,
                    })?;
                PathEntry::Pattern(glob.compile_matcher())
            } else {
                PathEntry::Literal
            };

            let (index, _) = matcher.entries.insert_full(
                file_path.to_string(),
                TrackedEntry { entry, matches: 0 },
            );
            if matches!(matcher.entries[index].entry, PathEntry::Pattern(_)) {
                matcher.patterns.push(index);
            }
        }

        Ok(matcher)
    }

    /// Returns whether `file_path` is loosely type-checked, recording the match
    /// on every entry that covers it.
    pub fn matches(&mut self, file_path: &str) -> bool {
        let mut matched = false;

        if let Some(tracked) = self.entries.get_mut(file_path)
            && matches!(tracked.entry, PathEntry::Literal)
        {
            tracked.matches += 1;
            matched = true;
        }

        // every pattern is checked so a pattern shadowed by a literal entry is
        // still counted as used
        for &index in &self.patterns {
            let tracked = &mut self.entries[index];
            if let PathEntry::Pattern(glob) = &tracked.entry
                && glob.is_match(file_path)
            {
                tracked.matches += 1;
                matched = true;
            }
        }

        matched
    }

    /// Entries that have not matched any path, in configuration order
    pub fn unused_file_paths(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, tracked)| tracked.matches == 0)
            .map(|(file_path, _)| file_path.as_str())
            .collect()
    }

    /// Number of paths matched by `entry` so far
    pub fn match_count(&self, entry: &str) -> Option<usize> {
        self.entries.get(entry).map(|tracked| tracked.matches)
    }

    /// Forgets all recorded matches
    pub fn reset_usage(&mut self) {
        for tracked in self.entries.values_mut() {
            tracked.matches = 0;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn contains_magic_characters(file_path: &str) -> bool {
    file_path.contains(['*', '?', '{', '}'])
}
