use indexmap::IndexSet;

use crate::{matcher::FilePathMatcher, parse::TscDiagnostic};

/// How a diagnostic relates to the two allow-lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Both the file path and the error code are allow-listed
    Ignored,
    /// The error code is allow-listed but the file path is not
    CouldBeIgnored,
    /// The file path is allow-listed but the error code is not
    FilePathOnly,
    /// Neither is allow-listed
    Valid,
}

impl Classification {
    pub fn new(file_path_match: bool, error_code_match: bool) -> Self {
        match (file_path_match, error_code_match) {
            (true, true) => Classification::Ignored,
            (false, true) => Classification::CouldBeIgnored,
            (true, false) => Classification::FilePathOnly,
            (false, false) => Classification::Valid,
        }
    }

    pub fn file_path_match(self) -> bool {
        matches!(
            self,
            Classification::Ignored | Classification::FilePathOnly
        )
    }

    pub fn error_code_match(self) -> bool {
        matches!(
            self,
            Classification::Ignored | Classification::CouldBeIgnored
        )
    }
}

/// Classifies `diagnostic`, recording the lookup on `file_path_matcher`
pub fn classify_tsc_error(
    diagnostic: &TscDiagnostic,
    ignored_error_codes: &IndexSet<String>,
    file_path_matcher: &mut FilePathMatcher,
) -> Classification {
    let error_code_match = ignored_error_codes.contains(&diagnostic.error_code);
    let file_path_match = file_path_matcher.matches(&diagnostic.file_path);

    Classification::new(file_path_match, error_code_match)
}
