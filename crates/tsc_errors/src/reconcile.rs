//! Compares one compilation against the allow-lists.
//!
//! Each step reports a discrepancy and, with auto-update, applies it to the
//! working copy of the registries. Steps run in a fixed order: stale error
//! codes, unused file paths, promotable file paths, valid errors. Every step
//! runs even when an earlier one already failed the compilation.

use indexmap::IndexSet;

use crate::{
    matcher::FilePathMatcher,
    parse::TscDiagnostic,
    registry::Registries,
    report::{Reporter, Tone, Verdict},
    store::Partitions,
};

const AUTO_UPDATE_HINT: &str = "Use the --auto-update option to update the registry automatically.";
const REGISTRY_UPDATE: &str = "Registry will be updated.";

#[derive(Debug)]
pub struct ReconcileOutcome {
    pub verdict: Verdict,
    /// Working copy of the registries with all applicable changes
    pub updated: Registries,
}

pub fn reconcile<R: Reporter + ?Sized>(
    reporter: &mut R,
    auto_update: bool,
    partitions: &Partitions<'_>,
    file_path_matcher: &FilePathMatcher,
    registries: &Registries,
) -> ReconcileOutcome {
    let mut updated = registries.clone();

    let mut verdict = report_ignored_errors_that_did_not_occur(
        reporter,
        auto_update,
        &partitions.all,
        &mut updated.ignored_error_codes,
    );
    verdict |= report_unused_file_paths(
        reporter,
        auto_update,
        file_path_matcher,
        &mut updated.loosely_type_checked_files,
    );
    verdict |= report_errors_that_could_be_ignored(
        reporter,
        auto_update,
        &partitions.could_be_ignored,
        &mut updated.loosely_type_checked_files,
    );
    verdict |= report_valid_errors(reporter, &partitions.valid);

    ReconcileOutcome { verdict, updated }
}

/// Ignored codes absent from the compilation. Never fails the compilation.
pub fn report_ignored_errors_that_did_not_occur<R: Reporter + ?Sized>(
    reporter: &mut R,
    auto_update: bool,
    diagnostics: &[&TscDiagnostic],
    ignored_error_codes: &mut IndexSet<String>,
) -> Verdict {
    let present: IndexSet<&str> = diagnostics.iter().map(|d| d.error_code.as_str()).collect();
    let stale: Vec<String> = ignored_error_codes
        .iter()
        .filter(|code| !present.contains(code.as_str()))
        .cloned()
        .collect();

    if stale.is_empty() {
        return Verdict::Pass;
    }

    reporter.log(
        Tone::Warning,
        &format!(
            "{} currently ignored error codes did not occur.",
            stale.len()
        ),
    );
    reporter.log(Tone::Plain, &stale.join("\n"));

    if !auto_update {
        reporter.log(Tone::Hint, AUTO_UPDATE_HINT);
        return Verdict::Pass;
    }

    for code in &stale {
        ignored_error_codes.shift_remove(code);
    }
    reporter.log(Tone::Plain, REGISTRY_UPDATE);
    Verdict::Pass
}

/// Allow-listed paths and patterns that matched no diagnostic
pub fn report_unused_file_paths<R: Reporter + ?Sized>(
    reporter: &mut R,
    auto_update: bool,
    file_path_matcher: &FilePathMatcher,
    loosely_type_checked_files: &mut IndexSet<String>,
) -> Verdict {
    let unused = file_path_matcher.unused_file_paths();

    if unused.is_empty() {
        return Verdict::Pass;
    }

    let (header, items) = tones(auto_update);
    reporter.log(
        header,
        &format!(
            "{} loosely type-checked files no longer have any errors and could be strictly type-checked.",
            unused.len()
        ),
    );
    reporter.log(items, &unused.join("\n"));

    if !auto_update {
        reporter.log(Tone::Hint, AUTO_UPDATE_HINT);
        return Verdict::Fail;
    }

    for file_path in unused {
        loosely_type_checked_files.shift_remove(file_path);
    }
    reporter.log(Tone::Plain, REGISTRY_UPDATE);
    Verdict::Pass
}

/// Errors with an ignored code in files that are not loosely type-checked yet
pub fn report_errors_that_could_be_ignored<R: Reporter + ?Sized>(
    reporter: &mut R,
    auto_update: bool,
    could_be_ignored: &[&TscDiagnostic],
    loosely_type_checked_files: &mut IndexSet<String>,
) -> Verdict {
    if could_be_ignored.is_empty() {
        return Verdict::Pass;
    }

    let (header, items) = tones(auto_update);
    reporter.log(
        header,
        &format!(
            "{} errors could be ignored, as their error codes are ignored.",
            could_be_ignored.len()
        ),
    );
    for diagnostic in could_be_ignored {
        reporter.log(items, &diagnostic.raw_text());
    }

    if !auto_update {
        reporter.log(
            Tone::Hint,
            "Use the --auto-update option to add these file paths to the registry.",
        );
        return Verdict::Fail;
    }

    for diagnostic in could_be_ignored {
        loosely_type_checked_files.insert(diagnostic.file_path.clone());
    }
    reporter.log(Tone::Plain, REGISTRY_UPDATE);
    Verdict::Pass
}

// header and item tones of a step that fails unless auto-update applies it
fn tones(auto_update: bool) -> (Tone, Tone) {
    if auto_update {
        (Tone::Warning, Tone::Plain)
    } else {
        (Tone::Failure, Tone::Failure)
    }
}

/// Errors that cannot be ignored. Always fails the compilation.
pub fn report_valid_errors<R: Reporter + ?Sized>(
    reporter: &mut R,
    valid: &[&TscDiagnostic],
) -> Verdict {
    if valid.is_empty() {
        return Verdict::Pass;
    }

    reporter.log(
        Tone::Failure,
        &format!(
            "{} errors could not be ignored as those codes are not in the ignored list.",
            valid.len()
        ),
    );
    for diagnostic in valid {
        reporter.log(Tone::Failure, &diagnostic.raw_text());
    }

    Verdict::Fail
}
