//! Working copies of the allow-lists and their persistence.

use camino::Utf8Path;
use indexmap::IndexSet;
use log::debug;
use loose_ts_check_config::{AllowListStore, Config};

use crate::{
    parse::TscDiagnostic,
    report::{Reporter, Tone, Verdict},
};

/// The ignored error codes and loosely type-checked file paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registries {
    pub ignored_error_codes: IndexSet<String>,
    pub loosely_type_checked_files: IndexSet<String>,
}

impl Registries {
    pub fn new<C, F>(ignored_error_codes: C, loosely_type_checked_files: F) -> Self
    where
        C: IntoIterator<Item = String>,
        F: IntoIterator<Item = String>,
    {
        Self {
            ignored_error_codes: ignored_error_codes.into_iter().collect(),
            loosely_type_checked_files: loosely_type_checked_files.into_iter().collect(),
        }
    }
}

/// Membership equality, ignoring order
pub fn same_members(a: &IndexSet<String>, b: &IndexSet<String>) -> bool {
    a.len() == b.len() && a.iter().all(|item| b.contains(item))
}

pub fn sorted(set: &IndexSet<String>) -> Vec<String> {
    let mut values: Vec<String> = set.iter().cloned().collect();
    values.sort();
    values
}

fn unique_sorted<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let set: IndexSet<String> = values.into_iter().map(ToString::to_string).collect();
    sorted(&set)
}

/// Registries as they are on disk after [`update_registries`]
#[derive(Debug)]
pub struct UpdateOutcome {
    pub verdict: Verdict,
    pub persisted: Registries,
}

/// Persists the working copies that differ from the originals
///
/// The file list is written before the code list. After a failed write no
/// further writes are attempted and the cycle fails.
pub fn update_registries<S, R>(
    store: &S,
    reporter: &mut R,
    config: &Config,
    original: &Registries,
    updated: &Registries,
) -> UpdateOutcome
where
    S: AllowListStore + ?Sized,
    R: Reporter + ?Sized,
{
    let mut persisted = original.clone();

    if !save_if_changed(
        store,
        reporter,
        &config.loosely_type_checked_files,
        "loosely type-checked files",
        &original.loosely_type_checked_files,
        &updated.loosely_type_checked_files,
    ) {
        return UpdateOutcome {
            verdict: Verdict::Fail,
            persisted,
        };
    }
    persisted
        .loosely_type_checked_files
        .clone_from(&updated.loosely_type_checked_files);

    if !save_if_changed(
        store,
        reporter,
        &config.ignored_error_codes,
        "ignored error codes",
        &original.ignored_error_codes,
        &updated.ignored_error_codes,
    ) {
        return UpdateOutcome {
            verdict: Verdict::Fail,
            persisted,
        };
    }
    persisted
        .ignored_error_codes
        .clone_from(&updated.ignored_error_codes);

    UpdateOutcome {
        verdict: Verdict::Pass,
        persisted,
    }
}

// returns false when the write failed
fn save_if_changed<S, R>(
    store: &S,
    reporter: &mut R,
    path: &Utf8Path,
    name: &str,
    original: &IndexSet<String>,
    updated: &IndexSet<String>,
) -> bool
where
    S: AllowListStore + ?Sized,
    R: Reporter + ?Sized,
{
    if same_members(original, updated) {
        debug!("The list of {name} is unchanged, skipping {path}");
        return true;
    }

    reporter.log(Tone::Plain, &format!("Updating the list of {name}..."));

    match store.save_json_array(path, &sorted(updated)) {
        Ok(()) => {
            reporter.log(
                Tone::Success,
                &format!("The list of {name} updated successfully"),
            );
            true
        }
        Err(e) => {
            reporter.log(
                Tone::Failure,
                &format!("Error when saving the list of {name}"),
            );
            reporter.log(Tone::Failure, &e.to_string());
            false
        }
    }
}

/// Bootstraps both registries from the current diagnostics
pub fn initialize_config_files<S, R>(
    store: &S,
    reporter: &mut R,
    config: &Config,
    diagnostics: &[&TscDiagnostic],
) -> Verdict
where
    S: AllowListStore + ?Sized,
    R: Reporter + ?Sized,
{
    reporter.log(Tone::Plain, "Initializing configuration files...");

    let files = unique_sorted(diagnostics.iter().map(|d| d.file_path.as_str()));
    let codes = unique_sorted(diagnostics.iter().map(|d| d.error_code.as_str()));

    for (path, values) in [
        (&config.loosely_type_checked_files, files),
        (&config.ignored_error_codes, codes),
    ] {
        if let Err(e) = store.save_json_array(path, &values) {
            reporter.log(Tone::Failure, &format!("Error when saving {path}"));
            reporter.log(Tone::Failure, &e.to_string());
            return Verdict::Fail;
        }
    }

    reporter.log(Tone::Success, "Configuration files saved successfully");
    Verdict::Pass
}
