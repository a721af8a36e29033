use camino::Utf8PathBuf;
use log::{debug, trace, warn};
use loose_ts_check_config::{AllowListError, AllowListStore, Config};
use thiserror::Error;

use crate::{
    classify::{Classification, classify_tsc_error},
    matcher::{FilePathMatcher, MatcherError},
    parse::{DiagnosticParser, TscDiagnostic, normalize_line},
    reconcile::reconcile,
    registry::{Registries, initialize_config_files, update_registries},
    report::{Reporter, Tone, Verdict},
    store::ErrorStore,
    validate::invalid_error_codes,
    watch::WatchModeSpy,
};

/// Errors that prevent a session from processing any diagnostic
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Either fix the files or pass the --init option")]
    ReadConfig(Vec<AllowListError>),
    #[error("Invalid TSC error codes in {path}")]
    InvalidErrorCodes { path: Utf8PathBuf, codes: Vec<String> },
    #[error(transparent)]
    InvalidPattern(#[from] MatcherError),
}

/// Filters the output of one `tsc` invocation
///
/// Lines are fed one at a time with [`Session::process_line`]. Outside of watch
/// mode the whole output forms a single compilation that is judged by
/// [`Session::finish`]. In watch mode every "Watching for file changes." marker
/// completes a compilation and a file change marker discards whatever was
/// collected since.
#[derive(Debug)]
pub struct Session<S, R> {
    config: Config,
    store: S,
    reporter: R,
    registries: Registries,
    file_path_matcher: FilePathMatcher,
    parser: DiagnosticParser,
    errors: ErrorStore,
    spy: WatchModeSpy,
    last_verdict: Verdict,
}

impl<S, R> Session<S, R>
where
    S: AllowListStore,
    R: Reporter,
{
    /// Reads and validates both allow-lists
    ///
    /// With `config.init` missing files read as empty lists.
    ///
    /// # Errors
    ///
    /// Fails when an allow-list cannot be read, holds an invalid error code or
    /// holds a glob pattern that does not compile. Details are logged to
    /// `reporter` before returning.
    pub fn new(config: Config, store: S, mut reporter: R) -> Result<Self, SessionError> {
        let allow_missing = config.init;
        let codes = store.read_json_array(&config.ignored_error_codes, allow_missing);
        let files = store.read_json_array(&config.loosely_type_checked_files, allow_missing);

        let (codes, files) = match (codes, files) {
            (Ok(codes), Ok(files)) => (codes, files),
            (codes, files) => {
                let errors: Vec<AllowListError> =
                    [codes.err(), files.err()].into_iter().flatten().collect();
                for e in &errors {
                    reporter.log(Tone::Failure, &e.to_string());
                }
                return Err(SessionError::ReadConfig(errors));
            }
        };

        let registries = Registries::new(codes, files);

        let invalid = invalid_error_codes(&registries.ignored_error_codes);
        if !invalid.is_empty() {
            for code in &invalid {
                reporter.log(Tone::Failure, &format!("Invalid TSC error code: {code}"));
            }
            return Err(SessionError::InvalidErrorCodes {
                path: config.ignored_error_codes.clone(),
                codes: invalid.iter().map(ToString::to_string).collect(),
            });
        }

        let file_path_matcher = FilePathMatcher::new(&registries.loosely_type_checked_files)?;

        debug!(
            "Loaded {} ignored error codes and {} loosely type-checked files",
            registries.ignored_error_codes.len(),
            registries.loosely_type_checked_files.len()
        );

        Ok(Self {
            config,
            store,
            reporter,
            registries,
            file_path_matcher,
            parser: DiagnosticParser::new(),
            errors: ErrorStore::new(),
            spy: WatchModeSpy::new(),
            last_verdict: Verdict::Pass,
        })
    }

    /// Feeds one raw line of compiler output
    ///
    /// Returns the verdict of a watch mode compilation when `raw` completes it.
    pub fn process_line(&mut self, raw: &str) -> Option<Verdict> {
        let line = normalize_line(raw);

        if self.spy.detect_compilation_start(&line) {
            debug!("Watch mode detected");
            return None;
        }

        if self.spy.detect_file_change(&line) {
            debug!("File change detected, discarding {} errors", self.errors.len());
            self.reset_cycle();
            return None;
        }

        if self.spy.detect_compilation_finished(&line) {
            self.flush_parser();
            let verdict = self.complete_cycle();
            self.reset_cycle();
            self.last_verdict = verdict;
            return Some(verdict);
        }

        if let Some(diagnostic) = self.parser.push_line(&line) {
            self.record(diagnostic);
        }
        None
    }

    /// Ends the input
    ///
    /// Outside of watch mode this judges everything fed so far. In watch mode
    /// the verdict of the last completed compilation is returned and an
    /// unfinished compilation is dropped.
    pub fn finish(&mut self) -> Verdict {
        if self.spy.watch_mode_detected() {
            if self.parser.current().is_some() || !self.errors.is_empty() {
                debug!("Input ended during a compilation, dropping its errors");
            }
            self.reset_cycle();
            return self.last_verdict;
        }

        self.flush_parser();
        let verdict = self.complete_cycle();
        self.reset_cycle();
        self.last_verdict = verdict;
        verdict
    }

    /// Judges a complete compiler output
    pub fn check<I, L>(&mut self, lines: I) -> Verdict
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        for line in lines {
            let _ = self.process_line(line.as_ref());
        }
        self.finish()
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn watch_mode_detected(&self) -> bool {
        self.spy.watch_mode_detected()
    }

    fn flush_parser(&mut self) {
        if let Some(diagnostic) = self.parser.finish() {
            self.record(diagnostic);
        }
    }

    fn record(&mut self, diagnostic: TscDiagnostic) {
        // init bootstraps from every diagnostic, no lookup needed
        let classification = if self.config.init {
            Classification::Valid
        } else {
            classify_tsc_error(
                &diagnostic,
                &self.registries.ignored_error_codes,
                &mut self.file_path_matcher,
            )
        };
        trace!(
            "{} {}: {classification:?}",
            diagnostic.file_path, diagnostic.error_code
        );
        self.errors.push(diagnostic, classification);
    }

    fn reset_cycle(&mut self) {
        self.errors.reset();
        self.parser.reset();
        self.file_path_matcher.reset_usage();
    }

    fn complete_cycle(&mut self) -> Verdict {
        let mut persisted = None;

        let verdict = {
            let partitions = self.errors.partitions();

            if partitions.all.is_empty() {
                self.reporter.log(Tone::Success, "No TSC errors detected");
                return Verdict::Pass;
            }

            self.reporter.log(
                Tone::Plain,
                &format!("{} errors detected", partitions.all.len()),
            );

            if self.config.init {
                return initialize_config_files(
                    &self.store,
                    &mut self.reporter,
                    &self.config,
                    &partitions.all,
                );
            }

            self.reporter.log(
                Tone::Plain,
                &format!("{} errors have been ignored.", partitions.ignored.len()),
            );
            if !partitions.unignored.is_empty() {
                self.reporter.log(
                    Tone::Warning,
                    &format!("{} errors were not ignored.", partitions.unignored.len()),
                );
            }

            let outcome = reconcile(
                &mut self.reporter,
                self.config.auto_update,
                &partitions,
                &self.file_path_matcher,
                &self.registries,
            );
            let mut verdict = outcome.verdict;

            if self.config.auto_update {
                let update = update_registries(
                    &self.store,
                    &mut self.reporter,
                    &self.config,
                    &self.registries,
                    &outcome.updated,
                );
                verdict |= update.verdict;
                persisted = Some(update.persisted);
            }

            verdict
        };

        if let Some(persisted) = persisted {
            self.adopt(persisted);
        }

        verdict
    }

    fn adopt(&mut self, persisted: Registries) {
        if persisted == self.registries {
            return;
        }

        match FilePathMatcher::new(&persisted.loosely_type_checked_files) {
            Ok(matcher) => {
                debug!("Adopting the updated registries");
                self.file_path_matcher = matcher;
                self.registries = persisted;
            }
            Err(e) => warn!("Keeping the previous loosely type-checked files: {e}"),
        }
    }
}
