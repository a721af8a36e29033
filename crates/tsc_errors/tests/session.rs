use std::cell::RefCell;
use std::collections::HashMap;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use loose_ts_check_config::{AllowListError, AllowListStore, Config};
use tsc_errors::{Reporter, Session, SessionError, Tone, Verdict};

#[derive(Debug, Default)]
struct MemoryStore {
    files: RefCell<HashMap<Utf8PathBuf, Vec<String>>>,
    saves: RefCell<Vec<(Utf8PathBuf, Vec<String>)>>,
    read_only: bool,
}

impl MemoryStore {
    fn with(config: &Config, ignored_error_codes: &[&str], loosely_type_checked_files: &[&str]) -> Self {
        let store = Self::default();
        store.put(&config.ignored_error_codes, ignored_error_codes);
        store.put(&config.loosely_type_checked_files, loosely_type_checked_files);
        store
    }

    fn put(&self, path: &Utf8Path, values: &[&str]) {
        self.files.borrow_mut().insert(
            path.to_owned(),
            values.iter().map(ToString::to_string).collect(),
        );
    }

    fn saved(&self, path: &Utf8Path) -> Option<Vec<String>> {
        self.saves
            .borrow()
            .iter()
            .rev()
            .find(|(p, _)| p.as_path() == path)
            .map(|(_, values)| values.clone())
    }

    fn save_count(&self) -> usize {
        self.saves.borrow().len()
    }
}

impl AllowListStore for MemoryStore {
    fn read_json_array(
        &self,
        path: &Utf8Path,
        allow_missing: bool,
    ) -> Result<Vec<String>, AllowListError> {
        match self.files.borrow().get(path) {
            Some(values) => Ok(values.clone()),
            None if allow_missing => Ok(vec![]),
            None => Err(AllowListError::Read {
                path: path.to_owned(),
                source: io::Error::new(io::ErrorKind::NotFound, "not found"),
            }),
        }
    }

    fn save_json_array(&self, path: &Utf8Path, values: &[String]) -> Result<(), AllowListError> {
        if self.read_only {
            return Err(AllowListError::Write {
                path: path.to_owned(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.files
            .borrow_mut()
            .insert(path.to_owned(), values.to_vec());
        self.saves
            .borrow_mut()
            .push((path.to_owned(), values.to_vec()));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RecordingReporter {
    messages: Vec<(Tone, String)>,
}

impl RecordingReporter {
    fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|(_, m)| m.contains(needle))
    }

    fn logged(&self, message: &str) -> bool {
        self.messages.iter().any(|(_, m)| m == message)
    }

    fn tone_of(&self, message: &str) -> Option<Tone> {
        self.messages
            .iter()
            .find(|(_, m)| m == message)
            .map(|(tone, _)| *tone)
    }
}

impl Reporter for RecordingReporter {
    fn log(&mut self, tone: Tone, message: &str) {
        self.messages.push((tone, message.to_string()));
    }
}

fn error_line(path: &str, code: &str) -> String {
    format!("{path}(94,15): error {code}: stub error description generated in test")
}

fn run(store: &MemoryStore, config: Config, lines: &[String]) -> (Verdict, RecordingReporter) {
    let mut reporter = RecordingReporter::default();
    let verdict = {
        let mut session = Session::new(config, store, &mut reporter).unwrap();
        session.check(lines)
    };
    (verdict, reporter)
}

fn scenario_a_lines() -> Vec<String> {
    vec![
        error_line("a", "TS1234"),
        error_line("a", "TS1597"),
        error_line("c", "TS1111"),
        error_line("c", "TS1234"),
    ]
}

#[test]
fn test_no_errors_passes() {
    let config = Config::default();
    let store = MemoryStore::with(&config, &[], &[]);

    let (verdict, reporter) = run(&store, config, &[]);

    assert_eq!(verdict, Verdict::Pass);
    assert!(reporter.contains("No TSC errors detected"));
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_basic_ignore_reports_every_partition() {
    let config = Config::default();
    let store = MemoryStore::with(&config, &["TS1234"], &["a", "b"]);

    let (verdict, reporter) = run(&store, config, &scenario_a_lines());

    assert_eq!(verdict, Verdict::Fail);
    assert!(reporter.logged("4 errors detected"));
    assert!(reporter.logged("1 errors have been ignored."));
    assert!(reporter.logged("3 errors were not ignored."));
    assert!(reporter.logged("1 errors could be ignored, as their error codes are ignored."));
    assert!(reporter.logged(
        "1 loosely type-checked files no longer have any errors and could be strictly type-checked."
    ));
    assert!(reporter.logged(
        "2 errors could not be ignored as those codes are not in the ignored list."
    ));
    assert!(reporter.logged(&error_line("c", "TS1234")));
    assert!(reporter.logged(&error_line("a", "TS1597")));
    assert!(reporter.logged(&error_line("c", "TS1111")));
    assert!(!reporter.logged(&error_line("a", "TS1234")));
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_report_tones() {
    let config = Config::default();
    let store = MemoryStore::with(&config, &["TS1234"], &["a", "b"]);

    let (_, reporter) = run(&store, config, &scenario_a_lines());

    assert_eq!(reporter.tone_of("1 errors have been ignored."), Some(Tone::Plain));
    assert_eq!(reporter.tone_of("3 errors were not ignored."), Some(Tone::Warning));
    assert_eq!(reporter.tone_of(&error_line("a", "TS1597")), Some(Tone::Failure));
    assert_eq!(reporter.tone_of(&error_line("c", "TS1234")), Some(Tone::Failure));
    assert_eq!(reporter.tone_of("b"), Some(Tone::Failure));
}

#[test]
fn test_every_could_be_ignored_error_is_displayed() {
    let config = Config::default();
    let store = MemoryStore::with(&config, &["TS1234"], &["a", "b"]);
    let mut lines = scenario_a_lines();
    lines.push(error_line("d", "TS1234"));

    let (verdict, reporter) = run(&store, config, &lines);

    assert_eq!(verdict, Verdict::Fail);
    assert!(reporter.logged(&error_line("c", "TS1234")));
    assert!(reporter.logged(&error_line("d", "TS1234")));
}

#[test]
fn test_stale_codes_do_not_fail() {
    let config = Config::default();
    let store = MemoryStore::with(&config, &["TS1111", "TS2222", "TS3333"], &["a"]);

    let (verdict, reporter) = run(&store, config, &[error_line("a", "TS1111")]);

    assert_eq!(verdict, Verdict::Pass);
    assert!(reporter.logged("2 currently ignored error codes did not occur."));
    assert!(reporter.contains("--auto-update"));
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_unused_path_fails_without_auto_update() {
    let config = Config::default();
    let store = MemoryStore::with(&config, &["TS1234"], &["a", "b"]);

    let (verdict, reporter) = run(&store, config, &[error_line("a", "TS1234")]);

    assert_eq!(verdict, Verdict::Fail);
    assert!(reporter.logged("b"));
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_continuation_lines_are_displayed_with_their_error() {
    let config = Config::default();
    let store = MemoryStore::with(&config, &[], &[]);
    let lines = vec![
        "src/a.ts:3:7 - error TS2322: Type 'string' is not assignable to type 'number'.".to_string(),
        String::new(),
        "3 const x: number = 'a';".to_string(),
        "        ~".to_string(),
        "Found 1 error in src/a.ts:3".to_string(),
    ];

    let (verdict, reporter) = run(&store, config, &lines);

    assert_eq!(verdict, Verdict::Fail);
    assert!(reporter.logged(
        "src/a.ts:3:7 - error TS2322: Type 'string' is not assignable to type 'number'.\n\
         3 const x: number = 'a';\n\
         ~\n\
         Found 1 error in src/a.ts:3"
    ));
}

#[test]
fn test_colored_output_is_parsed() {
    let config = Config::default();
    let store = MemoryStore::with(&config, &["TS2322"], &["src/a.ts"]);
    let line = "\u{1b}[96msrc/a.ts\u{1b}[0m:\u{1b}[93m3\u{1b}[0m:\u{1b}[93m7\u{1b}[0m - \
                \u{1b}[91merror\u{1b}[0m\u{1b}[90m TS2322: \u{1b}[0mType 'string' is not assignable."
        .to_string();

    let (verdict, reporter) = run(&store, config, &[line]);

    assert_eq!(verdict, Verdict::Pass);
    assert!(reporter.logged("1 errors have been ignored."));
}

#[test]
fn test_glob_patterns_ignore_errors() {
    let config = Config::default();
    let store = MemoryStore::with(&config, &["TS7006"], &["src/legacy/**/*.ts", "src/old/*.ts"]);
    let lines = vec![
        error_line("src/legacy/deep/nested/file.ts", "TS7006"),
        error_line("src/old/file.ts", "TS7006"),
    ];

    let (verdict, reporter) = run(&store, config, &lines);

    assert_eq!(verdict, Verdict::Pass);
    assert!(reporter.logged("2 errors have been ignored."));
}

#[test]
fn test_single_star_stays_within_a_segment() {
    let config = Config::default();
    let store = MemoryStore::with(&config, &["TS7006"], &["src/*.ts"]);

    let (verdict, reporter) = run(&store, config, &[error_line("src/nested/file.ts", "TS7006")]);

    assert_eq!(verdict, Verdict::Fail);
    assert!(reporter.logged("1 errors could be ignored, as their error codes are ignored."));
    assert!(reporter.logged("src/*.ts"));
}

mod auto_update {
    use super::*;

    fn config() -> Config {
        Config::default().with_auto_update(true)
    }

    #[test]
    fn test_promotes_files_whose_errors_can_be_ignored() {
        let config = config();
        let store = MemoryStore::with(&config, &["TS1111", "TS2222"], &["a", "b"]);
        let lines = vec![
            error_line("a", "TS1111"),
            error_line("b", "TS1111"),
            error_line("c", "TS2222"),
        ];

        let (verdict, reporter) = run(&store, config.clone(), &lines);

        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(
            store.saved(&config.loosely_type_checked_files),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(store.saved(&config.ignored_error_codes), None);
        assert!(reporter.logged("Registry will be updated."));
        assert!(reporter.logged("The list of loosely type-checked files updated successfully"));
    }

    #[test]
    fn test_does_not_promote_files_with_unignored_codes() {
        let config = config();
        let store = MemoryStore::with(&config, &["TS1111"], &["a", "b"]);
        let lines = vec![
            error_line("a", "TS1111"),
            error_line("b", "TS1111"),
            error_line("c", "TS2222"),
        ];

        let (verdict, _) = run(&store, config, &lines);

        assert_eq!(verdict, Verdict::Fail);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_removes_unused_file_paths() {
        let config = config();
        let store = MemoryStore::with(&config, &["TS1111"], &["a", "b"]);

        let (verdict, _) = run(&store, config.clone(), &[error_line("a", "TS1111")]);

        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(
            store.saved(&config.loosely_type_checked_files),
            Some(vec!["a".to_string()])
        );
    }

    #[test]
    fn test_removes_error_codes_that_did_not_occur() {
        let config = config();
        let store = MemoryStore::with(&config, &["TS1111", "TS2222"], &["a"]);

        let (verdict, _) = run(&store, config.clone(), &[error_line("a", "TS1111")]);

        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(
            store.saved(&config.ignored_error_codes),
            Some(vec!["TS1111".to_string()])
        );
        assert_eq!(store.saved(&config.loosely_type_checked_files), None);
    }

    #[test]
    fn test_applies_removal_and_addition_together() {
        let config = config();
        let store = MemoryStore::with(
            &config,
            &["TS1111"],
            &[
                "file that has ignored error",
                "file that has no errors",
                "new file that has an ignored error",
            ],
        );
        let lines = vec![
            error_line("file that has ignored error", "TS1111"),
            error_line("new file that has an ignored error", "TS1111"),
            error_line("new file that has a new error", "TS2222"),
        ];

        let (verdict, _) = run(&store, config.clone(), &lines);

        assert_eq!(verdict, Verdict::Fail);
        assert_eq!(
            store.saved(&config.loosely_type_checked_files),
            Some(vec![
                "file that has ignored error".to_string(),
                "new file that has an ignored error".to_string(),
            ])
        );
    }

    #[test]
    fn test_passes_when_no_valid_errors_remain() {
        let config = config();
        let store = MemoryStore::with(
            &config,
            &["TS1111"],
            &[
                "file that has ignored error",
                "file that has no errors",
                "new file that has an ignored error",
            ],
        );
        let lines = vec![
            error_line("file that has ignored error", "TS1111"),
            error_line("new file that has an ignored error", "TS1111"),
        ];

        let (verdict, _) = run(&store, config, &lines);

        assert_eq!(verdict, Verdict::Pass);
    }

    #[test]
    fn test_write_failure_fails_the_check() {
        let config = config();
        let mut store = MemoryStore::with(&config, &["TS1111"], &["a", "b"]);
        store.read_only = true;

        let (verdict, reporter) = run(&store, config, &[error_line("a", "TS1111")]);

        assert_eq!(verdict, Verdict::Fail);
        assert!(reporter.logged("Error when saving the list of loosely type-checked files"));
        assert!(!reporter.contains("Updating the list of ignored error codes"));
    }
}

mod init {
    use super::*;

    fn config() -> Config {
        Config::default().with_init(true)
    }

    #[test]
    fn test_does_nothing_without_errors() {
        let store = MemoryStore::default();

        let (verdict, _) = run(&store, config(), &[]);

        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_bootstraps_missing_files() {
        let config = config();
        let store = MemoryStore::default();

        let (verdict, reporter) = run(
            &store,
            config.clone(),
            &[error_line("app/pages/site/site-pipelines/new.ts", "TS2532")],
        );

        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(store.save_count(), 2);
        assert_eq!(
            store.saves.borrow()[0],
            (
                config.loosely_type_checked_files.clone(),
                vec!["app/pages/site/site-pipelines/new.ts".to_string()]
            )
        );
        assert_eq!(
            store.saved(&config.ignored_error_codes),
            Some(vec!["TS2532".to_string()])
        );
        assert!(reporter.logged("Configuration files saved successfully"));
        assert!(!reporter.contains("errors have been ignored"));
    }

    #[test]
    fn test_uses_configured_paths() {
        let config = Config {
            ignored_error_codes: "ignored.json".into(),
            loosely_type_checked_files: "files.json".into(),
            ..config()
        };
        let store = MemoryStore::default();

        let lines = vec![
            error_line("b.ts", "TS2532"),
            error_line("a.ts", "TS7006"),
            error_line("b.ts", "TS2532"),
        ];
        let (verdict, _) = run(&store, config, &lines);

        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(
            store.saved(Utf8Path::new("files.json")),
            Some(vec!["a.ts".to_string(), "b.ts".to_string()])
        );
        assert_eq!(
            store.saved(Utf8Path::new("ignored.json")),
            Some(vec!["TS2532".to_string(), "TS7006".to_string()])
        );
    }
}

mod configuration_errors {
    use super::*;

    #[test]
    fn test_every_read_error_is_logged() {
        let store = MemoryStore::default();
        let mut reporter = RecordingReporter::default();

        let Err(err) = Session::new(Config::default(), &store, &mut reporter) else {
            panic!("missing files should not be accepted without --init");
        };

        match &err {
            SessionError::ReadConfig(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.to_string(), "Either fix the files or pass the --init option");
        assert!(reporter.contains("ignored-error-codes.json"));
        assert!(reporter.contains("loosely-type-checked-files.json"));
        assert!(reporter.messages.iter().all(|(tone, _)| *tone == Tone::Failure));
    }

    #[test]
    fn test_invalid_error_codes_are_rejected() {
        let config = Config::default();
        let store = MemoryStore::with(&config, &["invalid code", "TS1234", "another invalid code"], &[]);
        let mut reporter = RecordingReporter::default();

        let Err(err) = Session::new(config, &store, &mut reporter) else {
            panic!("invalid codes should not be accepted");
        };

        assert!(matches!(
            &err,
            SessionError::InvalidErrorCodes { codes, .. } if codes.len() == 2
        ));
        assert_eq!(
            err.to_string(),
            "Invalid TSC error codes in ignored-error-codes.json"
        );
        assert!(reporter.logged("Invalid TSC error code: invalid code"));
        assert!(reporter.logged("Invalid TSC error code: another invalid code"));
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let config = Config::default();
        let store = MemoryStore::with(&config, &["TS1234"], &["src/{a"]);
        let mut reporter = RecordingReporter::default();

        let result = Session::new(config, &store, &mut reporter);

        assert!(matches!(result, Err(SessionError::InvalidPattern(_))));
    }
}

mod watch_mode {
    use super::*;

    const START: &str = "[10:00:00 AM] Starting compilation in watch mode...";
    const FINISHED: &str = "[10:00:02 AM] Found 1 error. Watching for file changes.";
    const FINISHED_CLEAN: &str = "[10:00:05 AM] Found 0 errors. Watching for file changes.";
    const FILE_CHANGE: &str = "[10:00:04 AM] File change detected. Starting incremental compilation...";

    #[test]
    fn test_each_compilation_is_judged() {
        let config = Config::default();
        let store = MemoryStore::with(&config, &[], &[]);
        let mut reporter = RecordingReporter::default();
        let mut session = Session::new(config, &store, &mut reporter).unwrap();

        assert_eq!(session.process_line(START), None);
        assert!(session.watch_mode_detected());
        assert_eq!(session.process_line(&error_line("a", "TS1111")), None);
        assert_eq!(session.process_line(FINISHED), Some(Verdict::Fail));

        assert_eq!(session.process_line(FILE_CHANGE), None);
        assert_eq!(session.process_line(FINISHED_CLEAN), Some(Verdict::Pass));
        assert_eq!(session.finish(), Verdict::Pass);

        let reporter = session.reporter();
        assert_eq!(
            reporter
                .messages
                .iter()
                .filter(|(_, m)| m == "1 errors detected")
                .count(),
            1
        );
        assert!(reporter.logged("No TSC errors detected"));
    }

    #[test]
    fn test_file_change_discards_collected_errors() {
        let config = Config::default();
        let store = MemoryStore::with(&config, &[], &[]);
        let mut reporter = RecordingReporter::default();
        let mut session = Session::new(config, &store, &mut reporter).unwrap();

        let _ = session.process_line(START);
        let _ = session.process_line(&error_line("a", "TS1111"));
        let _ = session.process_line(FILE_CHANGE);
        assert_eq!(session.process_line(FINISHED_CLEAN), Some(Verdict::Pass));
    }

    #[test]
    fn test_final_verdict_is_the_last_completed_cycle() {
        let config = Config::default();
        let store = MemoryStore::with(&config, &[], &[]);
        let mut reporter = RecordingReporter::default();
        let mut session = Session::new(config, &store, &mut reporter).unwrap();

        let _ = session.process_line(START);
        let _ = session.process_line(&error_line("a", "TS1111"));
        assert_eq!(session.process_line(FINISHED), Some(Verdict::Fail));
        let _ = session.process_line(FILE_CHANGE);
        let _ = session.process_line(&error_line("b", "TS2222"));

        assert_eq!(session.finish(), Verdict::Fail);
        assert!(!session.reporter().contains("b(94,15)"));
    }

    #[test]
    fn test_no_completed_cycle_passes() {
        let config = Config::default();
        let store = MemoryStore::with(&config, &[], &[]);

        let (verdict, reporter) = run(
            &store,
            config,
            &[START.to_string(), error_line("a", "TS1111")],
        );

        assert_eq!(verdict, Verdict::Pass);
        assert!(!reporter.contains("errors detected"));
    }

    #[test]
    fn test_path_usage_resets_between_compilations() {
        let config = Config::default();
        let store = MemoryStore::with(&config, &["TS1111"], &["a", "b"]);
        let mut reporter = RecordingReporter::default();
        let mut session = Session::new(config, &store, &mut reporter).unwrap();

        let _ = session.process_line(START);
        let _ = session.process_line(&error_line("a", "TS1111"));
        let _ = session.process_line(&error_line("b", "TS1111"));
        assert_eq!(session.process_line(FINISHED), Some(Verdict::Pass));
        assert!(!session.reporter().contains("no longer have any errors"));

        let _ = session.process_line(FILE_CHANGE);
        let _ = session.process_line(&error_line("a", "TS1111"));
        assert_eq!(session.process_line(FINISHED), Some(Verdict::Fail));
        assert_eq!(session.finish(), Verdict::Fail);

        let reporter = session.reporter();
        assert!(reporter.logged(
            "1 loosely type-checked files no longer have any errors and could be strictly type-checked."
        ));
        assert!(reporter.logged("b"));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_markers_before_start_are_not_recognized() {
        let config = Config::default();
        let store = MemoryStore::with(&config, &[], &[]);
        let mut reporter = RecordingReporter::default();
        let mut session = Session::new(config, &store, &mut reporter).unwrap();

        assert_eq!(session.process_line(FINISHED), None);
        assert!(!session.watch_mode_detected());
        assert_eq!(session.finish(), Verdict::Pass);
    }

    #[test]
    fn test_updated_registries_are_adopted() {
        let config = Config::default().with_auto_update(true);
        let store = MemoryStore::with(&config, &["TS1111"], &["a", "b"]);
        let mut reporter = RecordingReporter::default();
        let mut session = Session::new(config.clone(), &store, &mut reporter).unwrap();

        let _ = session.process_line(START);
        let _ = session.process_line(&error_line("a", "TS1111"));
        assert_eq!(session.process_line(FINISHED), Some(Verdict::Pass));
        assert_eq!(
            session
                .registries()
                .loosely_type_checked_files
                .iter()
                .collect::<Vec<_>>(),
            vec!["a"]
        );

        let _ = session.process_line(FILE_CHANGE);
        let _ = session.process_line(&error_line("a", "TS1111"));
        let _ = session.process_line(&error_line("c", "TS1111"));
        assert_eq!(session.process_line(FINISHED), Some(Verdict::Pass));
        assert_eq!(session.finish(), Verdict::Pass);

        assert_eq!(store.save_count(), 2);
        assert_eq!(
            store.saved(&config.loosely_type_checked_files),
            Some(vec!["a".to_string(), "c".to_string()])
        );
    }
}
