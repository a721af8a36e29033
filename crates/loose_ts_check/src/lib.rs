pub mod utils;

use camino::Utf8PathBuf;
use clap::Parser;
use log::{Level, debug, log};
use loose_ts_check_config::{Config, FsAllowListStore};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tsc_errors::{Reporter, Session, Tone, Verdict};

use crate::utils::styles::{fmt_cyan, fmt_success, fmt_yellow};

#[derive(Debug, Parser)]
#[command(name = "loose-ts-check")]
#[command(version)]
#[command(about = "Loose TS Check - migrate to a stricter tsconfig one file at a time")]
#[command(
    long_about = "Reads the output of tsc from stdin and ignores errors whose code is allow-listed when they \
occur in a loosely type-checked file. Fails when real errors remain, or when the allow-lists are out of date."
)]
#[command(after_help = "EXAMPLES:\n  \
    tsc --noEmit | loose-ts-check --init\n  \
    tsc --noEmit | loose-ts-check\n  \
    tsc --noEmit | loose-ts-check --auto-update\n  \
    tsc --noEmit --watch | loose-ts-check\n\
")]
#[command(styles = utils::styles::get_styles())]
pub struct Cli {
    /// Path to a JSON file with an array of TSC error codes that should be ignored
    #[arg(
        long,
        env = "LOOSE_TS_CHECK_IGNORED_ERROR_CODES",
        default_value_t = Config::default_ignored_error_codes_path()
    )]
    pub ignored_error_codes: Utf8PathBuf,

    /// Path to a JSON file with an array of file paths (or glob patterns) that should be loosely
    /// checked. Ignored error codes are only ignored in those files.
    #[arg(
        long,
        env = "LOOSE_TS_CHECK_LOOSELY_TYPE_CHECKED_FILES",
        default_value_t = Config::default_loosely_type_checked_files_path()
    )]
    pub loosely_type_checked_files: Utf8PathBuf,

    /// Initialize the JSON files with existing TSC errors
    #[arg(long, short = 'i')]
    pub init: bool,

    /// Update the JSON files instead of failing when they are out of date
    #[arg(long)]
    pub auto_update: bool,

    /// No logging except for errors
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Verbose logging (-v) or trace logging (-vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            ignored_error_codes: self.ignored_error_codes.clone(),
            loosely_type_checked_files: self.loosely_type_checked_files.clone(),
            init: self.init,
            auto_update: self.auto_update,
        }
    }

    /// Checks the compiler output piped into stdin
    #[allow(clippy::missing_errors_doc)]
    pub async fn handle(&self) -> anyhow::Result<Verdict> {
        self.run(BufReader::new(tokio::io::stdin())).await
    }

    /// Checks the compiler output read from `input` until it ends
    #[allow(clippy::missing_errors_doc)]
    pub async fn run<I>(&self, input: I) -> anyhow::Result<Verdict>
    where
        I: AsyncBufRead + Unpin,
    {
        let mut session = Session::new(self.config(), FsAllowListStore, LogReporter)?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if let Some(verdict) = session.process_line(&line) {
                debug!("Compilation finished: {verdict:?}");
            }
        }

        Ok(session.finish())
    }
}

/// Prints the report through `log`, colored by tone
///
/// Failures are logged at error level so they survive `--quiet`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl LogReporter {
    #[must_use]
    pub fn level(tone: Tone) -> Level {
        match tone {
            Tone::Failure => Level::Error,
            Tone::Plain | Tone::Success | Tone::Warning | Tone::Hint => Level::Info,
        }
    }

    #[must_use]
    pub fn style(tone: Tone, message: &str) -> String {
        match tone {
            Tone::Plain | Tone::Failure => message.to_string(),
            Tone::Success => fmt_success(message),
            Tone::Warning => fmt_yellow(message),
            Tone::Hint => fmt_cyan(message),
        }
    }
}

impl Reporter for LogReporter {
    fn log(&mut self, tone: Tone, message: &str) {
        log!(Self::level(tone), "{}", Self::style(tone, message));
    }
}
