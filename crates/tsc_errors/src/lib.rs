//! # TSC Errors
//!
//! Filters the diagnostics of the TypeScript compiler against two allow-lists:
//! error codes that may be ignored, and files that are only loosely
//! type-checked. An error is ignored only when both its code and its file are
//! allow-listed.
//!
//! ## Overview
//!
//! - **Parsing**: `tsc` output is parsed line by line into diagnostics, with
//!   continuation lines kept as raw text
//! - **Classification**: each diagnostic is classified against the allow-lists;
//!   file path entries may be glob patterns and track their own usage
//! - **Reconciliation**: stale error codes, unused file paths, promotable file
//!   paths and real errors are reported, and optionally written back
//! - **Watch Mode**: `tsc --watch` output is judged once per compilation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use loose_ts_check_config::{Config, FsAllowListStore};
//! use tsc_errors::{Reporter, Session, Tone};
//!
//! struct Stdout;
//!
//! impl Reporter for Stdout {
//!     fn log(&mut self, _tone: Tone, message: &str) {
//!         println!("{message}");
//!     }
//! }
//!
//! let mut session = Session::new(Config::default(), FsAllowListStore, Stdout)?;
//! let verdict = session.check([
//!     "src/app.ts(3,7): error TS2322: Type 'string' is not assignable to type 'number'.",
//! ]);
//! assert!(verdict.is_failure());
//! # Ok::<(), tsc_errors::SessionError>(())
//! ```

pub mod classify;
pub mod matcher;
pub mod parse;
pub mod reconcile;
pub mod registry;
pub mod report;
pub mod session;
pub mod store;
pub mod validate;
pub mod watch;

pub use classify::{Classification, classify_tsc_error};
pub use matcher::{FilePathMatcher, MatcherError};
pub use parse::{DiagnosticParser, TscDiagnostic, parse_tsc_errors};
pub use registry::Registries;
pub use report::{Reporter, Tone, Verdict};
pub use session::{Session, SessionError};
pub use store::ErrorStore;
pub use watch::WatchModeSpy;
