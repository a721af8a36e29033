use std::sync::OnceLock;

use regex::Regex;

/// One diagnostic reported by `tsc`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TscDiagnostic {
    /// Path as reported by the compiler, not normalized
    pub file_path: String,
    /// Compiler error code, e.g. `TS2532`
    pub error_code: String,
    /// The header line followed by its continuation lines
    pub raw_lines: Vec<String>,
}

impl TscDiagnostic {
    pub fn new(file_path: impl Into<String>, error_code: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            error_code: error_code.into(),
            raw_lines: vec![],
        }
    }

    /// The raw compiler output of this diagnostic
    pub fn raw_text(&self) -> String {
        self.raw_lines.join("\n")
    }
}

/// Regex to match a diagnostic header in either of the formats `tsc` prints
/// Example: "file.ts(1,19): error TS2322: Type 'string' is not assignable to type 'number'."
/// Example: "file.ts:1:19 - error TS2322: Type 'string' is not assignable to type 'number'."
static HEADER_REGEX: OnceLock<Regex> = OnceLock::new();

static ANSI_REGEX: OnceLock<Regex> = OnceLock::new();

fn header_regex() -> &'static Regex {
    HEADER_REGEX.get_or_init(|| {
        Regex::new(r"^(.*)(?:\([0-9]+,[0-9]+\):|:[0-9]+:[0-9]+ -) error (TS[0-9]{4,}):.*$")
            .expect("HEADER_REGEX should be valid")
    })
}

fn ansi_regex() -> &'static Regex {
    ANSI_REGEX.get_or_init(|| {
        Regex::new(r"[\x1b\x{9b}][\[()#;?]*(?:[0-9]{1,4}(?:;[0-9]{0,4})*)?[0-9A-ORZcf-nqry=><]")
            .expect("ANSI_REGEX should be valid")
    })
}

/// Strips terminal escape sequences and surrounding whitespace
pub fn normalize_line(raw: &str) -> String {
    ansi_regex().replace_all(raw, "").trim().to_string()
}

/// Parses a diagnostic header, returning a diagnostic holding only that line
pub fn parse_header(line: &str) -> Option<TscDiagnostic> {
    let captures = header_regex().captures(line)?;

    Some(TscDiagnostic {
        file_path: captures[1].to_string(),
        error_code: captures[2].to_string(),
        raw_lines: vec![line.to_string()],
    })
}

/// Incremental parser turning compiler output into diagnostics, one line at a time
///
/// Lines that are not diagnostic headers are appended to the diagnostic that is
/// currently open, or dropped when none is.
#[derive(Debug, Default)]
pub struct DiagnosticParser {
    open: Option<TscDiagnostic>,
}

impl DiagnosticParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw line of compiler output
    ///
    /// The diagnostic that `raw` opens or extends stays inside the parser and is
    /// reachable through [`DiagnosticParser::current`]. The return value is the
    /// diagnostic that `raw` closed: the previously open one when `raw` starts a
    /// new diagnostic, `None` otherwise. [`DiagnosticParser::finish`] closes the
    /// last one.
    pub fn push_line(&mut self, raw: &str) -> Option<TscDiagnostic> {
        let line = normalize_line(raw);
        if line.is_empty() {
            return None;
        }

        if let Some(diagnostic) = parse_header(&line) {
            return self.open.replace(diagnostic);
        }

        if let Some(open) = self.open.as_mut() {
            open.raw_lines.push(line);
        }
        None
    }

    /// The diagnostic continuation lines are currently appended to
    pub fn current(&self) -> Option<&TscDiagnostic> {
        self.open.as_ref()
    }

    /// Closes and returns the open diagnostic
    pub fn finish(&mut self) -> Option<TscDiagnostic> {
        self.open.take()
    }

    /// Drops the open diagnostic without returning it
    pub fn reset(&mut self) {
        self.open = None;
    }
}

/// Parses a complete compiler output
pub fn parse_tsc_errors<I, L>(lines: I) -> Vec<TscDiagnostic>
where
    I: IntoIterator<Item = L>,
    L: AsRef<str>,
{
    let mut parser = DiagnosticParser::new();
    let mut diagnostics: Vec<TscDiagnostic> = lines
        .into_iter()
        .filter_map(|line| parser.push_line(line.as_ref()))
        .collect();
    diagnostics.extend(parser.finish());
    diagnostics
}
