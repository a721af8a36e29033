use std::sync::OnceLock;

use regex::Regex;

static ERROR_CODE_REGEX: OnceLock<Regex> = OnceLock::new();

fn error_code_regex() -> &'static Regex {
    ERROR_CODE_REGEX
        .get_or_init(|| Regex::new(r"^TS[0-9]{4,}$").expect("ERROR_CODE_REGEX should be valid"))
}

pub fn is_valid_error_code(code: &str) -> bool {
    error_code_regex().is_match(code)
}

/// Returns the codes that are not of the form `TS` followed by at least four digits
pub fn invalid_error_codes<'a, I>(codes: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    codes
        .into_iter()
        .map(String::as_str)
        .filter(|code| !is_valid_error_code(code))
        .collect()
}
