use std::ops::{BitOr, BitOrAssign};

/// How a reported message should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Success,
    Warning,
    /// Part of a failing outcome, including the raw text of real errors
    Failure,
    /// Suggests a command line option
    Hint,
}

/// Sink for the user-facing report
pub trait Reporter {
    fn log(&mut self, tone: Tone, message: &str);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn log(&mut self, tone: Tone, message: &str) {
        (**self).log(tone, message);
    }
}

#[cfg(test)]
impl Reporter for Vec<String> {
    fn log(&mut self, _tone: Tone, message: &str) {
        self.push(message.to_string());
    }
}

#[cfg(test)]
impl Reporter for Vec<(Tone, String)> {
    fn log(&mut self, tone: Tone, message: &str) {
        self.push((tone, message.to_string()));
    }
}

/// Outcome of a check; `Fail` maps to a non-zero exit code
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    #[default]
    Pass,
    Fail,
}

impl Verdict {
    pub fn is_failure(self) -> bool {
        self == Verdict::Fail
    }
}

impl BitOr for Verdict {
    type Output = Verdict;

    fn bitor(self, rhs: Verdict) -> Verdict {
        if self.is_failure() || rhs.is_failure() {
            Verdict::Fail
        } else {
            Verdict::Pass
        }
    }
}

impl BitOrAssign for Verdict {
    fn bitor_assign(&mut self, rhs: Verdict) {
        *self = *self | rhs;
    }
}
