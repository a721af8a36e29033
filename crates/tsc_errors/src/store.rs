use crate::{classify::Classification, parse::TscDiagnostic};

/// Classified diagnostics of one compilation, in the order they were reported
#[derive(Debug, Default)]
pub struct ErrorStore {
    entries: Vec<(Classification, TscDiagnostic)>,
}

/// The views of an [`ErrorStore`] the report is built from
#[derive(Debug, Default)]
pub struct Partitions<'a> {
    pub all: Vec<&'a TscDiagnostic>,
    pub ignored: Vec<&'a TscDiagnostic>,
    pub unignored: Vec<&'a TscDiagnostic>,
    pub could_be_ignored: Vec<&'a TscDiagnostic>,
    pub valid: Vec<&'a TscDiagnostic>,
}

impl ErrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: TscDiagnostic, classification: Classification) {
        self.entries.push((classification, diagnostic));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all(&self) -> Vec<&TscDiagnostic> {
        self.entries.iter().map(|(_, d)| d).collect()
    }

    pub fn ignored(&self) -> Vec<&TscDiagnostic> {
        self.select(|c| c == Classification::Ignored)
    }

    /// Everything that is not ignored
    pub fn reported(&self) -> Vec<&TscDiagnostic> {
        self.select(|c| c != Classification::Ignored)
    }

    /// Errors whose code is not allow-listed, whatever their file path
    pub fn valid(&self) -> Vec<&TscDiagnostic> {
        self.select(|c| !c.error_code_match())
    }

    pub fn could_be_ignored(&self) -> Vec<&TscDiagnostic> {
        self.select(|c| c == Classification::CouldBeIgnored)
    }

    pub fn partitions(&self) -> Partitions<'_> {
        let mut partitions = Partitions::default();

        for (classification, diagnostic) in &self.entries {
            partitions.all.push(diagnostic);
            match classification {
                Classification::Ignored => partitions.ignored.push(diagnostic),
                Classification::CouldBeIgnored => {
                    partitions.unignored.push(diagnostic);
                    partitions.could_be_ignored.push(diagnostic);
                }
                Classification::FilePathOnly | Classification::Valid => {
                    partitions.unignored.push(diagnostic);
                    partitions.valid.push(diagnostic);
                }
            }
        }

        partitions
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    fn select(&self, keep: impl Fn(Classification) -> bool) -> Vec<&TscDiagnostic> {
        self.entries
            .iter()
            .filter(|(c, _)| keep(*c))
            .map(|(_, d)| d)
            .collect()
    }
}
