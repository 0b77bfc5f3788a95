//! Per-item failure values.
//!
//! Batch operations (building a definition list, fanning out run lookups)
//! never fail because of one item.  Each item's outcome is a
//! `Result<T, Problem>`; failures are logged, collected, and replaced by a
//! placeholder so the batch always completes.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// What went wrong with a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    /// The document lacks the `on`/`jobs` shape of a workflow.
    InvalidStructure,
    /// The document could not be interpreted.
    Parse,
    /// The file could not be read from its source.
    Read,
    /// A remote call exceeded its time limit.
    Timeout,
    /// A run lookup failed.
    Lookup,
}

impl std::fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStructure => write!(f, "invalid structure"),
            Self::Parse => write!(f, "parse"),
            Self::Read => write!(f, "read"),
            Self::Timeout => write!(f, "timeout"),
            Self::Lookup => write!(f, "lookup"),
        }
    }
}

/// A contained failure of one item in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// The item the failure belongs to (file name or workflow name).
    pub subject: String,
    pub kind: ProblemKind,
    pub reason: String,
}

impl Problem {
    pub fn new(subject: impl Into<String>, kind: ProblemKind, reason: impl ToString) -> Self {
        Self {
            subject: subject.into(),
            kind,
            reason: reason.to_string(),
        }
    }

    /// Emit the problem at warn level.
    pub fn log(&self) {
        warn!(
            subject = %self.subject,
            kind = %self.kind,
            error = %self.reason,
            "item failed, degrading to placeholder"
        );
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error in `{}`: {}", self.kind, self.subject, self.reason)
    }
}

impl std::error::Error for Problem {}

/// Settle one item: log and collect a failure, hand back the value either
/// way.  `fallback` builds the placeholder from the problem.
pub fn settle<T>(
    outcome: Result<T, Problem>,
    problems: &mut Vec<Problem>,
    fallback: impl FnOnce(&Problem) -> T,
) -> T {
    match outcome {
        Ok(value) => value,
        Err(problem) => {
            problem.log();
            let value = fallback(&problem);
            problems.push(problem);
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_passes_success_through() {
        let mut problems = Vec::new();
        let value = settle(Ok::<_, Problem>(7), &mut problems, |_| 0);
        assert_eq!(value, 7);
        assert!(problems.is_empty());
    }

    #[test]
    fn settle_collects_failure() {
        let mut problems = Vec::new();
        let outcome = Err(Problem::new("b.yml", ProblemKind::Read, "boom"));
        let value = settle(outcome, &mut problems, |p| p.reason.len());
        assert_eq!(value, 4);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].kind, ProblemKind::Read);
    }

    #[test]
    fn display_names_subject() {
        let p = Problem::new("ci.yml", ProblemKind::Timeout, "took too long");
        assert_eq!(p.to_string(), "timeout error in `ci.yml`: took too long");
    }
}
