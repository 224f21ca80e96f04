//! Failure classification.
//!
//! The invoker never inspects error types directly. Anything that can
//! report an optional status code implements [`Failure`], and the retry
//! loop dispatches on the [`FailureClassification`] tag.

/// Whether a failed attempt is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClassification {
    /// Temporary overload or unavailability (429, 503).
    Transient,
    /// Not expected to succeed if repeated unchanged.
    Terminal,
}

impl FailureClassification {
    pub fn is_transient(self) -> bool {
        self == FailureClassification::Transient
    }

    /// Short label used for log fields and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureClassification::Transient => "transient",
            FailureClassification::Terminal => "terminal",
        }
    }
}

/// A failure that may carry an HTTP-like status code.
pub trait Failure {
    /// Status observed for this failure, if any.
    fn status(&self) -> Option<u16>;

    fn classification(&self) -> FailureClassification {
        classify_status(self.status())
    }
}

/// Classify an observed status. A missing status is always terminal.
pub fn classify_status(status: Option<u16>) -> FailureClassification {
    match status {
        Some(429) | Some(503) => FailureClassification::Transient,
        _ => FailureClassification::Terminal,
    }
}
