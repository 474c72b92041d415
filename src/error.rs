//! Pipeline error taxonomy.
//!
//! Every failure class aborts the run immediately. Nothing here is retried
//! or downgraded to a warning; the process shell turns each variant into a
//! non-zero exit with the message on stderr.

use crate::output::OutputRule;

/// A fatal failure in the task execution pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No task definition file exists under either root.
    #[error("task not found: no tasks/{0}.md under the repository or context root")]
    TaskNotFound(String),

    /// The task definition file exists but could not be parsed.
    #[error("task {name}: {reason}")]
    TaskParseError {
        /// The task name as requested.
        name: String,
        /// What was wrong with the file.
        reason: String,
    },

    /// One or more variables declared in the task's `environment` list are
    /// unset. All missing names are reported together.
    #[error("required environment variables not set: {}", .0.join(", "))]
    MissingEnvironmentVariable(Vec<String>),

    /// A `context`/`repo` entry did not resolve to at least one readable file.
    #[error("context entry {entry}: {reason}")]
    MissingContextFile {
        /// The entry as listed in the task definition (after substitution).
        entry: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The completion backend failed: unreachable endpoint, non-success
    /// status, timeout, or an undecodable response body.
    #[error("provider error: {0}")]
    ProviderError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The provider response violated the output contract.
    #[error("malformed provider response: {0}")]
    OutputFormatError(OutputRule),
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
