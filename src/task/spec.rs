//! Core task definition type.

use serde::Deserialize;

/// A parsed task definition: frontmatter keys plus the free-text body.
///
/// `context` and `repo` entries are either exact file paths or directory
/// markers (trailing `/`) meaning "load recursively"; their order is
/// preserved all the way into the prompt. A leading `/` means "relative to
/// the root", so `/specs/api.md` resolves under the context root rather
/// than the filesystem root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskSpec {
    /// Task name as requested (the filename without `.md`).
    #[serde(skip)]
    pub name: String,
    /// What the task does. May contain `{VARNAME}` placeholders.
    /// `prompt` is accepted as a deprecated alias for this key.
    #[serde(alias = "prompt")]
    pub description: String,
    /// Paths to load from the context root, in order.
    #[serde(default)]
    pub context: Vec<String>,
    /// Paths to load from the repository root, in order.
    #[serde(default)]
    pub repo: Vec<String>,
    /// Environment variable names that must be set before the run proceeds.
    /// Declaring a name here is also what authorizes `{NAME}` substitution.
    #[serde(default)]
    pub environment: Vec<String>,
    /// Paths the task is expected to produce. Informational only; nothing
    /// enforces them.
    #[serde(default)]
    pub outputs: Vec<String>,
    /// Constraint strings passed verbatim into the system prompt.
    #[serde(default)]
    pub guarantees: Vec<String>,
    /// Free-text instructions following the frontmatter. May contain
    /// `{VARNAME}` placeholders.
    #[serde(skip)]
    pub body: String,
}
