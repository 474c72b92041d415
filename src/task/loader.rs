//! Task definition lookup and frontmatter parsing.
//!
//! A task lives at `tasks/<name>.md` under the repository root or, failing
//! that, under the context root. The repository copy wins so a repo can
//! override or supply its own definitions without a separate context mount.

use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::task::TaskSpec;

/// Loads the named task definition, checking the repository root before the
/// context root.
///
/// # Errors
///
/// Returns [`Error::TaskNotFound`] when neither root has `tasks/<name>.md`,
/// and [`Error::TaskParseError`] when the file cannot be read or its
/// frontmatter is malformed.
pub fn load(task_name: &str, repo_root: &Path, context_root: &Path) -> Result<TaskSpec> {
    let file_name = format!("{task_name}.md");
    let candidates = [
        repo_root.join("tasks").join(&file_name),
        context_root.join("tasks").join(&file_name),
    ];

    let Some(path) = candidates.iter().find(|p| p.is_file()) else {
        return Err(Error::TaskNotFound(task_name.to_string()));
    };
    debug!(path = %path.display(), "loading task definition");

    let content = std::fs::read_to_string(path).map_err(|e| Error::TaskParseError {
        name: task_name.to_string(),
        reason: format!("failed to read {}: {e}", path.display()),
    })?;

    parse(task_name, &content)
}

/// Parses a task definition: YAML frontmatter between `---` delimiter lines,
/// then a free-text body.
fn parse(task_name: &str, content: &str) -> Result<TaskSpec> {
    let (frontmatter, body) =
        split_frontmatter(content).ok_or_else(|| Error::TaskParseError {
            name: task_name.to_string(),
            reason: "task file must start with a `---`-delimited frontmatter block".to_string(),
        })?;

    let mut spec: TaskSpec =
        serde_yaml::from_str(frontmatter).map_err(|e| Error::TaskParseError {
            name: task_name.to_string(),
            reason: format!("invalid frontmatter: {e}"),
        })?;

    spec.name = task_name.to_string();
    spec.body = body.trim().to_string();
    Ok(spec)
}

/// Splits `---\n<frontmatter>\n---\n<body>` into its two halves, or `None`
/// when either delimiter line is missing.
fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---")?.strip_prefix('\n')?;
    let end = rest.find("\n---")?;
    let frontmatter = &rest[..end];
    let after = &rest[end + "\n---".len()..];
    let body = after.strip_prefix('\n').unwrap_or(after);
    Some((frontmatter, body))
}
