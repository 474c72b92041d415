//! The output contract: parsing provider responses into a result.
//!
//! A response is exactly two marked sections, a commit message under
//! `---COMMIT_MSG---` and a unified diff under `---PATCH---`, in that
//! order, with nothing but whitespace before the first marker. The
//! markers are a versioned public contract consumed by automation
//! downstream, so a malformed response is never repaired here; any
//! violation fails the run with the rule that was broken.

use crate::error::{Error, Result};

/// Marker line opening the commit message section.
pub const COMMIT_MARKER: &str = "---COMMIT_MSG---";
/// Marker line opening the patch section.
pub const PATCH_MARKER: &str = "---PATCH---";

const DIFF_HEADER: &str = "diff --git ";

/// The validation rule a malformed response broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputRule {
    /// No commit message marker anywhere in the response.
    MissingCommitMarker,
    /// No patch marker anywhere in the response.
    MissingPatchMarker,
    /// The commit message marker appeared more than once.
    DuplicateCommitMarker,
    /// The patch marker appeared more than once.
    DuplicatePatchMarker,
    /// The patch marker started before the end of the commit message marker.
    MarkerOrder,
    /// Non-whitespace text before the commit message marker.
    TextBeforeCommitMarker,
    /// Nothing but whitespace between the two markers.
    EmptyCommitMessage,
    /// Nothing but whitespace after the patch marker.
    EmptyPatch,
    /// The patch section does not start with a `diff --git` header.
    MissingDiffHeader,
}

impl std::fmt::Display for OutputRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCommitMarker => write!(f, "missing {COMMIT_MARKER} marker"),
            Self::MissingPatchMarker => write!(f, "missing {PATCH_MARKER} marker"),
            Self::DuplicateCommitMarker => write!(f, "more than one {COMMIT_MARKER} marker"),
            Self::DuplicatePatchMarker => write!(f, "more than one {PATCH_MARKER} marker"),
            Self::MarkerOrder => write!(f, "{PATCH_MARKER} does not follow {COMMIT_MARKER}"),
            Self::TextBeforeCommitMarker => write!(f, "text before {COMMIT_MARKER}"),
            Self::EmptyCommitMessage => write!(f, "empty commit message section"),
            Self::EmptyPatch => write!(f, "empty patch section"),
            Self::MissingDiffHeader => {
                write!(f, "patch section does not start with '{}'", DIFF_HEADER.trim_end())
            }
        }
    }
}

/// A validated commit message and patch, the sole output of a
/// successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Commit message section, trimmed.
    pub commit_message: String,
    /// Unified diff section, trimmed.
    pub patch: String,
}

/// Validates `raw` against the output contract and extracts both
/// sections, trimmed.
///
/// # Errors
///
/// Returns [`Error::OutputFormatError`] naming the first rule the
/// response violates.
pub fn parse(raw: &str) -> Result<ExecutionResult> {
    let commit_positions: Vec<usize> = raw.match_indices(COMMIT_MARKER).map(|(i, _)| i).collect();
    let patch_positions: Vec<usize> = raw.match_indices(PATCH_MARKER).map(|(i, _)| i).collect();

    let commit_at = match commit_positions.as_slice() {
        [] => return Err(Error::OutputFormatError(OutputRule::MissingCommitMarker)),
        [at] => *at,
        _ => return Err(Error::OutputFormatError(OutputRule::DuplicateCommitMarker)),
    };
    let patch_at = match patch_positions.as_slice() {
        [] => return Err(Error::OutputFormatError(OutputRule::MissingPatchMarker)),
        [at] => *at,
        _ => return Err(Error::OutputFormatError(OutputRule::DuplicatePatchMarker)),
    };
    // The patch marker can reuse the commit marker's trailing dashes
    // (`---COMMIT_MSG---PATCH---`), so it must start after the whole
    // commit marker, not just after commit_at.
    if patch_at < commit_at + COMMIT_MARKER.len() {
        return Err(Error::OutputFormatError(OutputRule::MarkerOrder));
    }
    if !raw[..commit_at].trim().is_empty() {
        return Err(Error::OutputFormatError(OutputRule::TextBeforeCommitMarker));
    }

    let commit_message = raw[commit_at + COMMIT_MARKER.len()..patch_at].trim();
    if commit_message.is_empty() {
        return Err(Error::OutputFormatError(OutputRule::EmptyCommitMessage));
    }

    let patch = raw[patch_at + PATCH_MARKER.len()..].trim();
    if patch.is_empty() {
        return Err(Error::OutputFormatError(OutputRule::EmptyPatch));
    }
    if !patch.starts_with(DIFF_HEADER) {
        return Err(Error::OutputFormatError(OutputRule::MissingDiffHeader));
    }

    Ok(ExecutionResult {
        commit_message: commit_message.to_string(),
        patch: patch.to_string(),
    })
}
