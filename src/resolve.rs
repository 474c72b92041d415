//! Context and repository file resolution.
//!
//! Task files name the exact files the agent may see. Entries under
//! `context` resolve against the context root, entries under `repo`
//! against the repository root; repo-rooted files carry a `repo:` label
//! prefix so the two namespaces stay distinct in the prompt. An entry
//! with a trailing `/` names a directory and expands to every regular
//! file beneath it in lexicographic path order. Nothing outside the
//! listed entries is ever read, and every entry must yield at least one
//! file or the run fails before any provider call.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::substitute::substitute;
use crate::task::TaskSpec;

/// One resolved file: its prompt label and full UTF-8 content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Logical path shown in the prompt: the entry as written for file
    /// entries, a root-relative path for directory expansions, with a
    /// `repo:` prefix for repo-rooted entries.
    pub label: String,
    /// The file's full content.
    pub content: String,
}

/// The ordered set of files a task run may show the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedContext {
    /// Resolved files in resolution order: `context` entries first, then
    /// `repo` entries, each expanded in place.
    pub files: Vec<ResolvedFile>,
}

/// Resolves every `context` and `repo` entry of `spec`, in listed order,
/// after substituting `values` into each pattern.
///
/// # Errors
///
/// Returns [`Error::MissingContextFile`] for the first entry that does
/// not resolve: absent, the wrong kind of filesystem object, an empty
/// directory, unreadable, or not valid UTF-8.
pub fn resolve(
    spec: &TaskSpec,
    repo_root: &Path,
    context_root: &Path,
    values: &BTreeMap<String, String>,
) -> Result<ResolvedContext> {
    let mut files = Vec::new();
    for entry in &spec.context {
        resolve_entry(context_root, &substitute(entry, values), "", &mut files)?;
    }
    for entry in &spec.repo {
        resolve_entry(repo_root, &substitute(entry, values), "repo:", &mut files)?;
    }
    Ok(ResolvedContext { files })
}

fn resolve_entry(
    root: &Path,
    entry: &str,
    label_prefix: &str,
    files: &mut Vec<ResolvedFile>,
) -> Result<()> {
    // Leading '/' means "relative to the root".
    let relative = entry.trim_start_matches('/');
    if entry.ends_with('/') {
        let dir = root.join(relative.trim_end_matches('/'));
        let meta = fs::metadata(&dir)
            .map_err(|_| missing(label_prefix, entry, "directory not found"))?;
        if !meta.is_dir() {
            return Err(missing(label_prefix, entry, "not a directory"));
        }
        let mut found = Vec::new();
        collect_files(&dir, relative.trim_end_matches('/'), &mut found)
            .map_err(|e| missing(label_prefix, entry, &format!("unreadable directory: {e}")))?;
        if found.is_empty() {
            return Err(missing(label_prefix, entry, "directory contains no files"));
        }
        found.sort_by(|a, b| a.0.cmp(&b.0));
        for (relative_path, path) in found {
            let content = read_utf8(&path).map_err(|reason| {
                missing(label_prefix, entry, &format!("{relative_path}: {reason}"))
            })?;
            push_file(files, format!("{label_prefix}{relative_path}"), content);
        }
    } else {
        let path = root.join(relative);
        let meta =
            fs::metadata(&path).map_err(|_| missing(label_prefix, entry, "file not found"))?;
        if !meta.is_file() {
            return Err(missing(label_prefix, entry, "not a regular file"));
        }
        let content = read_utf8(&path).map_err(|reason| missing(label_prefix, entry, &reason))?;
        push_file(files, format!("{label_prefix}{entry}"), content);
    }
    Ok(())
}

fn push_file(files: &mut Vec<ResolvedFile>, label: String, content: String) {
    debug!(label = %label, bytes = content.len(), "resolved context file");
    files.push(ResolvedFile { label, content });
}

/// Walks `dir` depth-first, recording every regular file as a
/// root-relative path string. Symlinks are not followed.
fn collect_files(
    dir: &Path,
    prefix: &str,
    out: &mut Vec<(String, PathBuf)>,
) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let relative_path = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        if file_type.is_dir() {
            collect_files(&entry.path(), &relative_path, out)?;
        } else if file_type.is_file() {
            out.push((relative_path, entry.path()));
        }
    }
    Ok(())
}

fn read_utf8(path: &Path) -> std::result::Result<String, String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::InvalidData {
            "not valid UTF-8".to_string()
        } else {
            format!("unreadable: {e}")
        }
    })
}

fn missing(label_prefix: &str, entry: &str, reason: &str) -> Error {
    Error::MissingContextFile {
        entry: format!("{label_prefix}{entry}"),
        reason: reason.to_string(),
    }
}
