//! Placeholder substitution against declared environment variables.
//!
//! Task files reference environment variables as `{NAME}` inside
//! descriptions, instructions, guarantees, and file patterns. Only
//! variables declared in the task's `environment` list participate;
//! anything else is left verbatim. Substitution is a single pass over
//! the input, so a value that itself contains `{OTHER}` is never
//! re-expanded.

use std::collections::BTreeMap;

/// Captures the process environment as an ordered map.
///
/// The executor takes one snapshot per run so that every later lookup
/// sees the same values, even if the environment changes underneath it.
#[must_use]
pub fn environment_snapshot() -> BTreeMap<String, String> {
    std::env::vars().collect()
}

/// Returns the declared variable names that are absent from `env`,
/// preserving declaration order.
#[must_use]
pub fn missing_variables(names: &[String], env: &BTreeMap<String, String>) -> Vec<String> {
    names
        .iter()
        .filter(|name| !env.contains_key(name.as_str()))
        .cloned()
        .collect()
}

/// Restricts `env` to the declared variable names.
#[must_use]
pub fn declared_values(
    names: &[String],
    env: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    names
        .iter()
        .filter_map(|name| env.get(name).map(|value| (name.clone(), value.clone())))
        .collect()
}

/// Replaces each `{NAME}` whose name appears in `values` with its value.
///
/// Unknown placeholders, unmatched braces, and empty braces pass through
/// unchanged.
#[must_use]
pub fn substitute(text: &str, values: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(['{', '}']) {
            // A '}' before any further '{' closes a candidate placeholder.
            Some(close) if after.as_bytes()[close] == b'}' => {
                if let Some(value) = values.get(&after[..close]) {
                    out.push_str(value);
                    rest = &after[close + 1..];
                } else {
                    out.push('{');
                    rest = after;
                }
            }
            // Another '{' first, or no brace at all: the opener was literal.
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
