//! Prompt assembly.
//!
//! Turns a task spec and its resolved files into the two-part prompt the
//! provider sees. The system prompt carries the fixed preamble, the
//! task's guarantees as an enumerated constraint list, and the output
//! contract the parser enforces. The user prompt carries the substituted
//! description and instructions followed by every resolved file as a
//! fenced block labeled with its logical path. Assembly is pure: the
//! same inputs always produce byte-identical prompts.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::resolve::ResolvedContext;
use crate::substitute::substitute;
use crate::task::TaskSpec;

const PREAMBLE: &str = "You are an automated software maintenance agent. You make precise, \
    minimal changes to a repository and you respond only in the exact output format requested.";

// Kept close to the contract OutputParser enforces so the model has a
// worked example of a passing response.
const OUTPUT_FORMAT: &str = "\
Output format:
1. Start with ---COMMIT_MSG---
2. Provide a commit message (conventional commits format)
3. Follow with ---PATCH---
4. Provide a git unified diff patch starting from the repository root
5. The patch must be valid and apply cleanly

Example:
---COMMIT_MSG---
feat(api): generate OpenAPI specification

- Adds openapi.yaml using org-standard conventions
- Includes pagination, error envelope, and auth scheme
---PATCH---
diff --git a/openapi.yaml b/openapi.yaml
new file mode 100644
index 0000000..abc1234
--- /dev/null
+++ b/openapi.yaml
@@ -0,0 +1,10 @@
+openapi: 3.1.0
+...";

/// The immutable system and user prompts for one provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBundle {
    /// Preamble, enumerated guarantees, and the output contract.
    pub system_prompt: String,
    /// Substituted description and instructions, then the fenced files.
    pub user_prompt: String,
}

/// Builds the prompt pair from the task, its resolved files, and the
/// declared variable values.
#[must_use]
pub fn assemble(
    spec: &TaskSpec,
    resolved: &ResolvedContext,
    values: &BTreeMap<String, String>,
) -> PromptBundle {
    PromptBundle {
        system_prompt: system_prompt(spec, values),
        user_prompt: user_prompt(spec, resolved, values),
    }
}

fn system_prompt(spec: &TaskSpec, values: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    out.push_str(PREAMBLE);
    out.push_str("\n\n");
    if !spec.guarantees.is_empty() {
        out.push_str("Requirements:\n");
        for (index, guarantee) in spec.guarantees.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", index + 1, substitute(guarantee, values));
        }
        out.push('\n');
    }
    out.push_str(OUTPUT_FORMAT);
    out
}

fn user_prompt(
    spec: &TaskSpec,
    resolved: &ResolvedContext,
    values: &BTreeMap<String, String>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Task: {}", substitute(&spec.description, values));
    if !spec.body.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "Instructions:\n{}", substitute(&spec.body, values));
    }
    for file in &resolved.files {
        out.push('\n');
        let _ = writeln!(out, "<<<FILE {}>>>", file.label);
        out.push_str(&file.content);
        if !file.content.ends_with('\n') {
            out.push('\n');
        }
        let _ = writeln!(out, "<<<END {}>>>", file.label);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ResolvedFile;

    fn base_spec() -> TaskSpec {
        TaskSpec {
            name: "demo".to_string(),
            description: "Generate docs for {SERVICE}".to_string(),
            context: Vec::new(),
            repo: Vec::new(),
            environment: vec!["SERVICE".to_string()],
            outputs: Vec::new(),
            guarantees: vec![
                "Follow {SERVICE} conventions".to_string(),
                "Keep the diff minimal".to_string(),
            ],
            body: "Write the README for {SERVICE}.".to_string(),
        }
    }

    fn service_values() -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        values.insert("SERVICE".to_string(), "billing".to_string());
        values
    }

    fn context() -> ResolvedContext {
        ResolvedContext {
            files: vec![
                ResolvedFile {
                    label: "/Standard.md".to_string(),
                    content: "standards\n".to_string(),
                },
                ResolvedFile {
                    label: "repo:/src/main.py".to_string(),
                    content: "print()".to_string(),
                },
            ],
        }
    }

    #[test]
    fn system_prompt_enumerates_substituted_guarantees() {
        let bundle = assemble(&base_spec(), &context(), &service_values());
        assert!(bundle.system_prompt.starts_with(PREAMBLE));
        assert!(bundle
            .system_prompt
            .contains("Requirements:\n1. Follow billing conventions\n2. Keep the diff minimal\n"));
    }

    #[test]
    fn system_prompt_states_the_output_contract() {
        let bundle = assemble(&base_spec(), &context(), &service_values());
        assert!(bundle.system_prompt.contains("---COMMIT_MSG---"));
        assert!(bundle.system_prompt.contains("---PATCH---"));
        assert!(bundle.system_prompt.contains("Output format:"));
    }

    #[test]
    fn system_prompt_skips_requirements_without_guarantees() {
        let mut spec = base_spec();
        spec.guarantees.clear();
        let bundle = assemble(&spec, &context(), &service_values());
        assert!(!bundle.system_prompt.contains("Requirements:"));
    }

    #[test]
    fn user_prompt_orders_description_body_then_files() {
        let bundle = assemble(&base_spec(), &context(), &service_values());
        let task = bundle
            .user_prompt
            .find("Task: Generate docs for billing")
            .unwrap();
        let instructions = bundle
            .user_prompt
            .find("Instructions:\nWrite the README for billing.")
            .unwrap();
        let first = bundle.user_prompt.find("<<<FILE /Standard.md>>>").unwrap();
        let second = bundle
            .user_prompt
            .find("<<<FILE repo:/src/main.py>>>")
            .unwrap();
        assert!(task < instructions && instructions < first && first < second);
    }

    #[test]
    fn user_prompt_fences_carry_matching_labels() {
        let bundle = assemble(&base_spec(), &context(), &service_values());
        assert!(bundle
            .user_prompt
            .contains("<<<FILE /Standard.md>>>\nstandards\n<<<END /Standard.md>>>\n"));
        // Content without a trailing newline still gets a fence on its own line.
        assert!(bundle
            .user_prompt
            .contains("<<<FILE repo:/src/main.py>>>\nprint()\n<<<END repo:/src/main.py>>>\n"));
    }

    #[test]
    fn user_prompt_skips_instructions_for_empty_body() {
        let mut spec = base_spec();
        spec.body = String::new();
        let bundle = assemble(&spec, &context(), &service_values());
        assert!(!bundle.user_prompt.contains("Instructions:"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let first = assemble(&base_spec(), &context(), &service_values());
        let second = assemble(&base_spec(), &context(), &service_values());
        assert_eq!(first, second);
    }
}
