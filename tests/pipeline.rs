//! Library-level tests that drive the executor with scripted providers.

use std::collections::BTreeMap;
use std::fs;
use std::sync::Mutex;

use tempfile::TempDir;

use runbook::config::Config;
use runbook::error::Error;
use runbook::executor;
use runbook::providers::{CompletionFuture, CompletionRequest, NullProvider, Provider};

const CONTRACT_RESPONSE: &str = "---COMMIT_MSG---\n\
    feat: scripted change\n\
    ---PATCH---\n\
    diff --git a/out.txt b/out.txt\n\
    new file mode 100644\n\
    +out\n";

/// Records the request it was given and replies with a fixed
/// contract-shaped response.
struct RecordingProvider {
    seen: Mutex<Option<CompletionRequest>>,
}

impl RecordingProvider {
    fn new() -> Self {
        Self { seen: Mutex::new(None) }
    }

    fn request(&self) -> CompletionRequest {
        self.seen
            .lock()
            .unwrap()
            .clone()
            .expect("provider was never called")
    }
}

impl Provider for RecordingProvider {
    fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_> {
        *self.seen.lock().unwrap() = Some(request.clone());
        Box::pin(async { Ok(CONTRACT_RESPONSE.to_string()) })
    }
}

/// Fails the test if the executor ever reaches the provider stage.
struct PanickingProvider;

impl Provider for PanickingProvider {
    fn complete(&self, _request: &CompletionRequest) -> CompletionFuture<'_> {
        panic!("provider must not be called");
    }
}

/// Always reports a backend failure.
struct FailingProvider;

impl Provider for FailingProvider {
    fn complete(&self, _request: &CompletionRequest) -> CompletionFuture<'_> {
        Box::pin(async { Err("backend exploded".into()) })
    }
}

/// Wraps the contract response in conversational filler.
struct ChattyProvider;

impl Provider for ChattyProvider {
    fn complete(&self, _request: &CompletionRequest) -> CompletionFuture<'_> {
        Box::pin(async { Ok(format!("Sure, here is the change:\n{CONTRACT_RESPONSE}")) })
    }
}

fn config_for(repo: &TempDir, context: &TempDir) -> Config {
    Config {
        repo_root: repo.path().to_path_buf(),
        context_root: context.path().to_path_buf(),
        log_level: "info".to_string(),
        tracking_breadcrumb: String::new(),
        provider: "null".to_string(),
        model: "codellama".to_string(),
        base_url: None,
        api_key: String::new(),
        temperature: 0.7,
        max_tokens: 8192,
        timeout_secs: 300,
    }
}

fn write_task(root: &TempDir, name: &str, content: &str) {
    let tasks = root.path().join("tasks");
    fs::create_dir_all(&tasks).expect("create tasks dir");
    fs::write(tasks.join(format!("{name}.md")), content).expect("write task file");
}

#[tokio::test]
async fn environment_gate_runs_before_resolution_and_the_provider() {
    let repo = TempDir::new().unwrap();
    let context = TempDir::new().unwrap();
    // The context entry is unresolvable on purpose: reaching resolution
    // would produce MissingContextFile instead of the expected error.
    write_task(
        &context,
        "gated",
        "---\n\
         description: Gated task\n\
         context:\n\
         \x20 - /missing.md\n\
         environment:\n\
         \x20 - UNSET_VAR\n\
         ---\n\
         Body.\n",
    );
    let env = BTreeMap::new();
    let err = executor::run(&config_for(&repo, &context), &PanickingProvider, &env, "gated")
        .await
        .unwrap_err();
    match err {
        Error::MissingEnvironmentVariable(names) => {
            assert_eq!(names, vec!["UNSET_VAR".to_string()]);
        }
        other => panic!("expected a missing environment variable error, got {other}"),
    }
}

#[tokio::test]
async fn repo_tasks_shadow_context_tasks() {
    let repo = TempDir::new().unwrap();
    let context = TempDir::new().unwrap();
    write_task(&repo, "shared", "---\ndescription: repo copy\n---\nRepo body.\n");
    write_task(&context, "shared", "---\ndescription: context copy\n---\nContext body.\n");
    let provider = RecordingProvider::new();
    let env = BTreeMap::new();
    executor::run(&config_for(&repo, &context), &provider, &env, "shared")
        .await
        .unwrap();
    let request = provider.request();
    assert!(request.user_prompt.contains("Task: repo copy"));
    assert!(!request.user_prompt.contains("context copy"));
}

#[tokio::test]
async fn directory_entries_expand_in_lexicographic_order() {
    let repo = TempDir::new().unwrap();
    let context = TempDir::new().unwrap();
    let docs = context.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    // Write b.md first so creation order disagrees with path order.
    fs::write(docs.join("b.md"), "second\n").unwrap();
    fs::write(docs.join("a.md"), "first\n").unwrap();
    write_task(
        &context,
        "docs_digest",
        "---\ndescription: Digest the docs\ncontext:\n\x20 - /docs/\n---\nDigest.\n",
    );
    let provider = RecordingProvider::new();
    let env = BTreeMap::new();
    executor::run(&config_for(&repo, &context), &provider, &env, "docs_digest")
        .await
        .unwrap();
    let request = provider.request();
    let a = request.user_prompt.find("<<<FILE docs/a.md>>>").unwrap();
    let b = request.user_prompt.find("<<<FILE docs/b.md>>>").unwrap();
    assert!(a < b);
}

#[tokio::test]
async fn unresolvable_entries_fail_before_the_provider() {
    let repo = TempDir::new().unwrap();
    let context = TempDir::new().unwrap();
    write_task(
        &context,
        "needs_file",
        "---\ndescription: Needs a file\ncontext:\n\x20 - /nope.md\n---\nBody.\n",
    );
    let env = BTreeMap::new();
    let err = executor::run(
        &config_for(&repo, &context),
        &PanickingProvider,
        &env,
        "needs_file",
    )
    .await
    .unwrap_err();
    match err {
        Error::MissingContextFile { entry, .. } => assert_eq!(entry, "/nope.md"),
        other => panic!("expected a missing context file error, got {other}"),
    }
}

#[tokio::test]
async fn request_carries_sampling_parameters() {
    let repo = TempDir::new().unwrap();
    let context = TempDir::new().unwrap();
    write_task(&context, "plain", "---\ndescription: Plain\n---\nBody.\n");
    let mut config = config_for(&repo, &context);
    config.temperature = 0.2;
    config.max_tokens = 512;
    let provider = RecordingProvider::new();
    let env = BTreeMap::new();
    executor::run(&config, &provider, &env, "plain").await.unwrap();
    let request = provider.request();
    assert!((request.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(request.max_tokens, 512);
}

#[tokio::test]
async fn provider_failures_surface_as_provider_errors() {
    let repo = TempDir::new().unwrap();
    let context = TempDir::new().unwrap();
    write_task(&context, "plain", "---\ndescription: Plain\n---\nBody.\n");
    let env = BTreeMap::new();
    let err = executor::run(&config_for(&repo, &context), &FailingProvider, &env, "plain")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ProviderError(_)));
    assert!(err.to_string().contains("backend exploded"));
}

#[tokio::test]
async fn conversational_filler_is_rejected() {
    let repo = TempDir::new().unwrap();
    let context = TempDir::new().unwrap();
    write_task(&context, "plain", "---\ndescription: Plain\n---\nBody.\n");
    let env = BTreeMap::new();
    let err = executor::run(&config_for(&repo, &context), &ChattyProvider, &env, "plain")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::OutputFormatError(_)));
}

#[tokio::test]
async fn null_provider_runs_are_deterministic() {
    let repo = TempDir::new().unwrap();
    let context = TempDir::new().unwrap();
    fs::write(context.path().join("Standard.md"), "standards\n").unwrap();
    fs::write(context.path().join("Info.md"), "info\n").unwrap();
    write_task(
        &context,
        "simple_readme",
        "---\n\
         description: Write a simple README\n\
         context:\n\
         \x20 - /Standard.md\n\
         \x20 - /Info.md\n\
         environment: []\n\
         ---\n\
         Produce a README.\n",
    );
    let config = config_for(&repo, &context);
    let env = BTreeMap::new();
    let first = executor::run(&config, &NullProvider::new(), &env, "simple_readme")
        .await
        .unwrap();
    let second = executor::run(&config, &NullProvider::new(), &env, "simple_readme")
        .await
        .unwrap();
    assert_eq!(first, second);
    assert!(first.commit_message.contains("mock change"));
    assert!(first.patch.contains("diff --git"));
    assert!(first.patch.contains("test.txt"));
}
