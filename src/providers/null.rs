//! Deterministic mock provider for dry runs and tests.

use tracing::info;

use super::{CompletionFuture, CompletionRequest, Provider};

// Shaped to pass the output parser so a dry run exercises the whole
// pipeline end to end.
const MOCK_RESPONSE: &str = "---COMMIT_MSG---\nfeat: mock change\n---PATCH---\ndiff --git a/test.txt b/test.txt\nnew file mode 100644\nindex 0000000..1234567\n--- /dev/null\n+++ b/test.txt\n@@ -0,0 +1 @@\n+mock content\n";

/// Provider that answers every request with the same canned response.
#[derive(Debug, Default)]
pub struct NullProvider;

impl NullProvider {
    /// Creates a new null provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Provider for NullProvider {
    fn complete(&self, _request: &CompletionRequest) -> CompletionFuture<'_> {
        info!("null provider: returning mock response");
        Box::pin(async { Ok(MOCK_RESPONSE.to_string()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system_prompt: "system".to_string(),
            user_prompt: "user".to_string(),
            temperature: 0.0,
            max_tokens: 16,
        }
    }

    #[tokio::test]
    async fn mock_response_satisfies_the_output_contract() {
        let provider = NullProvider::new();
        let raw = provider.complete(&request()).await.unwrap();
        let result = output::parse(&raw).unwrap();
        assert_eq!(result.commit_message, "feat: mock change");
        assert!(result.patch.starts_with("diff --git a/test.txt b/test.txt"));
        assert!(result.patch.contains("+mock content"));
    }

    #[tokio::test]
    async fn responses_are_identical_across_calls() {
        let provider = NullProvider::new();
        let first = provider.complete(&request()).await.unwrap();
        let second = provider.complete(&request()).await.unwrap();
        assert_eq!(first, second);
    }
}
