//! CompletionProvider trait definition.

use pondbridge_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for completion provider backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). The
/// implementation lives in pondbridge-infra (`OpenAiCompatibleProvider`);
/// tests substitute in-memory stubs.
///
/// Providers must be treated as fallible and latent: callers own the
/// timeout and the fallback policy.
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
