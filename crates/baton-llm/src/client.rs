//! The completion client trait.

use async_trait::async_trait;

use baton_core::errors::ProviderError;

use crate::types::{CompletionOptions, CompletionRequest, CompletionResponse};

/// Executes a single non-streaming completion.
///
/// Providers return `Ok` for everything they can classify — including
/// aborted calls and provider-reported failures, which come back as
/// responses with the matching stop reason. `Err` is reserved for
/// transport and parse failures the provider could not turn into a
/// response.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one completion against `model`.
    async fn complete(
        &self,
        model: &str,
        request: CompletionRequest,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ProviderError>;
}
