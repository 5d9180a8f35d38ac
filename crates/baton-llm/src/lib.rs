//! # baton-llm
//!
//! One-shot LLM completion for the Baton handoff subsystem.
//!
//! - [`client`] — the [`CompletionClient`](client::CompletionClient) trait:
//!   one non-streaming completion per call, cancellation via token
//! - [`types`] — request/response/stop-reason types
//! - [`registry`] — model → provider inference and API key resolution
//! - [`anthropic`] — Anthropic Messages API implementation
//!
//! Callers branch on [`CompletionStopReason`](types::CompletionStopReason)
//! rather than on errors: aborted and provider-reported failures come back as
//! responses, transport/parse failures as `Err`.

#![deny(unsafe_code)]

pub mod anthropic;
pub mod client;
pub mod registry;
pub mod types;

pub use client::CompletionClient;
pub use registry::ModelRegistry;
pub use types::{CompletionOptions, CompletionRequest, CompletionResponse, CompletionStopReason};
