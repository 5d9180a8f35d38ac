//! Error hierarchy for the Baton handoff subsystem.
//!
//! Built on [`thiserror`]:
//!
//! - [`BatonError`]: top-level enum covering all error domains
//! - [`SessionError`]: session store failures (create, append, switch, read)
//! - [`ProviderError`]: LLM provider errors with status code and retry info
//!
//! The handoff layer converts everything at its boundary into its own
//! outcome taxonomy; these types exist for the collaborator seams (store,
//! model client) beneath it.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// BatonError — top-level error enum
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level error type.
#[derive(Debug, Error)]
pub enum BatonError {
    /// Session store error.
    #[error("{0}")]
    Session(#[from] SessionError),

    /// LLM provider error.
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// Generic internal error.
    #[error("[{code}] {message}")]
    Internal {
        /// Machine-readable error code.
        code: String,
        /// Human-readable message.
        message: String,
    },
}

impl BatonError {
    /// Create an internal error with a code and message.
    #[must_use]
    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Internal {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Session(e) => &e.code,
            Self::Provider(e) => &e.code,
            Self::Internal { code, .. } => code,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SessionError
// ─────────────────────────────────────────────────────────────────────────────

/// Session store operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOperation {
    /// Creating a new session file.
    Create,
    /// Appending an entry.
    Append,
    /// Switching the current session.
    Switch,
    /// Reading entries or the header.
    Read,
}

impl fmt::Display for SessionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Append => write!(f, "append"),
            Self::Switch => write!(f, "switch"),
            Self::Read => write!(f, "read"),
        }
    }
}

/// Session store error.
#[derive(Debug, Error)]
#[error("Session {operation} failed: {message}")]
pub struct SessionError {
    /// Operation that failed.
    pub operation: SessionOperation,
    /// Human-readable message.
    pub message: String,
    /// Machine-readable error code.
    pub code: String,
    /// Original cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SessionError {
    /// Create a new session error.
    #[must_use]
    pub fn new(operation: SessionOperation, message: impl Into<String>) -> Self {
        let op_upper = operation.to_string().to_uppercase();
        Self {
            operation,
            message: message.into(),
            code: format!("SESSION_{op_upper}_ERROR"),
            source: None,
        }
    }

    /// Set the error cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ProviderError
// ─────────────────────────────────────────────────────────────────────────────

/// LLM provider identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderName {
    /// Anthropic / Claude.
    Anthropic,
    /// `OpenAI`.
    Openai,
    /// Google / Gemini.
    Google,
    /// Unknown provider.
    Unknown,
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anthropic => write!(f, "anthropic"),
            Self::Openai => write!(f, "openai"),
            Self::Google => write!(f, "google"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Error category for classification and retry decisions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Missing or invalid credentials.
    Authentication,
    /// Rate limit exceeded.
    RateLimit,
    /// Malformed request.
    InvalidRequest,
    /// Provider-side failure.
    Server,
    /// Transport failure.
    Network,
    /// Unclassified.
    #[default]
    Unknown,
}

/// LLM provider error.
#[derive(Debug, Error)]
#[error("Provider {provider} error ({model}): {message}")]
pub struct ProviderError {
    /// Provider name.
    pub provider: ProviderName,
    /// Model being used.
    pub model: String,
    /// Human-readable message.
    pub message: String,
    /// Machine-readable error code.
    pub code: String,
    /// Error category.
    pub category: ErrorCategory,
    /// HTTP status code if applicable.
    pub status_code: Option<u16>,
    /// Whether this error is retryable.
    pub retryable: bool,
    /// Original cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Create a new provider error.
    #[must_use]
    pub fn new(
        provider: ProviderName,
        model: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let provider_upper = provider.to_string().to_uppercase();
        Self {
            provider,
            model: model.into(),
            message: message.into(),
            code: format!("PROVIDER_{provider_upper}_ERROR"),
            category: ErrorCategory::Unknown,
            status_code: None,
            retryable: false,
            source: None,
        }
    }

    /// Set the HTTP status code and infer category and retryability.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self.category = match status {
            401 | 403 => ErrorCategory::Authentication,
            429 => ErrorCategory::RateLimit,
            400 => ErrorCategory::InvalidRequest,
            s if s >= 500 => ErrorCategory::Server,
            _ => self.category,
        };
        self.retryable = matches!(
            self.category,
            ErrorCategory::RateLimit | ErrorCategory::Server
        );
        self
    }

    /// Mark this error as a network/transport failure.
    #[must_use]
    pub fn network(mut self) -> Self {
        self.category = ErrorCategory::Network;
        self.retryable = true;
        self
    }

    /// Set the error cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
