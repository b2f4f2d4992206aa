//! Error types for the NoHandCoder domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Errors come in two
//! families:
//! - **Tool-local** ([`ToolError`]): recovered inside the loop as a failed
//!   `ToolResult` that the model gets to see.
//! - **Turn-level** ([`Error`]): the whole user turn failed and the caller
//!   has to decide what to do (usually: ask the user to retry).

use thiserror::Error;

/// The top-level error type. Every variant is a turn-level failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error("The model request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("The model kept requesting tools after {max_iterations} round-trips; the turn was abandoned")]
    ToolLoopExceeded { max_iterations: u32 },

    #[error("The turn was cancelled before it completed")]
    Cancelled,
}

impl Error {
    /// Whether re-sending the same user input could reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Provider(e) => e.is_transient(),
            Error::ToolLoopExceeded { .. } | Error::Cancelled => true,
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the remote model call itself.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Transient failures are worth retrying; auth/config problems are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::RateLimited { .. }
            | ProviderError::StreamInterrupted(_)
            | ProviderError::Network(_) => true,
            ProviderError::ApiError { status_code, .. } => *status_code >= 500,
            ProviderError::AuthenticationFailed(_) | ProviderError::NotConfigured(_) => false,
        }
    }
}

/// Failures of a single tool invocation. Never escapes a turn.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    NotFound(String),

    #[error("malformed tool arguments: {0}")]
    InvalidArguments(String),

    #[error("{tool_name} failed: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    /// Convenience constructor for I/O failures on a path.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        ToolError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn provider_error_text_does_not_promise_a_retry() {
        let err = Error::Provider(ProviderError::AuthenticationFailed("bad key".into()));
        assert!(!err.to_string().contains("retry"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn loop_exceeded_names_the_cap() {
        let err = Error::ToolLoopExceeded { max_iterations: 8 };
        assert!(err.to_string().contains("8 round-trips"));
        assert!(err.is_retryable());
    }

    #[test]
    fn auth_failures_are_not_retryable() {
        let err = Error::Provider(ProviderError::AuthenticationFailed("bad key".into()));
        assert!(!err.is_retryable());

        let err = Error::Provider(ProviderError::ApiError {
            status_code: 502,
            message: "bad gateway".into(),
        });
        assert!(err.is_retryable());
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = ToolError::NotFound("frobnicate".into());
        assert_eq!(err.to_string(), "unknown tool: frobnicate");

        let err = ToolError::io(
            "missing.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        );
        assert!(err.to_string().contains("missing.txt"));
        assert!(err.to_string().contains("No such file"));
    }
}
