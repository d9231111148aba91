//! Error types for the Hearsay core.
//!
//! Every failure is surfaced to whoever called into the dispatcher. The core
//! never swallows or reports errors on its own.

use thiserror::Error;

// =============================================================================
// Pattern Errors
// =============================================================================

/// Errors produced while compiling a `hears` pattern.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatternError {
    /// The pattern string was empty.
    #[error("pattern must not be empty")]
    Empty,

    /// The same placeholder name was declared twice.
    #[error("placeholder '{name}' is declared more than once")]
    DuplicatePlaceholder {
        /// The repeated name.
        name: String,
    },

    /// The generated expression was rejected by the regex engine.
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Errors returned by [`Dispatcher::hears`](crate::Dispatcher::hears).
#[derive(Debug, Error)]
pub enum HearsError {
    /// The pattern could not be compiled. Nothing was registered.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// The handler's capture parameters do not line up with the pattern.
    #[error("handler for '{pattern}' takes {found} capture(s) but the pattern declares {expected}")]
    ArityMismatch {
        /// The raw pattern.
        pattern: String,
        /// Number of placeholders in the pattern.
        expected: usize,
        /// Number of capture parameters the handler accepts.
        found: usize,
    },

    /// The matched handler returned an error.
    #[error(transparent)]
    Handler(anyhow::Error),
}

// =============================================================================
// Command Errors
// =============================================================================

/// Errors raised by a [`CommandClient`](crate::CommandClient).
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// The client has no outbound transport.
    #[error("command execution is not supported by this client")]
    NotSupported,

    /// Parameters could not be encoded.
    #[error("failed to encode parameters: {0}")]
    Encode(String),

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote answered with a non-success HTTP status.
    #[error("HTTP {status} error: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The remote reported a failed operation.
    #[error("'{operation}' failed: {error}")]
    Api {
        /// The operation name.
        operation: String,
        /// The error code returned by the platform.
        error: String,
    },

    /// The response body could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl CommandError {
    /// Creates a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for pattern compilation.
pub type PatternResult<T> = Result<T, PatternError>;

/// Result type for `hears` registrations.
pub type HearsResult<T> = Result<T, HearsError>;

/// Result type for command execution.
pub type CommandResult<T> = Result<T, CommandError>;
