//! Error taxonomy shared by every remote booking operation.
//!
//! All failures coming back from the remote API are classified into one of
//! the [`ApiError`] variants so reducers can branch on the *kind* of failure
//! without parsing server strings. The mapping from HTTP statuses and
//! envelope error strings to these variants lives in the transport crate;
//! the domain only ever sees the classified form.

use thiserror::Error;

/// Classified failure of a remote booking operation.
///
/// The variants carry the server-provided (or locally generated) message for
/// logging and display, but callers should branch on the variant, never on
/// the message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Network or connection failure; the request may never have reached
    /// the server.
    #[error("transport failure: {message}")]
    Transport {
        /// Underlying transport error description
        message: String,
    },

    /// The credential is missing, expired or rejected. Any operation
    /// failing this way forces session teardown and re-login.
    #[error("authentication failed: {message}")]
    Auth {
        /// Server-provided rejection reason
        message: String,
    },

    /// The request conflicts with remote or in-flight local state, e.g.
    /// no seats left at purchase time or an operation already queued for
    /// the same flight.
    #[error("conflict: {message}")]
    Conflict {
        /// Description of the conflicting condition
        message: String,
    },

    /// The referenced entity no longer exists on the server.
    #[error("not found: {message}")]
    NotFound {
        /// Description of the missing entity
        message: String,
    },

    /// The caller invoked an operation with unmet preconditions, e.g. a
    /// route search without an origin. Detected locally, no network call
    /// is made.
    #[error("invalid request: {message}")]
    Validation {
        /// Description of the violated precondition
        message: String,
    },
}

impl ApiError {
    /// Creates a [`ApiError::Transport`] error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates an [`ApiError::Auth`] error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Creates a [`ApiError::Conflict`] error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a [`ApiError::NotFound`] error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a [`ApiError::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether this failure must tear the session down.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Human-readable message suitable for direct display.
    ///
    /// Transport and auth details are replaced with generic guidance; the
    /// raw messages are for logs only. Conflict, not-found and validation
    /// messages are already phrased for humans and pass through.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { .. } => "connection problem, please try again".to_string(),
            Self::Auth { .. } => "session expired, please log in again".to_string(),
            Self::Conflict { message }
            | Self::NotFound { message }
            | Self::Validation { message } => message.clone(),
        }
    }
}
