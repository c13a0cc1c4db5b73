//! Unified error type for the club backend.
//!
//! Every failure that reaches a caller carries a stable machine-readable kind
//! (see [`Error::kind`]) so the HTTP layer and tests can match on it without
//! parsing messages.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The actor is known but may not perform the action.
    #[error("Forbidden: {reason}")]
    Forbidden {
        /// Why the request was denied
        reason: String,
    },

    /// No usable identity was presented, or the credentials were wrong.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Description of the authentication failure
        message: String,
    },

    /// A status change that the lifecycle rules do not allow.
    #[error("Invalid {entity} transition from '{from}' to '{to}'")]
    InvalidTransition {
        /// Which kind of record (club, membership, event, payment)
        entity: &'static str,
        /// Current status string
        from: String,
        /// Requested status string
        to: String,
    },

    /// The addressed record does not exist (or was cascade-deleted).
    #[error("{resource} {id} not found")]
    NotFound {
        /// Resource name, e.g. "club"
        resource: &'static str,
        /// Identifier that was looked up
        id: i64,
    },

    /// A uniqueness or "last manager" style conflict.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflict
        message: String,
    },

    /// Malformed or missing input.
    #[error("Validation error: {message}")]
    Validation {
        /// Which rule was violated
        message: String,
    },

    /// Configuration file or environment problem.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Any other storage failure.
    #[error("Database error: {0}")]
    Database(DbErr),

    /// Token encoding or hashing failure.
    #[error("Credential error: {message}")]
    Credential {
        /// Underlying library message
        message: String,
    },

    /// I/O failure (socket bind, config file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or unreadable environment variable.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Stable machine-readable kind surfaced to API callers.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Forbidden { .. } => "forbidden",
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Validation { .. } => "validation_error",
            Self::Config { .. }
            | Self::Database(_)
            | Self::Credential { .. }
            | Self::Io(_)
            | Self::EnvVar(_) => "internal",
        }
    }

    /// Shorthand for a [`Error::Forbidden`] with the given reason.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Conflict`] with the given message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => Self::Conflict { message },
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => Self::Validation { message },
            _ => Self::Database(err),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
