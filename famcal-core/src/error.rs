//! Error types for the famcal ecosystem.

use std::fmt;

use thiserror::Error;

use crate::backend::EntityDeleteMethod;

/// Failure of a single backend attempt.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Service error: {0}")]
    Service(String),

    #[error("Entity does not implement {0}")]
    MethodMissing(&'static str),

    #[error("Invalid timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),
}

/// One failed backend attempt, kept only for diagnostic response payloads.
#[derive(Debug, Clone)]
pub struct Attempt {
    /// "{provider}.{operation}" or "entity.{method}".
    pub backend: String,
    pub message: String,
}

impl Attempt {
    pub fn service(provider: &str, operation: &str, error: &BackendError) -> Self {
        Attempt {
            backend: format!("{provider}.{operation}"),
            message: error.to_string(),
        }
    }

    pub fn entity(method: EntityDeleteMethod, error: &BackendError) -> Self {
        Attempt {
            backend: format!("entity.{}", method.name()),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.backend, self.message)
    }
}

/// Outcome of exhausting a fallback chain.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// At least one backend was tried and every attempt was rejected.
    #[error("all backends refused the operation")]
    Refused { attempts: Vec<Attempt> },

    /// No registered service and no entity method exposes the operation.
    #[error("no backend exposes this operation")]
    Unsupported,

    /// The request timestamps could not be parsed for the fallback payload.
    /// Terminal for the whole request.
    #[error(transparent)]
    BadTimestamp(BackendError),
}
