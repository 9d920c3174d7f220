//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`VentHubError`]
//! via `From` when crossing a port boundary.

/// Top-level error shared by ports and use-cases.
#[derive(Debug, thiserror::Error)]
pub enum VentHubError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced resource does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A persistence backend failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An external collaborator (broker, HTTP endpoint, device) could not be reached.
    #[error("collaborator unreachable")]
    Unreachable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// An identifier was empty or whitespace.
    #[error("identifier must not be empty")]
    EmptyId,

    /// A numeric setting was negative, NaN or infinite.
    #[error("{field} must be a finite, non-negative number")]
    InvalidNumber {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A duration setting was zero.
    #[error("{field} must be greater than zero")]
    ZeroDuration {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A duration setting exceeded [`crate::time::MAX_SETTING_DURATION`].
    #[error("{field} must not exceed one year")]
    DurationTooLong {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of the missing resource (e.g. `"Sensor"`).
    pub entity: &'static str,
    /// Identifier that was looked up.
    pub id: String,
}
