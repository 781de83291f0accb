//! Identifier generation for clinical sessions and suggested actions.
//!
//! Two identifier families are used by the service:
//!
//! - [`SessionId`]: `session-<unix-millis>-<9 base36 chars>`. Time-ordered and readable in logs.
//!   The random suffix keeps collisions unlikely but is **not** cryptographically unique; treat
//!   it as a correlation handle, not a secret.
//! - [`ActionId`]: a UUID v4 in canonical form (32 lowercase hex characters, no hyphens), used
//!   wherever uniqueness matters for state updates.
//!
//! Externally supplied identifiers (URL path segments, CLI arguments) must already be in the
//! canonical form for their family; nothing is normalised on parse.

mod action;
mod session;

pub use action::ActionId;
pub use session::SessionId;

/// Error type for identifier parsing.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
