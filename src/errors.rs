//! Error types for topology resolution

use thiserror::Error;

use crate::config::ValidationError;
use crate::graph::GraphError;
use crate::resolve::DerivationError;

/// Errors that can end a resolution pass
///
/// All of them are terminal for the pass: there is no partial resource
/// graph on failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolverError {
    /// One or more field-constraint violations, reported together
    #[error("Configuration validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Engine-version derivation failure (option-group emission)
    #[error("Derivation failed: {0}")]
    Derivation(#[from] DerivationError),

    /// Emitted graph failed its own integrity check
    #[error("Resource graph inconsistency: {0}")]
    Graph(#[from] GraphError),
}

/// Result type for resolution operations
pub type ResolverResult<T> = Result<T, ResolverError>;
