// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Identifier Value Object with Naming Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Identifier is empty")]
    Empty,

    #[error("Identifier exceeds maximum length of 63 characters: {0}")]
    TooLong(usize),

    #[error("Identifier must start with a lowercase letter: {0}")]
    InvalidFirstCharacter(String),

    #[error("Identifier cannot end with a hyphen: {0}")]
    TrailingHyphen(String),

    #[error("Invalid character in identifier: {0}")]
    InvalidCharacter(char),
}

/// Deployment identifier value object
///
/// Uniquely names a database deployment and seeds the names of every
/// resource emitted for it (`{identifier}-{suffix}`).
///
/// Invariants:
/// - 1-63 characters
/// - Lowercase letters, digits, and hyphens only
/// - Starts with a letter
/// - Does not end with a hyphen
///
/// # Examples
///
/// ```rust
/// use rds_topology::domain::DbIdentifier;
///
/// let id = DbIdentifier::new("my-mysql-db").unwrap();
/// assert_eq!(id.as_str(), "my-mysql-db");
/// assert_eq!(id.child("subnets"), "my-mysql-db-subnets");
///
/// assert!(DbIdentifier::new("").is_err());
/// assert!(DbIdentifier::new("1db").is_err());
/// assert!(DbIdentifier::new("db-").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DbIdentifier(String);

impl DbIdentifier {
    /// Maximum identifier length
    pub const MAX_LENGTH: usize = 63;

    /// Create a new identifier with validation
    ///
    /// # Invariants
    /// - Non-empty, at most 63 characters
    /// - `[a-z][a-z0-9-]*[a-z0-9]` or a single letter
    pub fn new(identifier: impl Into<String>) -> Result<Self, IdentifierError> {
        let identifier = identifier.into();

        // Invariant 1: Non-empty
        if identifier.is_empty() {
            return Err(IdentifierError::Empty);
        }

        // Invariant 2: Maximum length
        if identifier.len() > Self::MAX_LENGTH {
            return Err(IdentifierError::TooLong(identifier.len()));
        }

        // Invariant 3: Must start with a lowercase letter
        if let Some(first) = identifier.chars().next() {
            if !first.is_ascii_lowercase() {
                return Err(IdentifierError::InvalidFirstCharacter(identifier));
            }
        }

        // Invariant 4: Lowercase alphanumeric and hyphens only
        for ch in identifier.chars() {
            if !ch.is_ascii_lowercase() && !ch.is_ascii_digit() && ch != '-' {
                return Err(IdentifierError::InvalidCharacter(ch));
            }
        }

        // Invariant 5: Cannot end with a hyphen
        if identifier.ends_with('-') {
            return Err(IdentifierError::TrailingHyphen(identifier));
        }

        Ok(Self(identifier))
    }

    /// Get the identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive a child resource name (`{identifier}-{suffix}`)
    pub fn child(&self, suffix: &str) -> String {
        format!("{}-{}", self.0, suffix)
    }
}

impl fmt::Display for DbIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DbIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(DbIdentifier::new("my-mysql-db").is_ok());
        assert!(DbIdentifier::new("a").is_ok());
        assert!(DbIdentifier::new("db1").is_ok());
        assert!(DbIdentifier::new("a2-3b").is_ok());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(DbIdentifier::new("").is_err());
        assert!(DbIdentifier::new("1abc").is_err()); // Starts with digit
        assert!(DbIdentifier::new("-abc").is_err()); // Starts with hyphen
        assert!(DbIdentifier::new("abc-").is_err()); // Ends with hyphen
        assert!(DbIdentifier::new("Abc").is_err()); // Uppercase
        assert!(DbIdentifier::new("ab_c").is_err()); // Underscore
        assert!(DbIdentifier::new("a".repeat(64)).is_err()); // Too long
    }

    #[test]
    fn test_max_length_boundary() {
        assert!(DbIdentifier::new("a".repeat(63)).is_ok());
    }

    #[test]
    fn test_child_naming() {
        let id = DbIdentifier::new("prod-db").unwrap();
        assert_eq!(id.child("sg"), "prod-db-sg");
        assert_eq!(id.child("final-snapshot"), "prod-db-final-snapshot");
    }
}
