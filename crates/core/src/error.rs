//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Bounded contexts define their own precise error enums (`StockError`,
/// `LoanError`, ...) and convert into this one when a caller only needs the
/// coarse category.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. blank).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict with existing state occurred (e.g. duplicate identity).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_build_matching_variants() {
        assert_eq!(
            DomainError::validation("bad"),
            DomainError::Validation("bad".to_string())
        );
        assert_eq!(
            DomainError::invariant("broken"),
            DomainError::InvariantViolation("broken".to_string())
        );
        assert_eq!(DomainError::not_found(), DomainError::NotFound);
    }

    #[test]
    fn display_includes_message() {
        let err = DomainError::conflict("item x already exists");
        assert_eq!(err.to_string(), "conflict: item x already exists");
    }
}
