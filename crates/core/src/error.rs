//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// stock rules, authorization). Infrastructure concerns surface only through
/// [`DomainError::Internal`], which aborts the whole operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more fields of a command failed validation. Collected, never
    /// short-circuited, so the caller can render a single combined message.
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// The command payload could not be parsed at all.
    #[error("malformed command: {0}")]
    MalformedCommand(String),

    /// A decrement would take a stock entry below zero.
    #[error("insufficient stock of {code}: requested {requested}, available {available}")]
    InsufficientStock {
        code: String,
        requested: u32,
        available: u32,
    },

    /// A sale was attempted with no units on hand.
    #[error("no {0} in stock")]
    OutOfStock(String),

    /// A sale with this serial number is already registered.
    #[error("{0} is already registered")]
    DuplicateSerial(String),

    /// A requested record (serial, alias, transfer) does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The record exists, but the actor is not allowed to touch it.
    #[error("not authorized")]
    NotAuthorized,

    /// A transfer was not in the state the transition requires.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Persistence/transaction failure. The only fatal class; the whole
    /// multi-step operation must have been rolled back before this is seen.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(problems: Vec<String>) -> Self {
        Self::Validation(problems)
    }

    pub fn validation_one(problem: impl Into<String>) -> Self {
        Self::Validation(vec![problem.into()])
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedCommand(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the failure is user-correctable (resend a fixed command)
    /// rather than a business-rule rejection or an internal fault.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::MalformedCommand(_))
    }
}
