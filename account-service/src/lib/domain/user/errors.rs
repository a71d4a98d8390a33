use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

/// Error for DisplayName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisplayNameError {
    #[error("Name must not be empty")]
    Empty,

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error reported by a user store
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Email already stored: {0}")]
    UniquenessConflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Top-level error for account operations
///
/// Only `EmailAlreadyRegistered`, `InvalidCredentials` and `Unauthenticated`
/// (plus input validation) are meant for end users. The rest are internal.
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid name: {0}")]
    InvalidName(#[from] DisplayNameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    // Domain-level errors
    #[error("Email already registered: {0}")]
    EmailAlreadyRegistered(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    Unauthenticated,

    // Infrastructure errors
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for AccountError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UniquenessConflict(email) => AccountError::EmailAlreadyRegistered(email),
            RepositoryError::Database(msg) => AccountError::DatabaseError(msg),
        }
    }
}

impl AccountError {
    /// Whether the error is an internal fault rather than a caller mistake.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AccountError::Password(_) | AccountError::Token(_) | AccountError::DatabaseError(_)
        )
    }
}
