use async_trait::async_trait;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::user::errors::AccountError;
use crate::user::errors::RepositoryError;

/// Port for authentication service operations.
#[async_trait]
pub trait AuthenticationServicePort: Send + Sync + 'static {
    /// Register a new user and issue their first token.
    ///
    /// # Arguments
    /// * `command` - Validated command containing name, email, and password
    ///
    /// # Returns
    /// Signed access token with the email as subject
    ///
    /// # Errors
    /// * `EmailAlreadyRegistered` - Email is already registered (checked upfront and on insert)
    /// * `Password` - Hashing failed
    /// * `Token` - Token generation failed
    /// * `DatabaseError` - Store operation failed
    async fn register(&self, command: RegisterCommand) -> Result<String, AccountError>;

    /// Verify credentials and issue a token.
    ///
    /// # Arguments
    /// * `command` - Raw email and plaintext password
    ///
    /// # Returns
    /// Signed access token with the email as subject
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email, malformed email, or wrong password
    /// * `Password` - Stored hash is corrupt
    /// * `Token` - Token generation failed
    /// * `DatabaseError` - Store operation failed
    async fn login(&self, command: LoginCommand) -> Result<String, AccountError>;

    /// Check a bearer token against the identity a request claims.
    ///
    /// # Returns
    /// True if the token is correctly signed, its subject is `claimed_email`,
    /// and it has not expired
    fn validate_request(&self, token: &str, claimed_email: &str) -> bool;

    /// Resolve the user a bearer token belongs to.
    ///
    /// # Returns
    /// The stored user whose email is the token subject
    ///
    /// # Errors
    /// * `Unauthenticated` - Token is invalid, expired, or names an unknown user
    /// * `DatabaseError` - Store operation failed
    async fn resolve_user(&self, token: &str) -> Result<User, AccountError>;
}

/// Persistence operations for the user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Retrieve user by email address.
    ///
    /// # Arguments
    /// * `email` - Email address
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, RepositoryError>;

    /// Persist new user to storage if no user with the same email exists.
    ///
    /// Implementations must perform the uniqueness check and the insert atomically.
    ///
    /// # Arguments
    /// * `user` - User entity to create
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `UniquenessConflict` - Email is already stored
    /// * `Database` - Database operation failed
    async fn insert(&self, user: User) -> Result<User, RepositoryError>;
}
