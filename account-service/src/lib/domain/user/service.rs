use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::PasswordError;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::AccountError;
use crate::user::errors::RepositoryError;
use crate::user::ports::AuthenticationServicePort;
use crate::user::ports::UserRepository;

/// Domain service implementation for registration, login and token checks.
///
/// Concrete implementation of AuthenticationServicePort with dependency injection.
/// Holds no mutable state; concurrent registrations of the same email are
/// resolved by the repository's atomic insert.
pub struct AuthenticationService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> AuthenticationService<UR>
where
    UR: UserRepository,
{
    /// Create a new authentication service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing and token handling
    ///
    /// # Returns
    /// Configured authentication service instance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    /// Run password hashing work on the blocking pool.
    async fn with_authenticator<T, F>(&self, work: F) -> Result<T, AccountError>
    where
        F: FnOnce(&Authenticator) -> T + Send + 'static,
        T: Send + 'static,
    {
        let authenticator = self.authenticator.clone();
        tokio::task::spawn_blocking(move || work(&authenticator))
            .await
            .map_err(|e| {
                AccountError::Password(PasswordError::HashingFailed(format!(
                    "Hashing task failed: {}",
                    e
                )))
            })
    }
}

#[async_trait]
impl<UR> AuthenticationServicePort for AuthenticationService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<String, AccountError> {
        if self.repository.find_by_email(&command.email).await?.is_some() {
            return Err(AccountError::EmailAlreadyRegistered(
                command.email.to_string(),
            ));
        }

        let password = command.password;
        let password_hash = self
            .with_authenticator(move |authenticator| authenticator.hash_password(&password))
            .await??;

        let user = User {
            id: UserId::new(),
            name: command.name,
            email: command.email,
            password_hash,
            created_at: self.authenticator.now(),
        };

        // A concurrent registration may have won since the lookup above
        let created_user = self.repository.insert(user).await.map_err(|e| match e {
            RepositoryError::UniquenessConflict(email) => {
                tracing::info!("Registration lost race on unique email");
                AccountError::EmailAlreadyRegistered(email)
            }
            other => AccountError::from(other),
        })?;

        tracing::info!(user_id = %created_user.id, "User registered");

        let token = self
            .authenticator
            .generate_token(created_user.email.as_str(), &HashMap::new())?;

        Ok(token)
    }

    async fn login(&self, command: LoginCommand) -> Result<String, AccountError> {
        let user = match EmailAddress::new(command.email) {
            Ok(email) => self.repository.find_by_email(&email).await?,
            Err(_) => None,
        };

        // Unknown accounts still pay for a hash check
        let password = command.password;
        let Some(user) = user else {
            self.with_authenticator(move |authenticator| authenticator.verify_dummy(&password))
                .await?;
            return Err(AccountError::InvalidCredentials);
        };

        let stored_hash = user.password_hash.clone();
        let subject = user.email.as_str().to_string();
        let result = self
            .with_authenticator(move |authenticator| {
                authenticator.authenticate(&password, &stored_hash, &subject)
            })
            .await?
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => AccountError::InvalidCredentials,
                AuthenticationError::PasswordError(err) => {
                    tracing::error!(user_id = %user.id, error = %err, "Stored password hash is unusable");
                    AccountError::Password(err)
                }
                AuthenticationError::JwtError(err) => AccountError::Token(err),
            })?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(result.access_token)
    }

    fn validate_request(&self, token: &str, claimed_email: &str) -> bool {
        self.authenticator.validate_request(token, claimed_email)
    }

    async fn resolve_user(&self, token: &str) -> Result<User, AccountError> {
        let subject = self
            .authenticator
            .token_subject(token)
            .ok_or(AccountError::Unauthenticated)?;

        let email = EmailAddress::new(subject).map_err(|_| AccountError::Unauthenticated)?;

        let user = self
            .repository
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::Unauthenticated)?;

        if !self.validate_request(token, user.email.as_str()) {
            return Err(AccountError::Unauthenticated);
        }

        Ok(user)
    }
}
