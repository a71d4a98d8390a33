use std::collections::HashMap;
use std::sync::Arc;
use std::sync::OnceLock;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde_json::Value;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::key::SigningKey;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and JWT generation.
///
/// Owns everything that is fixed for the process lifetime: the password
/// hasher, the token codec built from the signing key, the token TTL and the
/// clock. All methods take `&self` and can be shared freely across tasks.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    /// Built on first use, checked against when an account has no stored hash
    dummy_hash: OnceLock<Option<String>>,
    jwt_handler: JwtHandler,
    token_ttl: Duration,
    clock: Arc<dyn Clock>,
}

/// Result of successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator using the system clock and default hashing cost.
    ///
    /// # Arguments
    /// * `signing_key` - Key for JWT signing and verification
    /// * `token_ttl` - Lifetime of every issued token
    ///
    /// # Returns
    /// Configured Authenticator instance
    pub fn new(signing_key: &SigningKey, token_ttl: Duration) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            dummy_hash: OnceLock::new(),
            jwt_handler: JwtHandler::new(signing_key),
            token_ttl,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the password hasher (e.g. to apply a configured cost factor).
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self.dummy_hash = OnceLock::new();
        self
    }

    /// Replace the clock used for issuance and expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current time according to the configured clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and generate JWT token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject` - Subject of the issued token
    ///
    /// # Returns
    /// AuthenticationResult with access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash could not be parsed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.generate_token(subject, &HashMap::new())?;

        Ok(AuthenticationResult { access_token })
    }

    /// Spend the same work as a real password check, then discard the outcome.
    ///
    /// Called when there is no account to check against, so that a login for
    /// an unknown email takes as long as one with a wrong password.
    pub fn verify_dummy(&self, password: &str) {
        let dummy_hash = self
            .dummy_hash
            .get_or_init(|| dummy_hash(&self.password_hasher));

        let outcome = match dummy_hash {
            Some(hash) => self.password_hasher.verify(password, hash).map(|_| ()),
            None => self.password_hasher.hash(password).map(|_| ()),
        };

        if let Err(e) = outcome {
            tracing::warn!(error = %e, "Dummy password verification failed");
        }
    }

    /// Generate JWT token without password verification.
    ///
    /// Used right after registration, when the password was just set.
    ///
    /// # Arguments
    /// * `subject` - Token subject
    /// * `extra` - Additional claims to embed
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn generate_token(
        &self,
        subject: &str,
        extra: &HashMap<String, Value>,
    ) -> Result<String, JwtError> {
        self.jwt_handler
            .issue(subject, extra, self.token_ttl, self.clock.now())
    }

    /// Decode JWT token and verify its signature. Expiry is not checked.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature mismatch
    /// * `MalformedToken` - Token structure or payload is invalid
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }

    /// Check whether `claims` are past their expiry at the current time.
    pub fn is_expired(&self, claims: &Claims) -> bool {
        claims.is_expired(self.clock.now())
    }

    /// Subject of a correctly signed token, `None` otherwise.
    ///
    /// Decode failures are logged and never returned.
    pub fn token_subject(&self, token: &str) -> Option<String> {
        match self.jwt_handler.decode(token) {
            Ok(claims) => Some(claims.sub),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                None
            }
        }
    }

    /// Check a presented token against the identity the request claims.
    ///
    /// True only if the token decodes, its subject equals `claimed_subject`
    /// and it has not expired. The reason for a rejection is only logged.
    pub fn validate_request(&self, token: &str, claimed_subject: &str) -> bool {
        let claims = match self.jwt_handler.decode(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                return false;
            }
        };

        if claims.sub != claimed_subject {
            tracing::debug!("Token subject does not match claimed identity");
            return false;
        }

        if self.is_expired(&claims) {
            tracing::debug!(exp = claims.exp, "Token is expired");
            return false;
        }

        true
    }
}

fn dummy_hash(password_hasher: &PasswordHasher) -> Option<String> {
    password_hasher
        .hash("dummy-password-for-unknown-accounts")
        .map_err(|e| tracing::warn!(error = %e, "Could not prepare dummy password hash"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::password::PasswordCost;

    fn setup(ttl: Duration) -> (Authenticator, Arc<ManualClock>) {
        let key = SigningKey::from_bytes(b"test_secret_key_at_least_32_bytes!".to_vec()).unwrap();
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        let hasher = PasswordHasher::with_cost(PasswordCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();

        let authenticator = Authenticator::new(&key, ttl)
            .with_password_hasher(hasher)
            .with_clock(clock.clone());

        (authenticator, clock)
    }

    #[test]
    fn test_authenticate_success() {
        let (authenticator, _) = setup(Duration::hours(1));

        // Hash a password
        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        // Authenticate with correct password
        let result = authenticator
            .authenticate(password, &hash, "ann@x.com")
            .expect("Authentication failed");

        assert!(!result.access_token.is_empty());

        // Validate the token
        let decoded = authenticator
            .validate_token(&result.access_token)
            .expect("Token validation failed");
        assert_eq!(decoded.sub, "ann@x.com");
        assert_eq!(decoded.iat, 1_700_000_000);
        assert_eq!(decoded.ttl(), Duration::hours(1));
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let (authenticator, _) = setup(Duration::hours(1));

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        // Try with wrong password
        let result = authenticator.authenticate("wrong_password", &hash, "ann@x.com");
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_corrupt_hash() {
        let (authenticator, _) = setup(Duration::hours(1));

        let result = authenticator.authenticate("my_password", "not-a-phc-string", "ann@x.com");
        assert!(matches!(
            result,
            Err(AuthenticationError::PasswordError(_))
        ));
    }

    #[test]
    fn test_generate_token_with_extra_claims() {
        let (authenticator, _) = setup(Duration::minutes(5));

        let mut extra = HashMap::new();
        extra.insert("name".to_string(), serde_json::json!("Ann"));

        let token = authenticator
            .generate_token("ann@x.com", &extra)
            .expect("Failed to generate token");
        let decoded = authenticator.validate_token(&token).unwrap();

        assert_eq!(decoded.extra_claim::<String>("name").unwrap(), "Ann");
    }

    #[test]
    fn test_validate_request() {
        let (authenticator, clock) = setup(Duration::minutes(5));
        let token = authenticator.generate_token("ann@x.com", &HashMap::new()).unwrap();

        assert!(authenticator.validate_request(&token, "ann@x.com"));
        assert!(!authenticator.validate_request(&token, "bob@x.com"));

        // Still valid one second before expiry
        clock.advance(Duration::minutes(5) - Duration::seconds(1));
        assert!(authenticator.validate_request(&token, "ann@x.com"));

        clock.advance(Duration::seconds(1));
        assert!(!authenticator.validate_request(&token, "ann@x.com"));
    }

    #[test]
    fn test_validate_request_bad_tokens() {
        let (authenticator, _) = setup(Duration::minutes(5));
        let token = authenticator.generate_token("ann@x.com", &HashMap::new()).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });

        assert!(!authenticator.validate_request(&tampered, "ann@x.com"));
        assert!(!authenticator.validate_request("invalid.token.here", "ann@x.com"));
        assert!(!authenticator.validate_request("", "ann@x.com"));
    }

    #[test]
    fn test_zero_ttl_token_is_expired() {
        let (authenticator, _) = setup(Duration::zero());
        let token = authenticator.generate_token("ann@x.com", &HashMap::new()).unwrap();

        let claims = authenticator.validate_token(&token).unwrap();
        assert!(authenticator.is_expired(&claims));
        assert!(!authenticator.validate_request(&token, "ann@x.com"));
    }

    #[test]
    fn test_verify_dummy_reuses_one_hash() {
        let (authenticator, _) = setup(Duration::minutes(5));
        assert!(authenticator.dummy_hash.get().is_none());

        authenticator.verify_dummy("pw123");
        let first = authenticator.dummy_hash.get().cloned().flatten();
        assert!(first.as_deref().is_some_and(|hash| hash.starts_with("$argon2id")));

        authenticator.verify_dummy("other");
        assert_eq!(authenticator.dummy_hash.get().cloned().flatten(), first);
    }

    #[test]
    fn test_replacing_hasher_resets_dummy_hash() {
        let (authenticator, _) = setup(Duration::minutes(5));
        authenticator.verify_dummy("pw123");

        let authenticator = authenticator.with_password_hasher(
            PasswordHasher::with_cost(PasswordCost {
                memory_kib: 2048,
                iterations: 1,
                parallelism: 1,
            })
            .unwrap(),
        );
        assert!(authenticator.dummy_hash.get().is_none());

        authenticator.verify_dummy("pw123");
        let hash = authenticator.dummy_hash.get().cloned().flatten().unwrap();
        assert!(hash.contains("m=2048"));
    }

    #[test]
    fn test_token_subject() {
        let (authenticator, _) = setup(Duration::minutes(5));
        let token = authenticator.generate_token("ann@x.com", &HashMap::new()).unwrap();

        assert_eq!(authenticator.token_subject(&token), Some("ann@x.com".to_string()));
        assert_eq!(authenticator.token_subject("garbage"), None);
    }
}
