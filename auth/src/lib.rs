//! Authentication utilities library
//!
//! Provides the stateless token and credential primitives used by the account service:
//! - Signing key loading from a base64 secret
//! - Password hashing (Argon2id)
//! - JWT token generation and validation (HS256)
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## JWT Tokens
//! ```
//! use std::collections::HashMap;
//!
//! use auth::{JwtHandler, SigningKey};
//! use chrono::{Duration, Utc};
//!
//! let key = SigningKey::from_base64("c2VjcmV0X2tleV9hdF9sZWFzdF8zMl9ieXRlc19sb25nIQ==").unwrap();
//! let handler = JwtHandler::new(&key);
//! let token = handler
//!     .issue("ann@x.com", &HashMap::new(), Duration::hours(1), Utc::now())
//!     .unwrap();
//! let claims = handler.decode(&token).unwrap();
//! assert_eq!(claims.subject(), "ann@x.com");
//! assert!(!claims.is_expired(Utc::now()));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, SigningKey};
//! use chrono::Duration;
//!
//! let key = SigningKey::from_base64("c2VjcmV0X2tleV9hdF9sZWFzdF8zMl9ieXRlc19sb25nIQ==").unwrap();
//! let auth = Authenticator::new(&key, Duration::hours(24));
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and generate token
//! let result = auth.authenticate("password123", &hash, "ann@x.com").unwrap();
//!
//! // Validate a request claiming to be ann@x.com
//! assert!(auth.validate_request(&result.access_token, "ann@x.com"));
//! ```

pub mod authenticator;
pub mod clock;
pub mod jwt;
pub mod key;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use key::KeyError;
pub use key::SigningKey;
pub use password::PasswordCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
