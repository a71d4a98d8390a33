use std::collections::HashMap;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde_json::Value;

use super::claims::Claims;
use super::errors::JwtError;
use crate::key::SigningKey;

/// JWT token handler for encoding and decoding tokens.
///
/// Produces compact `header.payload.signature` tokens signed with HS256.
/// Decoding verifies the signature and the payload shape but never checks
/// expiry; use [`Claims::is_expired`] for that.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
}

impl JwtHandler {
    /// Create a new JWT handler from a signing key.
    ///
    /// # Arguments
    /// * `key` - Signing key shared by issuance and verification
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm
    pub fn new(key: &SigningKey) -> Self {
        let algorithm = Algorithm::HS256;

        let mut validation = Validation::new(algorithm);
        // Expiry is an explicit, separate step
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            algorithm,
            validation,
        }
    }

    /// Assemble claims for `subject` and encode them into a token.
    ///
    /// # Arguments
    /// * `subject` - Non-empty token subject
    /// * `extra` - Additional claims (reserved names are dropped)
    /// * `ttl` - Lifetime, zero or positive
    /// * `now` - Issuance instant
    ///
    /// # Returns
    /// JWT token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Empty subject, negative TTL, or serialization failed
    pub fn issue(
        &self,
        subject: &str,
        extra: &HashMap<String, Value>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        if subject.is_empty() {
            return Err(JwtError::EncodingFailed("subject must not be empty".to_string()));
        }

        if ttl < Duration::zero() {
            return Err(JwtError::EncodingFailed(format!(
                "ttl must not be negative, got {}s",
                ttl.num_seconds()
            )));
        }

        let claims = Claims::new(subject, now, ttl).with_extras(extra);
        self.encode(&claims)
    }

    /// Encode claims into a JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode a JWT token and verify its signature.
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    ///
    /// # Returns
    /// Decoded claims (possibly expired)
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not match header and payload
    /// * `MalformedToken` - Wrong segment count, bad encoding, unexpected algorithm, or payload shape
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        match self.decode_segments(token) {
            Err(JwtError::MalformedToken(reason)) => {
                // A '.' inside the signature splits it into extra segments.
                // Intact header and payload mean the signature is what is wrong.
                let segments: Vec<&str> = token.splitn(4, '.').collect();
                match segments[..] {
                    [header, payload, signature, _] => {
                        let truncated = format!("{}.{}.{}", header, payload, signature);
                        match self.decode_segments(&truncated) {
                            Err(JwtError::MalformedToken(_)) => Err(JwtError::MalformedToken(reason)),
                            _ => Err(JwtError::InvalidSignature),
                        }
                    }
                    _ => Err(JwtError::MalformedToken(reason)),
                }
            }
            other => other,
        }
    }

    fn decode_segments(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::MalformedToken(e.to_string()),
            },
        )?;

        Ok(token_data.claims)
    }
}
