use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::errors::KeyError;

/// Recommended minimum key length for HS256 (256 bits).
pub const RECOMMENDED_KEY_LENGTH: usize = 32;

/// Symmetric key used to sign and verify tokens with HMAC-SHA256.
///
/// Decoded once from the configured base64 secret and shared read-only afterwards.
/// The same key must be used for signing and verification within a deployment.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Decode a signing key from a base64-encoded secret.
    ///
    /// # Arguments
    /// * `secret` - Secret in standard (padded) base64
    ///
    /// # Returns
    /// SigningKey holding the raw key bytes
    ///
    /// # Errors
    /// * `InvalidKeyMaterial` - Secret is not valid base64 or decodes to zero bytes
    pub fn from_base64(secret: &str) -> Result<Self, KeyError> {
        let bytes = STANDARD
            .decode(secret)
            .map_err(|e| KeyError::InvalidKeyMaterial(format!("secret is not valid base64: {e}")))?;

        Self::from_bytes(bytes)
    }

    /// Build a signing key from raw bytes.
    ///
    /// # Errors
    /// * `InvalidKeyMaterial` - Key is empty
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, KeyError> {
        let bytes = bytes.into();

        if bytes.is_empty() {
            return Err(KeyError::InvalidKeyMaterial(
                "secret decodes to zero bytes".to_string(),
            ));
        }

        if bytes.len() < RECOMMENDED_KEY_LENGTH {
            tracing::warn!(
                key_length = bytes.len(),
                recommended = RECOMMENDED_KEY_LENGTH,
                "Signing key is shorter than recommended for HS256"
            );
        }

        Ok(Self(bytes))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes. Never zero.
    pub fn byte_len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}
