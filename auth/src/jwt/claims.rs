use std::collections::HashMap;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::errors::JwtError;

/// Claim names owned by the codec. Extra claims can never overwrite them.
pub const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

/// Claims set carried by every issued token.
///
/// `sub`, `iat` and `exp` are always present. Anything else the issuer added
/// lives in `extra` and is flattened into the top-level payload object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (the user's email)
    pub sub: String,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Claims {
    /// Create claims issued at `issued_at` that expire `ttl` later.
    ///
    /// # Arguments
    /// * `subject` - Token subject
    /// * `issued_at` - Issuance instant (truncated to whole seconds)
    /// * `ttl` - Lifetime written into `exp`
    ///
    /// # Returns
    /// Claims with sub, iat and exp set and no extra fields
    pub fn new(subject: impl ToString, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let iat = issued_at.timestamp();

        Self {
            sub: subject.to_string(),
            iat,
            exp: iat.saturating_add(ttl.num_seconds()),
            extra: HashMap::new(),
        }
    }

    /// Add a custom field. Reserved claim names are ignored.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        let key = key.to_string();

        if RESERVED_CLAIMS.contains(&key.as_str()) {
            tracing::warn!(claim = %key, "Ignoring extra claim with reserved name");
            return self;
        }

        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key, json_value);
        }
        self
    }

    /// Merge a map of custom fields. Reserved claim names are ignored.
    pub fn with_extras(self, extras: &HashMap<String, Value>) -> Self {
        extras
            .iter()
            .fold(self, |claims, (key, value)| claims.with_extra(key, value))
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Issuance instant, `None` if `iat` is outside the representable range.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// Expiry instant, `None` if `exp` is outside the representable range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Lifetime between issuance and expiry.
    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.exp.saturating_sub(self.iat))
    }

    /// Raw claim by name, including the reserved ones.
    ///
    /// # Errors
    /// * `ClaimNotFound` - No claim with this name
    pub fn claim(&self, name: &str) -> Result<Value, JwtError> {
        match name {
            "sub" => Ok(Value::from(self.sub.clone())),
            "iat" => Ok(Value::from(self.iat)),
            "exp" => Ok(Value::from(self.exp)),
            _ => self
                .extra
                .get(name)
                .cloned()
                .ok_or_else(|| JwtError::ClaimNotFound(name.to_string())),
        }
    }

    /// Extra claim deserialized into `T`.
    ///
    /// # Errors
    /// * `ClaimNotFound` - No claim with this name
    /// * `MalformedToken` - Claim value does not have the shape of `T`
    pub fn extra_claim<T: DeserializeOwned>(&self, name: &str) -> Result<T, JwtError> {
        let value = self.claim(name)?;

        serde_json::from_value(value)
            .map_err(|e| JwtError::MalformedToken(format!("claim '{}': {}", name, e)))
    }

    /// Check if token is expired.
    ///
    /// A token is expired from the second its `exp` is reached, so a zero TTL
    /// yields a token that is already expired at issuance.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
