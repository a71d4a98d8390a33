use thiserror::Error;

/// Error type for signing key loading.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),
}
