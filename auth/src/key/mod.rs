pub mod errors;
pub mod signing_key;

pub use errors::KeyError;
pub use signing_key::SigningKey;
