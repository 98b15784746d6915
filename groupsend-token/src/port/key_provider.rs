use crate::domain::timestamp::Timestamp;
use crate::port::token_authenticator::TokenAuthenticator;

/// Supplies the key material for a given expiration.
///
/// Fetching, caching and rotation are up to the implementation.
pub trait DerivedKeyProvider {
    type Key: TokenAuthenticator;
    type Error: std::error::Error;

    fn derived_key_for(&self, expiration: Timestamp) -> Result<Self::Key, Self::Error>;
}
