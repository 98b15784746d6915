//! Issuing side of the full-token protocol.
//!
//! Only the trusted issuing path calls into this module; verification never does.

use thiserror::Error;
use tracing::debug;

use crate::domain::full_token::{FormatError, FullToken};
use crate::domain::identity_encoding::{identity_binding, CanonicalIdentity, EncodingError};
use crate::domain::timestamp::Timestamp;
use crate::infrastructure::key_material::{DerivedKey, KeyMaterialError};
use crate::port::key_provider::DerivedKeyProvider;
use crate::port::token_authenticator::TokenAuthenticator;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssuanceError {
    #[error("cannot encode identity set: {0}")]
    Encoding(#[from] EncodingError),
    #[error("cannot build token: {0}")]
    Format(#[from] FormatError),
    #[error("key material unavailable: {0}")]
    KeyMaterial(#[from] KeyMaterialError),
}

/// Builds a full token for the ordered `identities`, expiring when `key` does.
pub fn issue_full_token<T: CanonicalIdentity>(
    identities: &[T],
    key: &DerivedKey,
) -> Result<FullToken, IssuanceError> {
    let expiration = key.expiration();
    let binding = identity_binding(identities)?;
    let tag = key.compute_tag(&binding, expiration);
    let token = FullToken::from_parts(tag, expiration)?;
    debug!(%expiration, recipients = identities.len(), "issued full token");
    Ok(token)
}

/// Issues tokens with keys looked up from a [`DerivedKeyProvider`].
pub struct TokenIssuer<P> {
    pub key_provider: P,
}

impl<P> TokenIssuer<P>
where
    P: DerivedKeyProvider<Key = DerivedKey>,
    IssuanceError: From<P::Error>,
{
    pub fn new(key_provider: P) -> Self {
        Self { key_provider }
    }

    pub fn issue<T: CanonicalIdentity>(
        &self,
        identities: &[T],
        expiration: Timestamp,
    ) -> Result<FullToken, IssuanceError> {
        let key = self.key_provider.derived_key_for(expiration)?;
        issue_full_token(identities, &key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::full_token::FULL_TOKEN_LEN;
    use crate::domain::service_id::ServiceId;
    use crate::infrastructure::key_material::ServerRootKey;
    use uuid::Uuid;

    fn root() -> ServerRootKey {
        ServerRootKey::from_bytes(&[1u8; 32]).unwrap()
    }

    #[test]
    fn issued_token_carries_key_expiration() {
        let expiration = Timestamp::from_epoch_seconds(1_700_000_000);
        let key = root().derive_key(expiration).unwrap();
        let ids = [ServiceId::Aci(Uuid::from_bytes([3; 16]))];

        let token = issue_full_token(&ids, &key).unwrap();
        assert_eq!(token.expiration(), expiration);
        assert_eq!(token.serialize().len(), FULL_TOKEN_LEN);
        assert_eq!(token.as_bytes()[0], 0);
    }

    #[test]
    fn issuer_matches_free_function() {
        let expiration = Timestamp::from_epoch_seconds(1_700_086_400);
        let ids = [ServiceId::Pni(Uuid::from_bytes([4; 16]))];

        let issuer = TokenIssuer::new(root());
        let via_issuer = issuer.issue(&ids, expiration).unwrap();
        let direct = issue_full_token(&ids, &root().derive_key(expiration).unwrap()).unwrap();
        assert_eq!(via_issuer, direct);
    }

    #[test]
    fn empty_identity_set_is_rejected() {
        let key = root()
            .derive_key(Timestamp::from_epoch_seconds(1))
            .unwrap();
        let ids: [ServiceId; 0] = [];
        assert_eq!(
            issue_full_token(&ids, &key),
            Err(IssuanceError::Encoding(EncodingError::EmptyIdentitySet))
        );
    }

    #[test]
    fn unrepresentable_expiration_is_rejected() {
        let expiration = Timestamp::from_epoch_seconds(u64::MAX);
        let key = root().derive_key(expiration).unwrap();
        let ids = [ServiceId::Aci(Uuid::from_bytes([5; 16]))];
        assert_eq!(
            issue_full_token(&ids, &key),
            Err(IssuanceError::Format(FormatError::ExpirationOutOfRange(u64::MAX)))
        );
    }
}
