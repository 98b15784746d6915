use std::fmt;

use rand_core::{CryptoRng, RngCore};
use thiserror::Error;
use tracing::trace;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::domain::full_token::{VerificationError, TAG_LEN};
use crate::domain::timestamp::Timestamp;
use crate::infrastructure::crypto::hkdf::{HkdfError, HkdfKeyDerivation};
use crate::infrastructure::crypto::hmac_sha256::HmacSha256Key;
use crate::port::key_provider::DerivedKeyProvider;
use crate::port::token_authenticator::TokenAuthenticator;

pub const ROOT_KEY_LEN: usize = 32;

const DERIVED_KEY_INFO: &[u8] = b"monas-groupsend/full-token/derived-key/v1";
const TAG_DOMAIN: &[u8] = b"monas-groupsend/full-token/tag/v1";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyMaterialError {
    #[error("invalid root key length: expected 32, got {0}")]
    InvalidLength(usize),
    #[error("key derivation failed: {0}")]
    Derivation(#[from] HkdfError),
}

/// The issuing server's long-lived secret. Per-expiration keys are derived from it.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ServerRootKey {
    secret: [u8; ROOT_KEY_LEN],
}

impl ServerRootKey {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut secret = [0u8; ROOT_KEY_LEN];
        rng.fill_bytes(&mut secret);
        Self { secret }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyMaterialError> {
        let secret: [u8; ROOT_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| KeyMaterialError::InvalidLength(bytes.len()))?;
        Ok(Self { secret })
    }

    pub fn to_bytes(&self) -> Zeroizing<[u8; ROOT_KEY_LEN]> {
        Zeroizing::new(self.secret)
    }

    /// Derives the key that issues and verifies tokens expiring at `expiration`.
    pub fn derive_key(&self, expiration: Timestamp) -> Result<DerivedKey, KeyMaterialError> {
        let secret = HkdfKeyDerivation::derive_256_bit_key(
            &self.secret,
            None,
            &[DERIVED_KEY_INFO, &expiration.to_be_bytes()],
        )?;
        trace!(%expiration, "derived full token key");
        Ok(DerivedKey {
            expiration,
            mac_key: HmacSha256Key::new(*secret),
        })
    }
}

impl DerivedKeyProvider for ServerRootKey {
    type Key = DerivedKey;
    type Error = KeyMaterialError;

    fn derived_key_for(&self, expiration: Timestamp) -> Result<DerivedKey, KeyMaterialError> {
        self.derive_key(expiration)
    }
}

impl fmt::Debug for ServerRootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServerRootKey(<redacted>)")
    }
}

/// Key material scoped to exactly one expiration.
///
/// The secret is wiped when the value is dropped.
#[derive(Clone)]
pub struct DerivedKey {
    expiration: Timestamp,
    mac_key: HmacSha256Key,
}

impl DerivedKey {
    /// Expiration this key was derived for.
    pub fn expiration(&self) -> Timestamp {
        self.expiration
    }

    fn full_tag(&self, bound_identities: &[u8], expiration: Timestamp) -> [u8; 32] {
        self.mac_key
            .compute(&[TAG_DOMAIN, bound_identities, &expiration.to_be_bytes()])
    }
}

impl TokenAuthenticator for DerivedKey {
    fn compute_tag(&self, bound_identities: &[u8], expiration: Timestamp) -> [u8; TAG_LEN] {
        let full = self.full_tag(bound_identities, expiration);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&full[..TAG_LEN]);
        tag
    }

    fn verify_tag(
        &self,
        tag: &[u8],
        bound_identities: &[u8],
        expiration: Timestamp,
    ) -> Result<(), VerificationError> {
        self.mac_key
            .verify_truncated(
                &[TAG_DOMAIN, bound_identities, &expiration.to_be_bytes()],
                tag,
                TAG_LEN,
            )
            .map_err(|_| VerificationError)
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}
