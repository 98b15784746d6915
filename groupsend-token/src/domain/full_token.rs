use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::domain::identity_encoding::{identity_binding, CanonicalIdentity};
use crate::domain::timestamp::Timestamp;
use crate::port::token_authenticator::TokenAuthenticator;

pub const FULL_TOKEN_VERSION: u8 = 0;
pub const TAG_LEN: usize = 16;
const EXPIRATION_LEN: usize = 8;
pub const FULL_TOKEN_LEN: usize = 1 + TAG_LEN + EXPIRATION_LEN;

const TAG_RANGE: std::ops::Range<usize> = 1..1 + TAG_LEN;
const EXPIRATION_RANGE: std::ops::Range<usize> = 1 + TAG_LEN..FULL_TOKEN_LEN;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid full token length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("unsupported full token version: {0}")]
    UnsupportedVersion(u8),
    #[error("expiration out of range: {0}")]
    ExpirationOutOfRange(u64),
}

/// Returned for every verification failure.
///
/// A bad tag, a key for the wrong expiration, a mismatched identity set and an expired
/// token are deliberately indistinguishable to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("group send token verification failed")]
pub struct VerificationError;

/// A token proving that an endorsement was issued for an ordered set of recipients,
/// together with the endorsement's expiration.
///
/// Layout: `version (1) | tag (16) | expiration (8, big-endian seconds)`.
/// A `FullToken` only exists once its bytes have passed the format check.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FullToken {
    bytes: [u8; FULL_TOKEN_LEN],
}

impl FullToken {
    pub fn new(bytes: &[u8]) -> Result<Self, FormatError> {
        let bytes: [u8; FULL_TOKEN_LEN] =
            bytes.try_into().map_err(|_| FormatError::InvalidLength {
                expected: FULL_TOKEN_LEN,
                actual: bytes.len(),
            })?;

        if bytes[0] != FULL_TOKEN_VERSION {
            return Err(FormatError::UnsupportedVersion(bytes[0]));
        }

        let token = Self { bytes };
        let expiration = token.expiration();
        if !expiration.is_representable() {
            return Err(FormatError::ExpirationOutOfRange(expiration.epoch_seconds()));
        }
        Ok(token)
    }

    pub(crate) fn from_parts(
        tag: [u8; TAG_LEN],
        expiration: Timestamp,
    ) -> Result<Self, FormatError> {
        if !expiration.is_representable() {
            return Err(FormatError::ExpirationOutOfRange(expiration.epoch_seconds()));
        }
        let mut bytes = [0u8; FULL_TOKEN_LEN];
        bytes[0] = FULL_TOKEN_VERSION;
        bytes[TAG_RANGE].copy_from_slice(&tag);
        bytes[EXPIRATION_RANGE].copy_from_slice(&expiration.to_be_bytes());
        Ok(Self { bytes })
    }

    /// Expiration embedded in the token. Use it to select the matching key material.
    pub fn expiration(&self) -> Timestamp {
        let mut raw = [0u8; EXPIRATION_LEN];
        raw.copy_from_slice(&self.bytes[EXPIRATION_RANGE]);
        Timestamp::from_be_bytes(raw)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    pub(crate) fn tag(&self) -> &[u8] {
        &self.bytes[TAG_RANGE]
    }

    /// Verifies that this token was generated from an endorsement of `identities`
    /// by `key`, and that it has not yet expired.
    ///
    /// `key` must be the one derived for [`Self::expiration`].
    pub fn verify<T, A>(&self, identities: &[T], key: &A) -> Result<(), VerificationError>
    where
        T: CanonicalIdentity,
        A: TokenAuthenticator + ?Sized,
    {
        self.check_at(identities, Timestamp::now(), key)
    }

    /// Same as [`Self::verify`] with an explicit current time.
    ///
    /// Intended for tests only. Production callers must use [`Self::verify`] so the
    /// time cannot be supplied by an untrusted party.
    pub fn verify_at_for_testing<T, A>(
        &self,
        identities: &[T],
        now: Timestamp,
        key: &A,
    ) -> Result<(), VerificationError>
    where
        T: CanonicalIdentity,
        A: TokenAuthenticator + ?Sized,
    {
        self.check_at(identities, now, key)
    }

    fn check_at<T, A>(
        &self,
        identities: &[T],
        now: Timestamp,
        key: &A,
    ) -> Result<(), VerificationError>
    where
        T: CanonicalIdentity,
        A: TokenAuthenticator + ?Sized,
    {
        self.check_authenticity(identities, key)?;
        if self.expiration() <= now {
            debug!(expiration = %self.expiration(), %now, "full token expired");
            return Err(VerificationError);
        }
        Ok(())
    }

    /// Tag check without any time policy.
    pub(crate) fn check_authenticity<T, A>(
        &self,
        identities: &[T],
        key: &A,
    ) -> Result<(), VerificationError>
    where
        T: CanonicalIdentity,
        A: TokenAuthenticator + ?Sized,
    {
        let binding = identity_binding(identities).map_err(|e| {
            debug!(error = %e, "cannot encode identity set");
            VerificationError
        })?;
        key.verify_tag(self.tag(), &binding, self.expiration())
            .inspect_err(|_| debug!("full token tag mismatch"))
    }
}

impl TryFrom<&[u8]> for FullToken {
    type Error = FormatError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

impl TryFrom<Vec<u8>> for FullToken {
    type Error = FormatError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(&bytes)
    }
}

// The tag stays out of logs.
impl fmt::Debug for FullToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FullToken")
            .field("expiration", &self.expiration())
            .finish_non_exhaustive()
    }
}
