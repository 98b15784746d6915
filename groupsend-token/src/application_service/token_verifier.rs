use tracing::{debug, warn};

use crate::config::VerifierConfig;
use crate::domain::full_token::{FullToken, VerificationError};
use crate::domain::identity_encoding::CanonicalIdentity;
use crate::domain::timestamp::Timestamp;
use crate::infrastructure::clock::SystemClock;
use crate::port::clock::Clock;
use crate::port::key_provider::DerivedKeyProvider;
use crate::port::token_authenticator::TokenAuthenticator;

/// Verifies full tokens under a configurable expiry policy.
///
/// Holds no mutable state, so one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct TokenVerifier<C = SystemClock> {
    config: VerifierConfig,
    clock: C,
}

impl TokenVerifier<SystemClock> {
    pub fn new(config: VerifierConfig) -> Self {
        Self {
            config,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> TokenVerifier<C> {
    pub fn with_clock(config: VerifierConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verifies `token` against the ordered `identities` with the key for its expiration.
    pub fn verify<T, A>(
        &self,
        token: &FullToken,
        identities: &[T],
        key: &A,
    ) -> Result<(), VerificationError>
    where
        T: CanonicalIdentity,
        A: TokenAuthenticator + ?Sized,
    {
        self.check_at(token, identities, self.clock.now(), key)
    }

    /// Same as [`Self::verify`] with an explicit current time.
    ///
    /// Intended for tests only; production paths take the time from the clock.
    pub fn verify_at_for_testing<T, A>(
        &self,
        token: &FullToken,
        identities: &[T],
        now: Timestamp,
        key: &A,
    ) -> Result<(), VerificationError>
    where
        T: CanonicalIdentity,
        A: TokenAuthenticator + ?Sized,
    {
        self.check_at(token, identities, now, key)
    }

    fn check_at<T, A>(
        &self,
        token: &FullToken,
        identities: &[T],
        now: Timestamp,
        key: &A,
    ) -> Result<(), VerificationError>
    where
        T: CanonicalIdentity,
        A: TokenAuthenticator + ?Sized,
    {
        token.check_authenticity(identities, key)?;

        let expiration = token.expiration();
        if self.config.enforce_expiration && expiration <= now {
            debug!(%expiration, %now, "full token expired");
            return Err(VerificationError);
        }
        if let Some(max_lifetime) = self.config.max_token_lifetime_secs {
            if expiration.saturating_sub(now) > max_lifetime {
                debug!(%expiration, %now, max_lifetime, "full token lifetime exceeds policy");
                return Err(VerificationError);
            }
        }
        Ok(())
    }

    /// Looks up the key for `token.expiration()` through `provider`, then verifies.
    pub fn verify_with_provider<T, P>(
        &self,
        token: &FullToken,
        identities: &[T],
        provider: &P,
    ) -> Result<(), VerificationError>
    where
        T: CanonicalIdentity,
        P: DerivedKeyProvider + ?Sized,
    {
        let key = provider
            .derived_key_for(token.expiration())
            .map_err(|e| {
                warn!(error = %e, expiration = %token.expiration(), "no key material for token");
                VerificationError
            })?;
        self.verify(token, identities, &key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_service::token_issuer::issue_full_token;
    use crate::domain::service_id::ServiceId;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::key_material::{DerivedKey, ServerRootKey};
    use uuid::Uuid;

    const EXPIRATION: Timestamp = Timestamp::from_epoch_seconds(1_700_000_000);

    fn root() -> ServerRootKey {
        ServerRootKey::from_bytes(&[9u8; 32]).unwrap()
    }

    fn ids() -> Vec<ServiceId> {
        vec![
            ServiceId::Aci(Uuid::from_bytes([0xAA; 16])),
            ServiceId::Pni(Uuid::from_bytes([0xBB; 16])),
        ]
    }

    fn token() -> FullToken {
        let key = root().derive_key(EXPIRATION).unwrap();
        issue_full_token(&ids(), &key).unwrap()
    }

    fn verifier_at(config: VerifierConfig, now: u64) -> TokenVerifier<FixedClock> {
        TokenVerifier::with_clock(config, FixedClock(Timestamp::from_epoch_seconds(now)))
    }

    #[test]
    fn uses_injected_clock() {
        let key = root().derive_key(EXPIRATION).unwrap();
        assert!(verifier_at(VerifierConfig::default(), 1_699_999_999)
            .verify(&token(), &ids(), &key)
            .is_ok());
        assert!(verifier_at(VerifierConfig::default(), 1_700_000_000)
            .verify(&token(), &ids(), &key)
            .is_err());
    }

    #[test]
    fn expiry_check_can_be_disabled() {
        let key = root().derive_key(EXPIRATION).unwrap();
        let verifier = verifier_at(VerifierConfig::without_expiry_check(), 1_800_000_000);
        assert!(verifier.verify(&token(), &ids(), &key).is_ok());

        // The tag is still checked.
        let mut reversed = ids();
        reversed.reverse();
        assert!(verifier.verify(&token(), &reversed, &key).is_err());
    }

    #[test]
    fn max_lifetime_policy() {
        let key = root().derive_key(EXPIRATION).unwrap();
        let config = VerifierConfig {
            enforce_expiration: true,
            max_token_lifetime_secs: Some(86_400),
        };
        assert!(verifier_at(config.clone(), 1_700_000_000 - 86_400)
            .verify(&token(), &ids(), &key)
            .is_ok());
        assert!(verifier_at(config, 1_700_000_000 - 86_401)
            .verify(&token(), &ids(), &key)
            .is_err());
    }

    /// Hands out one pre-derived key and refuses every other expiration.
    struct SingleKeyProvider(DerivedKey);

    #[derive(Debug, thiserror::Error)]
    #[error("no key for expiration {0}")]
    struct UnknownExpiration(Timestamp);

    impl DerivedKeyProvider for SingleKeyProvider {
        type Key = DerivedKey;
        type Error = UnknownExpiration;

        fn derived_key_for(&self, expiration: Timestamp) -> Result<DerivedKey, UnknownExpiration> {
            if expiration == self.0.expiration() {
                Ok(self.0.clone())
            } else {
                Err(UnknownExpiration(expiration))
            }
        }
    }

    #[test]
    fn any_provider_implementation_can_supply_keys() {
        let verifier = verifier_at(VerifierConfig::default(), 1_699_999_999);

        let matching = SingleKeyProvider(root().derive_key(EXPIRATION).unwrap());
        assert!(verifier.verify_with_provider(&token(), &ids(), &matching).is_ok());

        let other_epoch = Timestamp::from_epoch_seconds(1_700_086_400);
        let missing = SingleKeyProvider(root().derive_key(other_epoch).unwrap());
        assert_eq!(
            verifier.verify_with_provider(&token(), &ids(), &missing),
            Err(VerificationError)
        );
    }

    #[test]
    fn provider_selects_key_by_expiration() {
        let verifier = verifier_at(VerifierConfig::default(), 1_699_999_999);
        assert!(verifier.verify_with_provider(&token(), &ids(), &root()).is_ok());

        let other_root = ServerRootKey::from_bytes(&[10u8; 32]).unwrap();
        assert_eq!(
            verifier.verify_with_provider(&token(), &ids(), &other_root),
            Err(VerificationError)
        );
    }
}
