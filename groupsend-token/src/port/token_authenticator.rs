use crate::domain::full_token::{VerificationError, TAG_LEN};
use crate::domain::timestamp::Timestamp;

/// The keyed primitive binding a tag to (identity binding, expiration).
///
/// `bound_identities` is the output of
/// [`identity_binding`](crate::domain::identity_encoding::identity_binding).
/// Implementations must compare tags in constant time, and a key scoped to another
/// expiration must never accept a tag.
pub trait TokenAuthenticator {
    fn compute_tag(&self, bound_identities: &[u8], expiration: Timestamp) -> [u8; TAG_LEN];

    fn verify_tag(
        &self,
        tag: &[u8],
        bound_identities: &[u8],
        expiration: Timestamp,
    ) -> Result<(), VerificationError>;
}
