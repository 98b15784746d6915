use thiserror::Error;

use crate::domain::service_id::ServiceId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("identity set must contain at least one recipient")]
    EmptyIdentitySet,
}

/// An identity with a stable, fixed-width canonical record.
///
/// Implementations must be injective: two distinct identities never share a record.
pub trait CanonicalIdentity {
    fn encoded_len(&self) -> usize;

    fn append_canonical(&self, out: &mut Vec<u8>);
}

impl CanonicalIdentity for ServiceId {
    fn encoded_len(&self) -> usize {
        self.binary_len()
    }

    fn append_canonical(&self, out: &mut Vec<u8>) {
        self.append_service_id_binary(out)
    }
}

/// Concatenates the canonical record of every identity, in the order given.
///
/// No separators, padding or sorting are applied, so the same members in another
/// order produce different bytes.
pub fn encode_identity_set<'a, T, I>(identities: I) -> Result<Vec<u8>, EncodingError>
where
    T: CanonicalIdentity + 'a,
    I: IntoIterator<Item = &'a T>,
    I::IntoIter: Clone,
{
    let iter = identities.into_iter();
    let total: usize = iter.clone().map(|identity| identity.encoded_len()).sum();

    let mut out = Vec::with_capacity(total);
    let mut count = 0usize;
    for identity in iter {
        identity.append_canonical(&mut out);
        count += 1;
    }

    if count == 0 {
        return Err(EncodingError::EmptyIdentitySet);
    }
    debug_assert_eq!(out.len(), total);
    Ok(out)
}

const LAYOUT_FIELD_LEN: usize = 8;

/// Tag input for an ordered identity set: the record count, each record's width,
/// then the records from [`encode_identity_set`].
///
/// Records of different kinds differ in width, so the bare concatenation of two
/// different lists can coincide. Spelling out the widths fixes every record boundary.
pub fn identity_binding<'a, T, I>(identities: I) -> Result<Vec<u8>, EncodingError>
where
    T: CanonicalIdentity + 'a,
    I: IntoIterator<Item = &'a T>,
    I::IntoIter: Clone,
{
    let iter = identities.into_iter();
    let records = encode_identity_set(iter.clone())?;
    let count = iter.clone().count();

    let mut out = Vec::with_capacity(LAYOUT_FIELD_LEN * (count + 1) + records.len());
    out.extend_from_slice(&(count as u64).to_be_bytes());
    for identity in iter {
        out.extend_from_slice(&(identity.encoded_len() as u64).to_be_bytes());
    }
    out.extend_from_slice(&records);
    Ok(out)
}
