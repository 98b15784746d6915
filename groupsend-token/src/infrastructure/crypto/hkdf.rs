use hkdf::Hkdf;
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HkdfError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("requested output is too long")]
    OutputTooLong,
}

/// RFC 5869 に準拠した HKDF-SHA256
pub struct HkdfKeyDerivation;

impl HkdfKeyDerivation {
    pub fn derive_key(
        input_key_material: &[u8],
        salt: Option<&[u8]>,
        info: &[&[u8]],
        length: usize,
    ) -> Result<Zeroizing<Vec<u8>>, HkdfError> {
        if input_key_material.is_empty() {
            return Err(HkdfError::InvalidParameter(
                "input key material cannot be empty",
            ));
        }
        if length == 0 {
            return Err(HkdfError::InvalidParameter("length must be larger than 0"));
        }

        let hkdf = Hkdf::<Sha256>::new(salt, input_key_material);
        let mut output_keying_material = Zeroizing::new(vec![0u8; length]);
        hkdf.expand_multi_info(info, &mut output_keying_material)
            .map_err(|_| HkdfError::OutputTooLong)?;
        Ok(output_keying_material)
    }

    pub fn derive_256_bit_key(
        input_key_material: &[u8],
        salt: Option<&[u8]>,
        info: &[&[u8]],
    ) -> Result<Zeroizing<[u8; 32]>, HkdfError> {
        let derived = Self::derive_key(input_key_material, salt, info, 32)?;
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&derived);
        Ok(key)
    }
}
