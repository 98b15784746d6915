use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const HMAC_SHA256_KEY_LEN: usize = 32;
pub const HMAC_SHA256_OUTPUT_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HmacError {
    #[error("HMAC verification failed")]
    VerificationFailed,
    #[error("invalid truncated tag length: {0}")]
    InvalidTagLength(usize),
}

/// HMAC-SHA256 の鍵。Drop 時にゼロクリアされる。
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct HmacSha256Key {
    key: [u8; HMAC_SHA256_KEY_LEN],
}

impl HmacSha256Key {
    pub fn new(key: [u8; HMAC_SHA256_KEY_LEN]) -> Self {
        Self { key }
    }

    fn mac_over(&self, parts: &[&[u8]]) -> Hmac<Sha256> {
        let mut mac = <Hmac<Sha256>>::new_from_slice(&self.key)
            .expect("HMAC key initialization should never fail");
        for part in parts {
            mac.update(part);
        }
        mac
    }

    /// `parts` を順に連結したメッセージの認証コードを計算する
    pub fn compute(&self, parts: &[&[u8]]) -> [u8; HMAC_SHA256_OUTPUT_LEN] {
        self.mac_over(parts).finalize().into_bytes().into()
    }

    /// 先頭 `expected.len()` バイトに切り詰めた認証コードを定数時間で検証する
    ///
    /// `expected` の長さは `expected_len` と一致しなければならない。短いタグを受け入れると
    /// 偽造が容易になるため、長さ不一致は比較前にエラーとする。
    pub fn verify_truncated(
        &self,
        parts: &[&[u8]],
        expected: &[u8],
        expected_len: usize,
    ) -> Result<(), HmacError> {
        if expected.len() != expected_len
            || expected_len == 0
            || expected_len > HMAC_SHA256_OUTPUT_LEN
        {
            return Err(HmacError::InvalidTagLength(expected.len()));
        }
        self.mac_over(parts)
            .verify_truncated_left(expected)
            .map_err(|_| HmacError::VerificationFailed)
    }
}
