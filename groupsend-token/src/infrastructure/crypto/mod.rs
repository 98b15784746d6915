pub mod hkdf;
pub mod hmac_sha256;
