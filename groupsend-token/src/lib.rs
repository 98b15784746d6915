//! Group-send full tokens.
//!
//! A full token proves that the issuing server endorsed a send to a fixed, ordered set
//! of recipients until an expiration, without revealing which endorsement it came
//! from. This crate owns the token wire format, the canonical encoding of the
//! recipient set, and the keyed check binding the two together.
//!
//! ```no_run
//! use groupsend_token::{FullToken, ServerRootKey, ServiceId, TokenVerifier, VerifierConfig};
//!
//! # fn run(bytes: &[u8], recipients: &[ServiceId], root: &ServerRootKey)
//! # -> Result<(), Box<dyn std::error::Error>> {
//! let token = FullToken::new(bytes)?;
//! let key = root.derive_key(token.expiration())?;
//! TokenVerifier::new(VerifierConfig::default()).verify(&token, recipients, &key)?;
//! # Ok(())
//! # }
//! ```

pub mod application_service;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod port;

pub use application_service::{issue_full_token, IssuanceError, TokenIssuer, TokenVerifier};
pub use config::{ConfigError, VerifierConfig};
pub use domain::*;
pub use infrastructure::{DerivedKey, FixedClock, KeyMaterialError, ServerRootKey, SystemClock};
pub use port::*;
