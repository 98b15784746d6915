//! Command implementations, kept free of argument parsing and printing.

use std::path::Path;

use anyhow::{Context, Result};
use groupsend_token::{
    issue_full_token, FullToken, ServerRootKey, ServiceId, Timestamp, TokenVerifier,
    VerifierConfig,
};
use rand_core::OsRng;
use serde::Serialize;
use zeroize::Zeroizing;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RootKeyOutput {
    pub root_key: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct IssueOutput {
    pub token: String,
    pub expiration: u64,
    pub recipients: usize,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct InspectOutput {
    pub expiration: u64,
    pub expiration_rfc3339: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct VerifyOutput {
    pub valid: bool,
    pub expiration: u64,
}

/// Options for the `verify` command.
#[derive(Debug, Default)]
pub struct VerifyOptions<'a> {
    pub now: Option<u64>,
    pub config_path: Option<&'a Path>,
    pub no_expiry_check: bool,
}

pub fn gen_root_key() -> RootKeyOutput {
    let root = ServerRootKey::generate(&mut OsRng);
    RootKeyOutput {
        root_key: hex::encode(root.to_bytes().as_slice()),
    }
}

pub fn issue(
    root_key_hex: &str,
    expiration: u64,
    recipients: &[ServiceId],
) -> Result<IssueOutput> {
    let root = parse_root_key(root_key_hex)?;
    let expiration = Timestamp::from_epoch_seconds(expiration);
    let key = root
        .derive_key(expiration)
        .context("Failed to derive key for expiration")?;
    let token = issue_full_token(recipients, &key).context("Failed to issue token")?;

    tracing::info!(%expiration, recipients = recipients.len(), "Issued full token");
    Ok(IssueOutput {
        token: hex::encode(token.as_bytes()),
        expiration: expiration.epoch_seconds(),
        recipients: recipients.len(),
    })
}

pub fn inspect(token_hex: &str) -> Result<InspectOutput> {
    let token = parse_token(token_hex)?;
    let expiration = token.expiration();
    Ok(InspectOutput {
        expiration: expiration.epoch_seconds(),
        expiration_rfc3339: expiration.to_datetime().map(|dt| dt.to_rfc3339()),
    })
}

pub fn verify(
    root_key_hex: &str,
    token_hex: &str,
    recipients: &[ServiceId],
    options: VerifyOptions<'_>,
) -> Result<VerifyOutput> {
    let root = parse_root_key(root_key_hex)?;
    let token = parse_token(token_hex)?;

    let mut config = match options.config_path {
        Some(path) => VerifierConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => VerifierConfig::default(),
    };
    if options.no_expiry_check {
        config.enforce_expiration = false;
    }
    tracing::debug!(?config, "Verifier policy");

    let verifier = TokenVerifier::new(config);
    let result = match options.now {
        Some(now) => {
            tracing::warn!(now, "Verifying with an explicit time; use only for testing");
            let key = root
                .derive_key(token.expiration())
                .context("Failed to derive key for token expiration")?;
            let now = Timestamp::from_epoch_seconds(now);
            verifier.verify_at_for_testing(&token, recipients, now, &key)
        }
        None => verifier.verify_with_provider(&token, recipients, &root),
    };

    let valid = result.is_ok();
    if valid {
        tracing::info!(expiration = %token.expiration(), "Token accepted");
    } else {
        tracing::info!(expiration = %token.expiration(), "Token rejected");
    }
    Ok(VerifyOutput {
        valid,
        expiration: token.expiration().epoch_seconds(),
    })
}

fn parse_root_key(root_key_hex: &str) -> Result<ServerRootKey> {
    let bytes =
        Zeroizing::new(hex::decode(root_key_hex.trim()).context("Root key is not valid hex")?);
    ServerRootKey::from_bytes(&bytes).context("Invalid root key")
}

fn parse_token(token_hex: &str) -> Result<FullToken> {
    let bytes = hex::decode(token_hex.trim()).context("Token is not valid hex")?;
    FullToken::new(&bytes).context("Malformed token")
}
