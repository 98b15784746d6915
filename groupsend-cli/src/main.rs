//! `groupsend` binary entry point.
//!
//! Command-line front end for group-send full tokens.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use groupsend_token::ServiceId;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::commands::VerifyOptions;

/// groupsend CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "groupsend")]
#[command(about = "Issue and verify group-send full tokens")]
struct Args {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new server root key.
    GenRootKey,

    /// Issue a full token for an ordered list of recipients.
    Issue {
        /// Server root key (hex).
        #[arg(long, env = "GROUPSEND_ROOT_KEY", hide_env_values = true)]
        root_key: String,

        /// Expiration in seconds since the Unix epoch.
        #[arg(short, long)]
        expiration: u64,

        /// Recipient service ids, in order. Prefix PNIs with "PNI:".
        #[arg(short, long = "recipient", required = true)]
        recipients: Vec<ServiceId>,
    },

    /// Print the expiration embedded in a token.
    Inspect {
        /// Token (hex).
        #[arg(short, long)]
        token: String,
    },

    /// Verify a token against an ordered list of recipients.
    Verify {
        /// Server root key (hex).
        #[arg(long, env = "GROUPSEND_ROOT_KEY", hide_env_values = true)]
        root_key: String,

        /// Token (hex).
        #[arg(short, long)]
        token: String,

        /// Recipient service ids, in the order used at issuance.
        #[arg(short, long = "recipient", required = true)]
        recipients: Vec<ServiceId>,

        /// Current time override in epoch seconds. For testing only.
        #[arg(long)]
        now: Option<u64>,

        /// Verifier policy file (TOML).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip the expiration check.
        #[arg(long)]
        no_expiry_check: bool,
    },
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::GenRootKey => print_json(&commands::gen_root_key())?,
        Command::Issue {
            root_key,
            expiration,
            recipients,
        } => print_json(&commands::issue(&root_key, expiration, &recipients)?)?,
        Command::Inspect { token } => print_json(&commands::inspect(&token)?)?,
        Command::Verify {
            root_key,
            token,
            recipients,
            now,
            config,
            no_expiry_check,
        } => {
            let options = VerifyOptions {
                now,
                config_path: config.as_deref(),
                no_expiry_check,
            };
            let output = commands::verify(&root_key, &token, &recipients, options)?;
            print_json(&output)?;
            if !output.valid {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
