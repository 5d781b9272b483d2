//! Walkthrough of the wallet lifecycle: create, import, sign, verify,
//! recover, and prove ownership of an address.
//!
//! Run with:
//!   cargo run --example demo
//!   RUST_LOG=cardwallet=debug cargo run --example demo
//!   LOG_FORMAT=json RUST_LOG=debug cargo run --example demo

use std::time::Instant;

use anyhow::Context;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardwallet::config::AddressConfig;
use cardwallet::WalletFactory;

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Accepts "json" or "pretty" (case-insensitive); anything else is pretty.
    fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `default_level`.
/// Logs go to stderr so stdout stays clean for the walkthrough.
fn init_logging(default_level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
                .init();
        }
    }

    tracing::info!("logging initialized (format={:?})", format);
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]==================================================={RESET}");
    println!("{BOLD}{WHITE}  {title}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn timing(label: &str, elapsed: std::time::Duration) {
    let ms = elapsed.as_secs_f64() * 1000.0;
    println!("{DIM}  [{label}: {ms:.2} ms]{RESET}");
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    let format = LogFormat::from_str_lossy(&std::env::var("LOG_FORMAT").unwrap_or_default());
    init_logging("info", format);

    section(1, "Fresh wallet");
    let t = Instant::now();
    let alice = cardwallet::create_wallet();
    timing("create_wallet", t.elapsed());
    info("address", alice.address());
    info("card   ", &alice.formatted_number());
    info("pubkey ", alice.public_key());
    anyhow::ensure!(cardwallet::validate_address(alice.address()));
    success("address validates");

    section(2, "Import from private key 0x01");
    let one = cardwallet::import_from_private_key("01").context("importing key 0x01")?;
    info("address", one.address());
    info("card   ", &one.formatted_number());

    section(3, "Sign, verify, recover");
    let message = format!("{} owns this message", alice.address());
    let t = Instant::now();
    let sig = cardwallet::sign(&message, alice.private_key())?;
    timing("sign", t.elapsed());
    info("signature", &sig.to_hex()?);
    anyhow::ensure!(cardwallet::verify(&message, &sig, alice.public_key()));
    success("signature verifies against the public key");
    let recovered = cardwallet::recover(&message, &sig)?;
    anyhow::ensure!(recovered == alice.public_key());
    success("public key recovered from the signature alone");
    anyhow::ensure!(cardwallet::verify_with_address(&message, &sig, alice.address()));
    success("signer matches the address");

    section(4, "Bad input");
    for candidate in ["", "not-base58-!!!", "gD2YP6Q7g4g4STVoe2xwqPGnKYeDmx"] {
        info(
            &format!("validate({candidate:?})"),
            &cardwallet::validate_address(candidate).to_string(),
        );
    }
    let unrecoverable = sig.without_recovery_id();
    match cardwallet::recover(&message, &unrecoverable) {
        Ok(pk) => anyhow::bail!("recovered {pk} without a recovery id"),
        Err(e) => info("recover without id", &e.to_string()),
    }

    section(5, "Four-byte checksum scheme");
    let factory = WalletFactory::new(AddressConfig::new(0x90, 4)?);
    let wide = factory.import_from_private_key("01")?;
    info("address", wide.address());
    success("same key, longer address, stronger typo detection");

    println!();
    Ok(())
}
