//! Keysmith operator CLI
//!
//! Issues and checks RSA-signed licenses:
//!
//!   keysmith keygen --name vendor --encrypt
//!   keysmith sign --private-key vendor.private.pem --issuer "Acme Corp" \
//!       --licensed-to customer-42 --product X --valid-from 2024-01-01 \
//!       --valid-to 2025-01-01 --out license.json
//!   keysmith verify --license license.json --public-key vendor.public.pem
//!
//! Password-protected keys read their password from the environment
//! variable named by `--password-env`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use keysmith_cli::commands::{self, parse_key_value, parse_timestamp, LicenseRequest};
use keysmith_cli::KeysmithConfig;
use keysmith_crypto::{generate_secure_token, generate_temporary_password};
use keysmith_license::{LicenseTier, SignatureAlgorithm};
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use zeroize::Zeroizing;

#[derive(Parser, Debug)]
#[command(name = "keysmith")]
#[command(about = "License signing, validation and key management")]
struct Args {
    /// Path to the config file (default: ./keysmith.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Environment variable holding the private key password
    #[arg(long, global = true, default_value = "KEYSMITH_KEY_PASSWORD")]
    password_env: String,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an RSA signing key pair
    Keygen {
        /// Modulus size in bits (overrides keygen.bits)
        #[arg(long)]
        bits: Option<usize>,
        /// Base name of the generated files
        #[arg(long, default_value = "keysmith")]
        name: String,
        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Password-protect the private key
        #[arg(long)]
        encrypt: bool,
    },
    /// Print the public key of a private key file
    PublicKey {
        #[arg(long)]
        private_key: PathBuf,
    },
    /// Print the SHA-256 fingerprint of a public key file
    Fingerprint {
        #[arg(long)]
        public_key: PathBuf,
    },
    /// Write a password-protected copy of a private key
    EncryptKey {
        #[arg(long)]
        private_key: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Sign a license
    Sign {
        #[arg(long)]
        private_key: PathBuf,
        #[arg(long)]
        issuer: String,
        #[arg(long)]
        licensed_to: String,
        #[arg(long = "product")]
        product_id: String,
        #[arg(long, default_value = "standard")]
        tier: LicenseTier,
        /// Enabled feature (repeatable)
        #[arg(long = "feature")]
        features: Vec<String>,
        /// Metadata entry as key=value (repeatable)
        #[arg(long = "meta", value_parser = parse_key_value)]
        metadata: Vec<(String, String)>,
        /// Start of validity (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_timestamp)]
        valid_from: DateTime<Utc>,
        /// End of validity (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_timestamp)]
        valid_to: DateTime<Utc>,
        /// Signature scheme (overrides signing.algorithm)
        #[arg(long)]
        algorithm: Option<SignatureAlgorithm>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Validate a license and print the result as JSON
    Verify {
        #[arg(long)]
        license: PathBuf,
        #[arg(long)]
        public_key: PathBuf,
        /// Reference time (default: now)
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<DateTime<Utc>>,
        /// Clock skew tolerance (overrides validation.clock_skew_secs)
        #[arg(long)]
        clock_skew_secs: Option<u64>,
    },
    /// Generate distinct product keys
    ProductKeys {
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },
    /// Generate a random bearer token
    Token,
    /// Generate a temporary password
    TempPassword,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = KeysmithConfig::load(args.config.as_deref())?;
    let password = std::env::var(&args.password_env).ok().map(Zeroizing::new);

    match args.command {
        Command::Keygen {
            bits,
            name,
            out_dir,
            encrypt,
        } => {
            let password = if encrypt {
                Some(require_password(password.as_ref(), &args.password_env)?)
            } else {
                None
            };
            let keys = commands::keygen(&config, bits, &out_dir, &name, password)?;
            if !keys.encrypted {
                warn!("Private key written unencrypted; consider `keysmith encrypt-key`");
            }
            println!("private key: {}", keys.private_key_path.display());
            println!("public key:  {}", keys.public_key_path.display());
            println!("fingerprint: {}", keys.fingerprint);
        }
        Command::PublicKey { private_key } => {
            let pem = commands::public_key(&private_key, password.as_deref().map(String::as_str))?;
            print!("{pem}");
        }
        Command::Fingerprint { public_key } => {
            println!("{}", commands::fingerprint(&public_key)?);
        }
        Command::EncryptKey { private_key, out } => {
            let password = require_password(password.as_ref(), &args.password_env)?;
            commands::encrypt_key(&config, &private_key, &out, password)?;
        }
        Command::Sign {
            private_key,
            issuer,
            licensed_to,
            product_id,
            tier,
            features,
            metadata,
            valid_from,
            valid_to,
            algorithm,
            out,
        } => {
            let request = LicenseRequest {
                issuer,
                licensed_to,
                product_id,
                tier,
                features,
                metadata,
                valid_from,
                valid_to,
            };
            let signed = commands::sign_license(
                &config,
                &request,
                &private_key,
                password.as_deref().map(String::as_str),
                algorithm,
                &out,
            )?;
            println!("{}", signed.payload.license_id);
        }
        Command::Verify {
            license,
            public_key,
            at,
            clock_skew_secs,
        } => {
            let result =
                commands::verify_license(&config, &license, &public_key, at, clock_skew_secs);
            println!(
                "{}",
                serde_json::to_string_pretty(&result).context("Failed to encode result")?
            );
            if !result.is_valid {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::ProductKeys { count } => {
            for key in commands::product_keys(count)? {
                println!("{key}");
            }
        }
        Command::Token => println!("{}", generate_secure_token()),
        Command::TempPassword => println!("{}", generate_temporary_password()),
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: bool) {
    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    if std::env::var_os("RUST_LOG").is_some() {
        builder.with_env_filter(EnvFilter::from_default_env()).init();
    } else {
        let log_level = if verbose { Level::DEBUG } else { Level::INFO };
        builder.with_max_level(log_level).init();
    }
}

fn require_password<'a>(password: Option<&'a Zeroizing<String>>, env: &str) -> Result<&'a str> {
    let password = password
        .map(|p| p.as_str())
        .filter(|p| !p.is_empty())
        .with_context(|| format!("Set {env} to the private key password"))?;
    info!("Using private key password from {env}");
    Ok(password)
}
