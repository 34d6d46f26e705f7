use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
mod auth;
use pinseal::{SecretVault, Storage, default_storage, ensure_hex_prefix, generate_secret_key};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

const LOG_ENV: &str = "PINSEAL_LOG";

fn resolve_storage(path: Option<PathBuf>) -> Result<Storage> {
    match path {
        Some(p) => Ok(Storage::new(p)),
        None => default_storage(),
    }
}

#[derive(Debug, Parser)]
#[command(name = "pinseal")]
#[command(
    version,
    about = "Seal private keys at rest with a password (PBKDF2 + AES-256-GCM)."
)]
struct Cli {
    /// Path to the encrypted key file
    #[arg(long, global = true, value_name = "PATH", env = "PINSEAL_KEY_FILE")]
    key_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts a value and prints the envelope
    Encrypt {
        /// Value to encrypt; read from the first stdin line when omitted
        plaintext: Option<String>,
    },

    /// Decrypts an envelope and prints the value
    #[command(arg_required_else_help = true)]
    Decrypt { envelope: String },

    /// Creates the key file, sealing a new or given private key under a PIN
    Init {
        /// Hex private key to seal instead of generating one
        #[arg(long, value_name = "HEX")]
        secret: Option<String>,
    },

    /// Decrypts the key file and prints the private key
    Unlock,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    // a missing .env is fine
    let _ = dotenvy::dotenv();
    init_logging();

    let args = Cli::parse();
    match args.command {
        Commands::Encrypt { plaintext } => {
            let (plaintext, password) = match plaintext {
                Some(p) => (Zeroizing::new(p), auth::read_password()?),
                None => (auth::read_stdin_line()?, auth::read_password_without_stdin()?),
            };
            let envelope = pinseal::encrypt(&plaintext, &password)?;
            println!("{envelope}");
        }
        Commands::Decrypt { envelope } => {
            let password = auth::read_password()?;
            let plaintext = pinseal::decrypt(&envelope, &password)
                .context("failed to decrypt; wrong password?")?;
            println!("{}", plaintext.as_str());
        }
        Commands::Init { secret } => {
            let vault = SecretVault::new(resolve_storage(args.key_file)?);
            if vault.exists() {
                anyhow::bail!(
                    "key file already exists: {}",
                    vault.storage().path().display()
                );
            }

            let pin = auth::read_new_pin()?;
            let secret = match secret {
                Some(hex) => ensure_hex_prefix(&hex),
                None => generate_secret_key()?,
            };
            vault.create(&secret, &pin)?;
            println!(
                "private key created and encrypted: {}",
                vault.storage().path().display()
            );
        }
        Commands::Unlock => {
            let vault = SecretVault::new(resolve_storage(args.key_file)?);
            let password = auth::read_password()?;
            let secret = ensure_hex_prefix(&vault.unlock(&password)?);
            println!("{}", secret.as_str());
        }
    }

    Ok(())
}
