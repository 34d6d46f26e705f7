//! Password-sealed envelopes for private keys at rest.
//!
//! The core is [`encrypt`] / [`decrypt`]: PBKDF2-HMAC-SHA256 (100 000
//! rounds) turns a password and a random salt into an AES-256-GCM key, and
//! the result is stored as base64 of `salt ‖ nonce ‖ ciphertext ‖ tag`.
//!
//! [`SecretVault`] keeps one such envelope in a JSON key file.

pub mod crypto;
mod envelope;
mod error;
pub mod format;
mod keyfile;
mod storage;

pub use crate::envelope::{decrypt, encrypt};
pub use crate::error::{EnvelopeError, EnvelopeResult};
pub use crate::keyfile::KeyFile;
pub use crate::storage::Storage;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use getrandom::fill;
use tracing::info;
use zeroize::{Zeroize, Zeroizing};

/// File name of the default key file.
pub const DEFAULT_KEY_FILE: &str = "state-wallet-encrypted.json";

/// A single password-protected secret persisted in a key file.
pub struct SecretVault {
    storage: Storage,
}

impl SecretVault {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn exists(&self) -> bool {
        self.storage.exists()
    }

    /// Seals `secret` under `password` and writes a new key file.
    ///
    /// Refuses to overwrite an existing key file.
    pub fn create(&self, secret: &str, password: &str) -> Result<()> {
        if self.storage.exists() {
            bail!("key file already exists: {}", self.storage.path().display());
        }

        let enc = encrypt(secret, password).context("failed to seal secret")?;
        self.storage.save(&KeyFile::new(enc).to_json()?)?;

        info!(path = %self.storage.path().display(), "key file written");
        Ok(())
    }

    /// Loads the key file and opens its envelope.
    pub fn unlock(&self, password: &str) -> Result<Zeroizing<String>> {
        if !self.storage.exists() {
            bail!("key file does not exist: {}", self.storage.path().display());
        }

        let file = KeyFile::from_json(&self.storage.load()?)?;
        let secret = decrypt(file.enc(), password)
            .context("failed to decrypt secret; wrong password?")?;

        Ok(secret)
    }
}

/// Generates a random 32-byte private key as `0x`-prefixed lowercase hex.
pub fn generate_secret_key() -> Result<Zeroizing<String>> {
    let mut bytes = [0u8; 32];
    fill(&mut bytes).map_err(|_| anyhow::anyhow!("OS random generator unavailable"))?;

    let mut hex = Zeroizing::new(String::with_capacity(2 + bytes.len() * 2));
    hex.push_str("0x");
    for b in &bytes {
        hex.push_str(&format!("{:02x}", b));
    }
    bytes.zeroize();

    Ok(hex)
}

/// Prefixes `value` with `0x` unless it already is.
pub fn ensure_hex_prefix(value: &str) -> Zeroizing<String> {
    if value.starts_with("0x") {
        Zeroizing::new(value.to_string())
    } else {
        Zeroizing::new(format!("0x{value}"))
    }
}

pub fn default_storage() -> Result<Storage> {
    let project_dirs =
        ProjectDirs::from("", "", "pinseal").context("could not determine platform directories")?;

    Ok(Storage::new(project_dirs.data_dir().join(DEFAULT_KEY_FILE)))
}
