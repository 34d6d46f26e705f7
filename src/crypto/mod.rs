//! Cryptographic primitives for sealed envelopes.
//!
//! Provides password-based key derivation and AES-256-GCM sealing.
//! The lengths below are part of the envelope format and must not change.

pub mod aead;
pub mod kdf;

pub use aead::{generate_nonce, generate_salt, open, seal};
pub use kdf::derive_key;

/// Length of the KDF salt (16 bytes).
pub const SALT_LEN: usize = 16;
/// Length of the AES-GCM nonce (12 bytes / 96 bits).
pub const NONCE_LEN: usize = 12;
/// Length of the AES-GCM authentication tag (16 bytes / 128 bits).
pub const TAG_LEN: usize = 16;
/// Length of the derived encryption key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;
/// Size of an envelope with an empty ciphertext.
pub const ENVELOPE_OVERHEAD: usize = SALT_LEN + NONCE_LEN + TAG_LEN;
