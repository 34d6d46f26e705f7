//! Password-sealed envelopes.
//!
//! [`encrypt`] and [`decrypt`] are stateless: every call draws its own salt
//! and nonce, derives its own key and drops it before returning, so they are
//! safe to call from any number of threads at once.

use crate::crypto::{self, NONCE_LEN, SALT_LEN};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::format::Envelope;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

/// Encrypts `plaintext` under `password` and returns the envelope text.
///
/// A fresh salt and nonce are drawn for every call, so sealing the same
/// plaintext twice yields different envelopes.
///
/// # Errors
///
/// Returns [`EnvelopeError::RandomUnavailable`] if the OS random generator
/// fails.
pub fn encrypt(plaintext: &str, password: &str) -> EnvelopeResult<String> {
    let salt = crypto::generate_salt()?;
    let nonce = crypto::generate_nonce()?;

    let envelope = seal_with(plaintext, password, salt, nonce)?;
    debug!(bytes = envelope.byte_len(), "sealed envelope");

    Ok(envelope.encode())
}

/// Opens envelope text produced by [`encrypt`].
///
/// # Errors
///
/// - [`EnvelopeError::Malformed`] if the text is not base64, is shorter than
///   the fixed fields, or does not decrypt to UTF-8.
/// - [`EnvelopeError::Authentication`] if the password is wrong or any byte
///   of the envelope was altered. The two cases are deliberately not told
///   apart.
pub fn decrypt(envelope: &str, password: &str) -> EnvelopeResult<Zeroizing<String>> {
    let envelope = Envelope::decode(envelope)?;
    open(&envelope, password)
}

pub(crate) fn seal_with(
    plaintext: &str,
    password: &str,
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
) -> EnvelopeResult<Envelope> {
    let key = crypto::derive_key(password, &salt);
    let (ciphertext, tag) = crypto::seal(&key, &nonce, plaintext.as_bytes())?;

    Ok(Envelope::new(salt, nonce, ciphertext, tag))
}

fn open(envelope: &Envelope, password: &str) -> EnvelopeResult<Zeroizing<String>> {
    let key = crypto::derive_key(password, envelope.salt());

    let mut plaintext = crypto::open(&key, envelope.nonce(), envelope.ciphertext(), envelope.tag())
        .inspect_err(|_| debug!("envelope authentication failed"))?;
    debug!(bytes = envelope.byte_len(), "opened envelope");

    match String::from_utf8(std::mem::take(&mut *plaintext)) {
        Ok(text) => Ok(Zeroizing::new(text)),
        Err(err) => {
            err.into_bytes().zeroize();
            Err(EnvelopeError::Malformed("plaintext is not valid UTF-8"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ENVELOPE_OVERHEAD;
    use base64::{Engine, engine::general_purpose::STANDARD};

    const SALT: [u8; SALT_LEN] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f,
    ];
    const NONCE: [u8; NONCE_LEN] = [
        0xa0, 0xa1, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xab,
    ];

    #[test]
    fn seal_with_matches_known_envelope() {
        let envelope = seal_with("hello", "123456", SALT, NONCE).unwrap();
        assert_eq!(
            envelope.encode(),
            "AAECAwQFBgcICQoLDA0OD6ChoqOkpaanqKmqq6U7e/X4/Vb8loVcU6nIl3CNe1pDEQ=="
        );
    }

    #[test]
    fn seal_with_empty_plaintext_matches_known_envelope() {
        let envelope = seal_with("", "123456", SALT, NONCE).unwrap();
        assert_eq!(
            envelope.encode(),
            "AAECAwQFBgcICQoLDA0OD6ChoqOkpaanqKmqqzJvxLtfzCdTMgEtvAS4rtE="
        );
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let sealed = encrypt("hello", "123456").unwrap();
        let opened = decrypt(&sealed, "123456").unwrap();

        assert_eq!(opened.as_str(), "hello");
    }

    #[test]
    fn non_utf8_plaintext_is_malformed() {
        let key = crypto::derive_key("123456", &SALT);
        let (ciphertext, tag) = crypto::seal(&key, &NONCE, &[0xff, 0xfe, 0xfd]).unwrap();
        let text = Envelope::new(SALT, NONCE, ciphertext, tag).encode();

        assert!(matches!(
            decrypt(&text, "123456"),
            Err(EnvelopeError::Malformed("plaintext is not valid UTF-8"))
        ));
    }

    #[test]
    fn short_envelope_is_malformed_before_key_derivation() {
        let text = STANDARD.encode([0u8; ENVELOPE_OVERHEAD - 1]);

        assert!(matches!(
            decrypt(&text, "123456"),
            Err(EnvelopeError::Malformed("envelope too short"))
        ));
    }
}
