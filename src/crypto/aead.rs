use super::{KEY_LEN, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::{EnvelopeError, EnvelopeResult};
use aes_gcm::{
    Aes256Gcm, Key, Nonce, Tag,
    aead::{AeadInPlace, KeyInit},
};
use getrandom::fill;
use zeroize::{Zeroize, Zeroizing};

/// Fill buffer with cryptographically secure random bytes
fn secure_random(buf: &mut [u8]) -> EnvelopeResult<()> {
    fill(buf).map_err(|_| EnvelopeError::RandomUnavailable)
}

/// Generate salt
pub fn generate_salt() -> EnvelopeResult<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    secure_random(&mut salt)?;
    Ok(salt)
}

/// Generate nonce
pub fn generate_nonce() -> EnvelopeResult<[u8; NONCE_LEN]> {
    let mut nonce = [0u8; NONCE_LEN];
    secure_random(&mut nonce)?;
    Ok(nonce)
}

/// Encrypt plaintext, returning the ciphertext and its detached tag.
///
/// No associated data is authenticated. The ciphertext has the same length
/// as the plaintext.
pub fn seal(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> EnvelopeResult<(Vec<u8>, [u8; TAG_LEN])> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut buffer = plaintext.to_vec();
    match cipher.encrypt_in_place_detached(Nonce::from_slice(nonce), b"", &mut buffer) {
        Ok(tag) => {
            let mut detached = [0u8; TAG_LEN];
            detached.copy_from_slice(&tag);
            Ok((buffer, detached))
        }
        Err(_) => {
            buffer.zeroize();
            Err(EnvelopeError::Encryption)
        }
    }
}

/// Verify the tag and decrypt.
///
/// Nothing is released unless the tag matches; on failure the scratch
/// buffer is wiped before returning.
pub fn open(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    tag: &[u8; TAG_LEN],
) -> EnvelopeResult<Zeroizing<Vec<u8>>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut buffer = Zeroizing::new(ciphertext.to_vec());
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            b"",
            &mut buffer,
            Tag::from_slice(tag),
        )
        .map_err(|_| EnvelopeError::Authentication)?;

    Ok(buffer)
}
