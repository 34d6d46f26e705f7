use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN};

/// Derive the envelope key from a password and salt.
///
/// PBKDF2-HMAC-SHA256 with [`PBKDF2_ITERATIONS`] rounds. The iteration count
/// is the main defense for short numeric PINs, so it is fixed rather than
/// configurable: envelopes do not record it.
pub fn derive_key(password: &str, salt: &[u8; SALT_LEN]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key[..]);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn kdf_is_deterministic() {
        let salt = [42u8; SALT_LEN];

        let k1 = derive_key("password", &salt);
        let k2 = derive_key("password", &salt);

        assert_eq!(*k1, *k2);
    }

    #[test]
    fn kdf_salt_affects_output() {
        let k1 = derive_key("123456", &[7u8; SALT_LEN]);
        let k2 = derive_key("123456", &[8u8; SALT_LEN]);

        assert_ne!(*k1, *k2);
    }

    #[test]
    fn kdf_password_affects_output() {
        let salt = [7u8; SALT_LEN];

        let k1 = derive_key("123456", &salt);
        let k2 = derive_key("123457", &salt);

        assert_ne!(*k1, *k2);
    }

    #[test]
    fn kdf_accepts_empty_password() {
        let key = derive_key("", &[0u8; SALT_LEN]);
        assert_eq!(key.len(), KEY_LEN);
    }

    #[test]
    fn kdf_matches_known_vector() {
        let salt: [u8; SALT_LEN] = core::array::from_fn(|i| i as u8);
        let key = derive_key("123456", &salt);

        assert_eq!(
            hex(&key[..]),
            "3e3d2422f00f2cc1d1bad045819bfb8360117d59c588035c4294f3403ac097a5"
        );
    }
}
