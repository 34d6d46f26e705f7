//! Binary layout of a sealed envelope.
//!
//! ```text
//! SALT (16) | NONCE (12) | CIPHERTEXT (N - 44) | TAG (16)
//! ```
//!
//! Every field but the ciphertext has a fixed length, so the ciphertext is
//! recovered by subtraction. There is no magic or version byte: the layout
//! is shared with existing key files and must stay bit-exact. The text form
//! is standard padded base64 of the whole byte sequence.

use crate::crypto::{ENVELOPE_OVERHEAD, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::{EnvelopeError, EnvelopeResult};
use base64::{Engine, engine::general_purpose::STANDARD};

const NONCE_OFFSET: usize = SALT_LEN;
const CIPHERTEXT_OFFSET: usize = SALT_LEN + NONCE_LEN;

/// A parsed envelope with all components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
    tag: [u8; TAG_LEN],
}

impl Envelope {
    /// Creates an envelope from its components.
    pub fn new(
        salt: [u8; SALT_LEN],
        nonce: [u8; NONCE_LEN],
        ciphertext: Vec<u8>,
        tag: [u8; TAG_LEN],
    ) -> Self {
        Self {
            salt,
            nonce,
            ciphertext,
            tag,
        }
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn tag(&self) -> &[u8; TAG_LEN] {
        &self.tag
    }

    /// Total length of the binary form.
    pub fn byte_len(&self) -> usize {
        ENVELOPE_OVERHEAD + self.ciphertext.len()
    }

    /// Serializes the envelope to its binary form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.byte_len());

        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&self.ciphertext);
        buf.extend_from_slice(&self.tag);

        buf
    }

    /// Parses the binary form by fixed offsets.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Malformed`] if `data` is shorter than
    /// [`ENVELOPE_OVERHEAD`].
    pub fn from_bytes(data: &[u8]) -> EnvelopeResult<Self> {
        if data.len() < ENVELOPE_OVERHEAD {
            return Err(EnvelopeError::Malformed("envelope too short"));
        }

        let tag_offset = data.len() - TAG_LEN;

        let salt: [u8; SALT_LEN] = data[..NONCE_OFFSET]
            .try_into()
            .map_err(|_| EnvelopeError::Malformed("invalid salt length"))?;
        let nonce: [u8; NONCE_LEN] = data[NONCE_OFFSET..CIPHERTEXT_OFFSET]
            .try_into()
            .map_err(|_| EnvelopeError::Malformed("invalid nonce length"))?;
        let tag: [u8; TAG_LEN] = data[tag_offset..]
            .try_into()
            .map_err(|_| EnvelopeError::Malformed("invalid tag length"))?;
        let ciphertext = data[CIPHERTEXT_OFFSET..tag_offset].to_vec();

        Ok(Self::new(salt, nonce, ciphertext, tag))
    }

    /// Encodes the envelope as base64 text.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Decodes base64 text and parses the result.
    ///
    /// Leading and trailing whitespace (such as the newline of a pasted or
    /// piped envelope) is trimmed first; the base64 itself is decoded
    /// strictly, padding included.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Malformed`] if the text is not base64 or the
    /// decoded bytes are too short.
    pub fn decode(text: &str) -> EnvelopeResult<Self> {
        let data = STANDARD
            .decode(text.trim())
            .map_err(|_| EnvelopeError::Malformed("envelope is not valid base64"))?;
        Self::from_bytes(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope::new([1u8; 16], [2u8; 12], vec![3u8; 5], [4u8; 16])
    }

    #[test]
    fn fields_land_at_fixed_offsets() {
        let bytes = sample().to_bytes();

        assert_eq!(bytes.len(), 49);
        assert_eq!(&bytes[..16], &[1u8; 16]);
        assert_eq!(&bytes[16..28], &[2u8; 12]);
        assert_eq!(&bytes[28..33], &[3u8; 5]);
        assert_eq!(&bytes[33..], &[4u8; 16]);
    }

    #[test]
    fn parse_recovers_fields() {
        let envelope = sample();
        let parsed = Envelope::from_bytes(&envelope.to_bytes()).unwrap();

        assert_eq!(parsed, envelope);
    }

    #[test]
    fn empty_ciphertext_is_valid() {
        let data = vec![0u8; ENVELOPE_OVERHEAD];
        let parsed = Envelope::from_bytes(&data).unwrap();

        assert!(parsed.ciphertext().is_empty());
        assert_eq!(parsed.byte_len(), ENVELOPE_OVERHEAD);
    }

    #[test]
    fn too_short_fails() {
        for len in 0..ENVELOPE_OVERHEAD {
            let data = vec![0u8; len];
            assert_eq!(
                Envelope::from_bytes(&data),
                Err(EnvelopeError::Malformed("envelope too short"))
            );
        }
    }

    #[test]
    fn text_form_is_standard_base64() {
        let text = sample().encode();

        assert_eq!(text.len(), 68);
        assert!(text.starts_with("AQEBAQEBAQEBAQEBAQEBAQICAgICAgICAgICAgMDAwMD"));
        assert_eq!(Envelope::decode(&text).unwrap(), sample());
    }

    #[test]
    fn invalid_base64_fails() {
        assert!(matches!(
            Envelope::decode("not base64!"),
            Err(EnvelopeError::Malformed(_))
        ));
    }

    #[test]
    fn decode_ignores_surrounding_whitespace() {
        let text = format!("  {}\n", sample().encode());
        assert_eq!(Envelope::decode(&text).unwrap(), sample());
    }

    #[test]
    fn decode_rejects_inner_whitespace() {
        let text = sample().encode();
        let split = format!("{} {}", &text[..20], &text[20..]);

        assert_eq!(
            Envelope::decode(&split),
            Err(EnvelopeError::Malformed("envelope is not valid base64"))
        );
    }

    #[test]
    fn decode_rejects_missing_padding() {
        let text = sample().encode();
        let unpadded = text.trim_end_matches('=');

        assert!(Envelope::decode(unpadded).is_err());
    }
}
