use thiserror::Error;

/// Failures of envelope sealing and opening.
///
/// None of the variants carry key material or plaintext. A wrong password
/// and a tampered envelope both surface as [`EnvelopeError::Authentication`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("malformed envelope: {0}")]
    Malformed(&'static str),

    #[error("invalid password or corrupted envelope")]
    Authentication,

    #[error("OS random generator unavailable")]
    RandomUnavailable,

    #[error("encryption failed")]
    Encryption,
}

pub type EnvelopeResult<T> = Result<T, EnvelopeError>;
