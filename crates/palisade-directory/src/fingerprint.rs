//! Certificate fingerprinting.
//!
//! A fingerprint is a short deterministic digest of a certificate blob,
//! rendered for human visual comparison. It is not a trust decision: trust
//! is granted by admitting a uuid, never by matching fingerprints.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fmt;
use thiserror::Error;

use crate::peer::Certificate;

/// Errors from digesting a certificate blob.
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// The blob carries no content.
    #[error("certificate is empty")]
    EmptyCertificate,

    /// The blob is not decodable base64.
    #[error("certificate is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
}

/// blake3 digest of the raw certificate bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Raw digest bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full lowercase hex encoding (64 chars).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First four octets, for log lines and dense listings.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Fingerprint {
    /// Colon-separated hex octets, the form operators compare by eye.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ":")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Digest a certificate blob into a [`Fingerprint`].
///
/// Pure and deterministic: byte-identical input always yields the same
/// output, and any change to the input changes the output with
/// overwhelming probability.
pub fn fingerprint(cert: &Certificate) -> Result<Fingerprint, FingerprintError> {
    if cert.is_empty() {
        return Err(FingerprintError::EmptyCertificate);
    }
    let raw = BASE64.decode(cert.as_str().trim())?;
    Ok(Fingerprint(*blake3::hash(&raw).as_bytes()))
}
