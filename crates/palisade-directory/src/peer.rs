//! Peer identity and addressing types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::fingerprint::{fingerprint, Fingerprint, FingerprintError};

/// Opaque peer identifier assigned by the mesh.
///
/// Globally unique; equality on the identifier is the only notion of peer
/// identity the directory uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerUuid(String);

impl PeerUuid {
    /// Wrap a raw identifier string.
    pub fn new(uuid: impl Into<String>) -> Self {
        Self(uuid.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identifier carries no content.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PeerUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerUuid {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Certificate blob as delivered by the authority (base64-encoded).
///
/// Opaque to the directory: the only operation is fingerprinting. Trust
/// decisions are made by uuid admission, never by inspecting the blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Certificate(String);

impl Certificate {
    /// Wrap a raw certificate string.
    pub fn new(cert: impl Into<String>) -> Self {
        Self(cert.into())
    }

    /// The raw base64 blob.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the blob carries no content.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Digest this certificate for human comparison.
    pub fn fingerprint(&self) -> Result<Fingerprint, FingerprintError> {
        fingerprint(self)
    }
}

impl From<&str> for Certificate {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The running node's own identity.
///
/// Fetched once per directory load and cached for the snapshot's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfInfo {
    /// Our own uuid. Load-bearing for self-exclusion from peer listings.
    pub uuid: PeerUuid,

    /// The certificate this node presents to peers.
    pub cert: Certificate,
}

/// One remote peer, as seen through the available or known lens.
///
/// Both lenses share this shape; classification is a property of which
/// directory a uuid appears in, not a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRecord {
    /// The peer's unique identifier.
    pub uuid: PeerUuid,

    /// The certificate the peer presents.
    pub cert: Certificate,

    /// Address the peer itself advertised, if any. Display-only: the
    /// separate address override table is the source of truth for
    /// reachability.
    pub known_address: Option<String>,
}

impl PeerRecord {
    /// Record with no advertised address.
    pub fn new(uuid: impl Into<PeerUuid>, cert: impl Into<Certificate>) -> Self {
        Self {
            uuid: uuid.into(),
            cert: cert.into(),
            known_address: None,
        }
    }
}

/// Network address of a peer: host plus plaintext and secure ports.
///
/// Wire form is `host:plainPort:securePort`. The host may itself contain
/// colons (IPv6), so parsing splits the two ports off the right-hand end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAddress {
    pub host: String,
    pub plain_port: u16,
    pub secure_port: u16,
}

impl NodeAddress {
    pub fn new(host: impl Into<String>, plain_port: u16, secure_port: u16) -> Self {
        Self {
            host: host.into(),
            plain_port,
            secure_port,
        }
    }
}

/// Errors from parsing a `host:plainPort:securePort` string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    /// Fewer than three colon-separated parts.
    #[error("address must have the form host:plainPort:securePort")]
    MissingParts,

    /// Host part is empty.
    #[error("address has an empty host")]
    EmptyHost,

    /// A port part is not a valid u16.
    #[error("invalid port {0:?}")]
    InvalidPort(String),
}

impl FromStr for NodeAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, secure) = s.rsplit_once(':').ok_or(AddressParseError::MissingParts)?;
        let (host, plain) = rest
            .rsplit_once(':')
            .ok_or(AddressParseError::MissingParts)?;

        if host.is_empty() {
            return Err(AddressParseError::EmptyHost);
        }

        let plain_port = plain
            .parse()
            .map_err(|_| AddressParseError::InvalidPort(plain.to_string()))?;
        let secure_port = secure
            .parse()
            .map_err(|_| AddressParseError::InvalidPort(secure.to_string()))?;

        Ok(Self {
            host: host.to_string(),
            plain_port,
            secure_port,
        })
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.host, self.plain_port, self.secure_port)
    }
}

/// An address override binding a known peer to a reachable endpoint.
///
/// At most one binding per uuid survives reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerAddress {
    pub uuid: PeerUuid,
    pub address: NodeAddress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_round_trip() {
        let addr: NodeAddress = "10.0.0.1:9000:9001".parse().unwrap();
        assert_eq!(addr.host, "10.0.0.1");
        assert_eq!(addr.plain_port, 9000);
        assert_eq!(addr.secure_port, 9001);
        assert_eq!(addr.to_string(), "10.0.0.1:9000:9001");
    }

    #[test]
    fn address_ipv6_host() {
        let addr: NodeAddress = "fe80::1:9000:9001".parse().unwrap();
        assert_eq!(addr.host, "fe80::1");
        assert_eq!(addr.plain_port, 9000);
        assert_eq!(addr.secure_port, 9001);
    }

    #[test]
    fn address_hostname() {
        let addr: NodeAddress = "node-7.mesh.local:80:443".parse().unwrap();
        assert_eq!(addr.host, "node-7.mesh.local");
    }

    #[test]
    fn address_missing_parts() {
        assert_eq!(
            "10.0.0.1:9000".parse::<NodeAddress>(),
            Err(AddressParseError::MissingParts)
        );
        assert_eq!(
            "10.0.0.1".parse::<NodeAddress>(),
            Err(AddressParseError::MissingParts)
        );
        assert_eq!(
            "".parse::<NodeAddress>(),
            Err(AddressParseError::MissingParts)
        );
    }

    #[test]
    fn address_bad_ports() {
        assert_eq!(
            "host:abc:443".parse::<NodeAddress>(),
            Err(AddressParseError::InvalidPort("abc".into()))
        );
        assert_eq!(
            "host:80:70000".parse::<NodeAddress>(),
            Err(AddressParseError::InvalidPort("70000".into()))
        );
    }

    #[test]
    fn address_empty_host() {
        assert_eq!(
            ":80:443".parse::<NodeAddress>(),
            Err(AddressParseError::EmptyHost)
        );
    }

    #[test]
    fn uuid_emptiness() {
        assert!(PeerUuid::new("").is_empty());
        assert!(PeerUuid::new("   ").is_empty());
        assert!(!PeerUuid::new("p1").is_empty());
    }
}
