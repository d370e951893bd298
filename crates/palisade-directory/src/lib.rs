//! Palisade Directory - Peer Membership Read Model
//!
//! The pure core of the peer directory: the entities a mesh node exposes to
//! its operator (self identity, discovered peers, trusted peers, address
//! overrides), certificate fingerprinting for human comparison, and the
//! reconciliation that merges the raw collections into one effective view.
//!
//! # Architecture
//!
//! - **Peer types**: identifiers, certificates, records, addresses
//! - **Fingerprint**: deterministic blake3 digest of a certificate blob
//! - **Reconcile**: raw collections in, [`DirectorySnapshot`] out
//!
//! Everything here is a pure function of its inputs. Fetching the raw
//! collections from a node and mutating the trust list live in
//! `palisade-client`.

pub mod fingerprint;
pub mod peer;
pub mod reconcile;

pub use fingerprint::{fingerprint, Fingerprint, FingerprintError};
pub use peer::{
    AddressParseError, Certificate, NodeAddress, PeerAddress, PeerRecord, PeerUuid, SelfInfo,
};
pub use reconcile::{
    reconcile, AddressRow, DirectorySnapshot, KnownPeer, PeerClass, ReconcileWarning,
};
