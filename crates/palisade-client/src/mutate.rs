//! Mutation protocol: admit, remove, rebind, unbind.
//!
//! Each intent is validated locally, applied against the remote authority,
//! and followed by a full directory reload -- the returned snapshot is the
//! read-after-write view. A failed mutation performs no reload, leaving the
//! caller on its last known-good snapshot.

use palisade_directory::{AddressParseError, Certificate, DirectorySnapshot, NodeAddress, PeerUuid};

use crate::error::{Error, Result};
use crate::store::DirectoryStore;

/// The operator-facing peer directory: snapshots plus the mutation intents.
#[derive(Debug, Clone)]
pub struct PeerDirectory {
    store: DirectoryStore,
}

impl PeerDirectory {
    pub fn new(store: DirectoryStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DirectoryStore {
        &self.store
    }

    /// Load a fresh snapshot without mutating anything.
    pub async fn refresh(&self) -> Result<DirectorySnapshot> {
        self.store.load_snapshot().await
    }

    /// Admit a peer into the trust list.
    ///
    /// Idempotent when the uuid is already known with a byte-identical
    /// certificate. A different certificate is rejected with
    /// [`Error::TrustConflict`] before any remote write: re-keying a trusted
    /// peer must go through an explicit remove.
    pub async fn admit(&self, uuid: &PeerUuid, cert: &Certificate) -> Result<DirectorySnapshot> {
        if uuid.is_empty() {
            return Err(Error::Validation("peer uuid must not be empty".into()));
        }
        if cert.is_empty() {
            return Err(Error::Validation(
                "peer certificate must not be empty".into(),
            ));
        }

        let known = self.store.load_known().await?;
        if let Some(existing) = known.iter().find(|p| &p.uuid == uuid) {
            if existing.cert == *cert {
                tracing::info!("peer {} already known with this certificate", uuid);
                return self.refresh().await;
            }
            tracing::warn!("refusing to re-admit {} with a different certificate", uuid);
            return Err(Error::TrustConflict { uuid: uuid.clone() });
        }

        self.store
            .authority()
            .put_known_peer(uuid.as_str(), cert.as_str())
            .await?;
        tracing::info!("admitted peer {}", uuid);
        self.refresh().await
    }

    /// Remove a peer from the trust list.
    ///
    /// Removing a uuid that is not known is a no-op success. Any address
    /// binding for the uuid becomes invisible at the next reconciliation.
    pub async fn remove(&self, uuid: &PeerUuid) -> Result<DirectorySnapshot> {
        if uuid.is_empty() {
            return Err(Error::Validation("peer uuid must not be empty".into()));
        }

        self.store
            .authority()
            .delete_known_peer(uuid.as_str())
            .await?;
        tracing::info!("removed peer {}", uuid);
        self.refresh().await
    }

    /// Bind (or replace) the address override for a known peer.
    ///
    /// The address must parse as host + plaintext port + secure port, and
    /// the uuid must reference a currently known peer; both are checked
    /// before any remote write. Resubmitting the same address is a no-op
    /// success.
    pub async fn rebind(&self, uuid: &PeerUuid, address: &str) -> Result<DirectorySnapshot> {
        if uuid.is_empty() {
            return Err(Error::Validation("peer uuid must not be empty".into()));
        }
        let address: NodeAddress = address
            .parse()
            .map_err(|err: AddressParseError| Error::Validation(err.to_string()))?;

        let known = self.store.load_known().await?;
        if !known.iter().any(|p| &p.uuid == uuid) {
            return Err(Error::Validation(format!(
                "peer {uuid} is not known; admit it before binding an address"
            )));
        }

        self.store
            .authority()
            .put_peer_address(uuid.as_str(), &address.to_string())
            .await?;
        tracing::info!("bound address {} for peer {}", address, uuid);
        self.refresh().await
    }

    /// Drop the address override for a peer, if one exists.
    ///
    /// Idempotent: unbinding a uuid with no binding is a no-op success.
    pub async fn unbind(&self, uuid: &PeerUuid) -> Result<DirectorySnapshot> {
        if uuid.is_empty() {
            return Err(Error::Validation("peer uuid must not be empty".into()));
        }

        self.store
            .authority()
            .delete_peer_address(uuid.as_str())
            .await?;
        tracing::info!("unbound address for peer {}", uuid);
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Authority, Session};

    // Validation failures must short-circuit before any remote call, so an
    // unroutable authority is safe here.
    fn directory() -> PeerDirectory {
        let authority = Authority::new("http://127.0.0.1:1", Session::anonymous()).unwrap();
        PeerDirectory::new(DirectoryStore::new(authority))
    }

    #[tokio::test]
    async fn admit_rejects_empty_fields() {
        let dir = directory();
        let err = dir
            .admit(&PeerUuid::new(""), &Certificate::new("Y2VydA=="))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = dir
            .admit(&PeerUuid::new("p1"), &Certificate::new(" "))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn remove_rejects_empty_uuid() {
        let err = directory().remove(&PeerUuid::new("")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn rebind_rejects_malformed_address() {
        let err = directory()
            .rebind(&PeerUuid::new("p1"), "10.0.0.1:9000")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn unbind_rejects_empty_uuid() {
        let err = directory().unbind(&PeerUuid::new("")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
