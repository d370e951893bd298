//! Directory store: fetching the raw collections and assembling snapshots.
//!
//! The four loads are independent and issued concurrently; the snapshot is
//! not usable until all four have returned. Self-load failure is fatal to
//! the snapshot (self-identity is load-bearing for self-exclusion); the
//! peer and address loads degrade to an empty list with a surfaced warning.

use palisade_directory::{
    reconcile, AddressRow, DirectorySnapshot, PeerAddress, PeerRecord, PeerUuid, ReconcileWarning,
    SelfInfo,
};

use crate::error::{Error, Result};
use crate::http::Authority;

/// Read side of the peer directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    authority: Authority,
}

impl DirectoryStore {
    pub fn new(authority: Authority) -> Self {
        Self { authority }
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Our own identity. Failure here aborts the whole snapshot.
    pub async fn load_self(&self) -> Result<SelfInfo> {
        Ok(self.authority.self_info().await?.into())
    }

    /// Peers discovered on the local network. Empty when none.
    pub async fn load_available(&self) -> Result<Vec<PeerRecord>> {
        let peers = self.authority.available_peers().await?;
        Ok(peers.into_iter().map(Into::into).collect())
    }

    /// The canonical trust list.
    pub async fn load_known(&self) -> Result<Vec<PeerRecord>> {
        let peers = self.authority.known_peers().await?;
        Ok(peers.into_iter().map(Into::into).collect())
    }

    /// The canonical address override list, still in wire form.
    pub async fn load_addresses(&self) -> Result<Vec<AddressRow>> {
        let rows = self.authority.peer_addresses().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// One address binding. Absence is a normal lifecycle state, so an
    /// application-level refusal maps to `None` rather than an error.
    pub async fn load_address(&self, uuid: &PeerUuid) -> Result<Option<PeerAddress>> {
        match self.authority.peer_address(uuid.as_str()).await {
            Ok(row) => {
                let address = row
                    .address
                    .parse()
                    .map_err(|err| Error::MalformedResponse {
                        detail: format!("address for {uuid}: {err}"),
                    })?;
                Ok(Some(PeerAddress {
                    uuid: PeerUuid::new(row.uuid),
                    address,
                }))
            }
            Err(Error::Application { messages, code }) => {
                tracing::debug!(
                    "no address binding for {} (code {}): {}",
                    uuid,
                    code,
                    messages.join(", ")
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Fetch all four collections concurrently and reconcile them into a
    /// fresh snapshot. No partial snapshot is ever returned.
    pub async fn load_snapshot(&self) -> Result<DirectorySnapshot> {
        let (self_info, available, known, addresses) = tokio::join!(
            self.load_self(),
            self.load_available(),
            self.load_known(),
            self.load_addresses(),
        );

        let self_info = self_info?;

        let mut load_warnings = Vec::new();
        let available = degrade(available, "available peers", &mut load_warnings);
        let known = degrade(known, "known peers", &mut load_warnings);
        let addresses = degrade(addresses, "peer addresses", &mut load_warnings);

        let mut snapshot = reconcile(self_info, available, known, addresses);
        snapshot.warnings.extend(load_warnings);
        Ok(snapshot)
    }
}

/// Degrade a failed non-self load to an empty list plus a warning.
fn degrade<T>(
    result: Result<Vec<T>>,
    source: &str,
    warnings: &mut Vec<ReconcileWarning>,
) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!("could not load {}: {}", source, err);
            warnings.push(ReconcileWarning::DegradedLoad {
                source: source.to_string(),
                reason: err.to_string(),
            });
            Vec::new()
        }
    }
}
