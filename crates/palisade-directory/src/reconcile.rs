//! Directory reconciliation.
//!
//! Merges the four raw collections fetched from a node (self identity,
//! available peers, known peers, address overrides) into one effective
//! [`DirectorySnapshot`]. Pure: no network access, no hidden state. Each
//! reconciliation builds a fresh snapshot; nothing from a previous load
//! leaks in.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::peer::{NodeAddress, PeerAddress, PeerRecord, PeerUuid, SelfInfo};

/// Raw address override row as delivered by the authority.
///
/// The address is still a wire string here; reconciliation parses it and
/// downgrades malformed rows to warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRow {
    pub uuid: PeerUuid,
    pub address: String,
}

/// Data-quality findings surfaced by a directory load.
///
/// None of these fail the snapshot; they exist so nothing is silently
/// dropped on the way to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileWarning {
    /// The backing store listed our own uuid among the peers.
    SelfInListing { uuid: PeerUuid, list: String },

    /// More than one address row for the same uuid; the last row won.
    DuplicateAddress { uuid: PeerUuid },

    /// An address row that does not parse as host + two ports.
    MalformedAddress { uuid: PeerUuid, address: String },

    /// A peer-list load failed and was degraded to an empty list.
    ///
    /// Note: the `source` field is a human label for what failed to load,
    /// not an error source, so `Display`/`Error` are written by hand rather
    /// than derived (a field named `source` would otherwise be treated as an
    /// [`std::error::Error`] source).
    DegradedLoad { source: String, reason: String },
}

impl std::fmt::Display for ReconcileWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileWarning::SelfInListing { uuid, list } => write!(
                f,
                "self uuid {uuid} appeared in the {list} list and was filtered out"
            ),
            ReconcileWarning::DuplicateAddress { uuid } => {
                write!(f, "duplicate address rows for {uuid}; keeping the last")
            }
            ReconcileWarning::MalformedAddress { uuid, address } => {
                write!(f, "unparseable address {address:?} for {uuid}; row ignored")
            }
            ReconcileWarning::DegradedLoad { source, reason } => write!(
                f,
                "could not load {source} ({reason}); treating as empty"
            ),
        }
    }
}

impl std::error::Error for ReconcileWarning {}

/// A trusted peer with its effective address attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownPeer {
    /// The underlying trust-list record.
    pub record: PeerRecord,

    /// The address override bound to this uuid, if any.
    pub effective_address: Option<NodeAddress>,
}

impl KnownPeer {
    /// Presentation-level reachability: an effective address is present.
    /// Not a live connection probe.
    pub fn connected(&self) -> bool {
        self.effective_address.is_some()
    }

    pub fn uuid(&self) -> &PeerUuid {
        &self.record.uuid
    }
}

/// Classification of a uuid within one snapshot.
///
/// Computed once per reconciliation so consumers never re-derive membership
/// ad hoc. Available and known are independent sets; a peer both discovered
/// and trusted classifies as known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerClass {
    /// Not present in any directory.
    Unknown,
    /// Discovered on the network but not trusted.
    AvailableOnly,
    /// Trusted, no address override bound.
    KnownUnaddressed,
    /// Trusted with an address override bound.
    KnownAddressed,
}

/// The effective peer view assembled for one caller.
///
/// Owned by the requesting caller for its rendering lifetime and never
/// mutated in place; every reload produces a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    /// Our own identity. Never present in the peer lists below.
    pub self_info: SelfInfo,

    /// Discovered peers, self excluded.
    pub available: Vec<PeerRecord>,

    /// Trusted peers with effective addresses attached, self excluded.
    pub known: Vec<KnownPeer>,

    /// Canonical address overrides after dedup, sorted by uuid.
    pub addresses: Vec<PeerAddress>,

    /// Data-quality findings from this load.
    pub warnings: Vec<ReconcileWarning>,
}

impl DirectorySnapshot {
    /// Classify a uuid against this snapshot.
    pub fn classify(&self, uuid: &PeerUuid) -> PeerClass {
        if let Some(peer) = self.known_peer(uuid) {
            if peer.connected() {
                PeerClass::KnownAddressed
            } else {
                PeerClass::KnownUnaddressed
            }
        } else if self.available.iter().any(|p| &p.uuid == uuid) {
            PeerClass::AvailableOnly
        } else {
            PeerClass::Unknown
        }
    }

    /// The known-list entry for a uuid, if trusted.
    pub fn known_peer(&self, uuid: &PeerUuid) -> Option<&KnownPeer> {
        self.known.iter().find(|p| p.uuid() == uuid)
    }

    /// The address a known peer should be reached at, if bound.
    pub fn effective_address(&self, uuid: &PeerUuid) -> Option<&NodeAddress> {
        self.known_peer(uuid)?.effective_address.as_ref()
    }
}

/// Assemble a [`DirectorySnapshot`] from the four raw collections.
///
/// 1. Filter our own uuid out of both peer lists.
/// 2. Build the uuid -> address lookup; duplicates are last-write-wins and
///    malformed rows are dropped, each surfaced as a warning.
/// 3. Attach effective address and connectivity to every known record.
///
/// Fingerprints are not computed here; callers digest certificates on
/// demand via [`crate::fingerprint`].
pub fn reconcile(
    self_info: SelfInfo,
    available: Vec<PeerRecord>,
    known: Vec<PeerRecord>,
    address_rows: Vec<AddressRow>,
) -> DirectorySnapshot {
    let mut warnings = Vec::new();
    let self_uuid = self_info.uuid.clone();

    let available = exclude_self(available, &self_uuid, "available", &mut warnings);
    let known_records = exclude_self(known, &self_uuid, "known", &mut warnings);

    let mut lookup: HashMap<PeerUuid, NodeAddress> = HashMap::new();
    for row in address_rows {
        match row.address.parse::<NodeAddress>() {
            Ok(address) => {
                if lookup.insert(row.uuid.clone(), address).is_some() {
                    warnings.push(ReconcileWarning::DuplicateAddress { uuid: row.uuid });
                }
            }
            Err(_) => warnings.push(ReconcileWarning::MalformedAddress {
                uuid: row.uuid,
                address: row.address,
            }),
        }
    }

    let known = known_records
        .into_iter()
        .map(|record| {
            let effective_address = lookup.get(&record.uuid).cloned();
            KnownPeer {
                record,
                effective_address,
            }
        })
        .collect();

    let mut addresses: Vec<PeerAddress> = lookup
        .into_iter()
        .map(|(uuid, address)| PeerAddress { uuid, address })
        .collect();
    addresses.sort_by(|a, b| a.uuid.cmp(&b.uuid));

    DirectorySnapshot {
        self_info,
        available,
        known,
        addresses,
        warnings,
    }
}

fn exclude_self(
    records: Vec<PeerRecord>,
    self_uuid: &PeerUuid,
    list: &str,
    warnings: &mut Vec<ReconcileWarning>,
) -> Vec<PeerRecord> {
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if &record.uuid == self_uuid {
            warnings.push(ReconcileWarning::SelfInListing {
                uuid: record.uuid,
                list: list.to_string(),
            });
        } else {
            kept.push(record);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::Certificate;

    fn self_info() -> SelfInfo {
        SelfInfo {
            uuid: PeerUuid::new("self"),
            cert: Certificate::new("c2VsZg=="),
        }
    }

    fn record(uuid: &str) -> PeerRecord {
        PeerRecord::new(uuid, "Y2VydA==")
    }

    fn row(uuid: &str, address: &str) -> AddressRow {
        AddressRow {
            uuid: PeerUuid::new(uuid),
            address: address.to_string(),
        }
    }

    #[test]
    fn empty_inputs_empty_snapshot() {
        let snap = reconcile(self_info(), vec![], vec![], vec![]);
        assert!(snap.available.is_empty());
        assert!(snap.known.is_empty());
        assert!(snap.addresses.is_empty());
        assert!(snap.warnings.is_empty());
    }

    #[test]
    fn self_filtered_from_both_lists() {
        let snap = reconcile(
            self_info(),
            vec![record("self"), record("p1")],
            vec![record("self"), record("p2")],
            vec![],
        );

        assert_eq!(snap.available.len(), 1);
        assert_eq!(snap.available[0].uuid, PeerUuid::new("p1"));
        assert_eq!(snap.known.len(), 1);
        assert_eq!(snap.known[0].uuid(), &PeerUuid::new("p2"));
        assert_eq!(
            snap.warnings
                .iter()
                .filter(|w| matches!(w, ReconcileWarning::SelfInListing { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn effective_address_attached_by_uuid() {
        let snap = reconcile(
            self_info(),
            vec![],
            vec![record("p1"), record("p2")],
            vec![row("p1", "10.0.0.1:9000:9001")],
        );

        let p1 = snap.known_peer(&PeerUuid::new("p1")).unwrap();
        assert!(p1.connected());
        assert_eq!(
            p1.effective_address,
            Some(NodeAddress::new("10.0.0.1", 9000, 9001))
        );

        let p2 = snap.known_peer(&PeerUuid::new("p2")).unwrap();
        assert!(!p2.connected());
        assert_eq!(p2.effective_address, None);
    }

    #[test]
    fn duplicate_rows_last_write_wins() {
        let snap = reconcile(
            self_info(),
            vec![],
            vec![record("p1")],
            vec![row("p1", "10.0.0.1:1:2"), row("p1", "10.0.0.2:3:4")],
        );

        assert_eq!(
            snap.effective_address(&PeerUuid::new("p1")),
            Some(&NodeAddress::new("10.0.0.2", 3, 4))
        );
        assert_eq!(snap.addresses.len(), 1);
        assert!(snap
            .warnings
            .contains(&ReconcileWarning::DuplicateAddress {
                uuid: PeerUuid::new("p1")
            }));
    }

    #[test]
    fn malformed_row_dropped_with_warning() {
        let snap = reconcile(
            self_info(),
            vec![],
            vec![record("p1")],
            vec![row("p1", "not-an-address")],
        );

        assert_eq!(snap.effective_address(&PeerUuid::new("p1")), None);
        assert!(snap.addresses.is_empty());
        assert!(snap
            .warnings
            .contains(&ReconcileWarning::MalformedAddress {
                uuid: PeerUuid::new("p1"),
                address: "not-an-address".into()
            }));
    }

    #[test]
    fn address_for_unknown_uuid_is_invisible_to_known_list() {
        // Stale rows may persist server-side after a peer is removed; they
        // simply find no match.
        let snap = reconcile(
            self_info(),
            vec![],
            vec![record("p1")],
            vec![row("gone", "10.0.0.9:1:2")],
        );

        assert_eq!(snap.known.len(), 1);
        assert!(!snap.known[0].connected());
        assert_eq!(snap.effective_address(&PeerUuid::new("gone")), None);
    }

    #[test]
    fn classification() {
        let snap = reconcile(
            self_info(),
            vec![record("a"), record("b")],
            vec![record("b"), record("c")],
            vec![row("c", "10.0.0.3:80:443")],
        );

        assert_eq!(snap.classify(&PeerUuid::new("a")), PeerClass::AvailableOnly);
        // Discovered and trusted: known wins over available-only.
        assert_eq!(
            snap.classify(&PeerUuid::new("b")),
            PeerClass::KnownUnaddressed
        );
        assert_eq!(snap.classify(&PeerUuid::new("c")), PeerClass::KnownAddressed);
        assert_eq!(snap.classify(&PeerUuid::new("z")), PeerClass::Unknown);
    }

    #[test]
    fn addresses_sorted_by_uuid() {
        let snap = reconcile(
            self_info(),
            vec![],
            vec![],
            vec![row("b", "h:1:2"), row("a", "h:3:4")],
        );
        let uuids: Vec<_> = snap.addresses.iter().map(|a| a.uuid.as_str()).collect();
        assert_eq!(uuids, ["a", "b"]);
    }
}
