//! Wire DTOs for the peer management authority.
//!
//! Every response body is one of: the typed success payload, or the error
//! envelope `{errors: [..], code: n}`. Decoding trial-parses the envelope
//! first (see [`ApiResponse`]); a body matching neither shape is a hard
//! failure at the transport layer, never a guess.

use palisade_directory::{AddressRow, Certificate, PeerRecord, PeerUuid, SelfInfo};
use serde::{Deserialize, Serialize};

/// Error envelope the authority answers with on application-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Human-readable messages, one per finding.
    pub errors: Vec<String>,
    /// Numeric application code.
    pub code: i64,
}

/// Success-or-envelope union for one response body.
///
/// Untagged: serde tries the variants in order, so the envelope is checked
/// before the payload. That matters because serde ignores unknown fields --
/// an envelope body would otherwise satisfy permissive payload shapes like
/// [`NoContent`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Failure(ErrorEnvelope),
    Success(T),
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> Result<T, ErrorEnvelope> {
        match self {
            ApiResponse::Success(payload) => Ok(payload),
            ApiResponse::Failure(envelope) => Err(envelope),
        }
    }
}

/// Empty-object success payload for mutations.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NoContent {}

/// `GET /peer-info/self` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfInfoTo {
    pub self_uuid: String,
    pub cert: String,
}

impl From<SelfInfoTo> for SelfInfo {
    fn from(to: SelfInfoTo) -> Self {
        SelfInfo {
            uuid: PeerUuid::new(to.self_uuid),
            cert: Certificate::new(to.cert),
        }
    }
}

/// Item of the available-peers and known-peers listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerInfoTo {
    pub uuid: String,
    pub cert: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_address: Option<String>,
}

impl From<PeerInfoTo> for PeerRecord {
    fn from(to: PeerInfoTo) -> Self {
        PeerRecord {
            uuid: PeerUuid::new(to.uuid),
            cert: Certificate::new(to.cert),
            known_address: to.known_address,
        }
    }
}

/// Item of the address override listing, and the single-lookup payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerAddressTo {
    pub uuid: String,
    pub address: String,
}

impl From<PeerAddressTo> for AddressRow {
    fn from(to: PeerAddressTo) -> Self {
        AddressRow {
            uuid: PeerUuid::new(to.uuid),
            address: to.address,
        }
    }
}

/// `PUT /peers-manage/known-peers/{uuid}` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct KnownPeerPutTo {
    pub cert: String,
}
