//! HTTP transport to the peer management authority.
//!
//! [`Authority`] is a typed handle over the nine management endpoints.
//! Credentials travel in an explicit [`Session`] passed at construction --
//! there is no process-global token state, so the core stays side-effect
//! free and testable in isolation.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::dto::{ApiResponse, KnownPeerPutTo, NoContent, PeerAddressTo, PeerInfoTo, SelfInfoTo};
use crate::error::{Error, Result};

/// Every remote call is bounded; an unreachable authority surfaces as an
/// error, never a hang.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Caller credentials for authority requests.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// Session without credentials.
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    /// Session carrying a bearer token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Typed handle over the remote peer management API.
#[derive(Debug, Clone)]
pub struct Authority {
    base_url: String,
    session: Session,
    client: reqwest::Client,
}

impl Authority {
    /// Build a handle for the authority at `base_url`.
    pub fn new(base_url: impl Into<String>, session: Session) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            client,
        })
    }

    /// `GET /peer-info/self`
    pub async fn self_info(&self) -> Result<SelfInfoTo> {
        self.get_json("/peer-info/self").await
    }

    /// `GET /peers-manage/available-peers`
    pub async fn available_peers(&self) -> Result<Vec<PeerInfoTo>> {
        self.get_json("/peers-manage/available-peers").await
    }

    /// `GET /peers-manage/known-peers`
    pub async fn known_peers(&self) -> Result<Vec<PeerInfoTo>> {
        self.get_json("/peers-manage/known-peers").await
    }

    /// `PUT /peers-manage/known-peers/{uuid}`
    pub async fn put_known_peer(&self, uuid: &str, cert: &str) -> Result<()> {
        let body = KnownPeerPutTo {
            cert: cert.to_string(),
        };
        self.put_json(&format!("/peers-manage/known-peers/{uuid}"), &body)
            .await
    }

    /// `DELETE /peers-manage/known-peers/{uuid}`
    pub async fn delete_known_peer(&self, uuid: &str) -> Result<()> {
        self.delete(&format!("/peers-manage/known-peers/{uuid}"))
            .await
    }

    /// `GET /peers-addr-manage`
    pub async fn peer_addresses(&self) -> Result<Vec<PeerAddressTo>> {
        self.get_json("/peers-addr-manage").await
    }

    /// `GET /peers-addr-manage/{uuid}`
    pub async fn peer_address(&self, uuid: &str) -> Result<PeerAddressTo> {
        self.get_json(&format!("/peers-addr-manage/{uuid}")).await
    }

    /// `PUT /peers-addr-manage/{uuid}` -- body is the raw address string.
    pub async fn put_peer_address(&self, uuid: &str, address: &str) -> Result<()> {
        let request = self
            .request(reqwest::Method::PUT, &format!("/peers-addr-manage/{uuid}"))
            .body(address.to_string());
        let response = request.send().await?;
        decode_no_content(response).await
    }

    /// `DELETE /peers-addr-manage/{uuid}`
    pub async fn delete_peer_address(&self, uuid: &str) -> Result<()> {
        self.delete(&format!("/peers-addr-manage/{uuid}")).await
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = self.session.bearer() {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        decode(response).await
    }

    async fn put_json<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let response = self
            .request(reqwest::Method::PUT, path)
            .json(body)
            .send()
            .await?;
        decode_no_content(response).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let response = self.request(reqwest::Method::DELETE, path).send().await?;
        decode_no_content(response).await
    }
}

/// Decode a typed payload, distinguishing the error envelope from a body
/// that matches neither shape.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    let parsed: ApiResponse<T> =
        serde_json::from_str(&body).map_err(|err| Error::MalformedResponse {
            detail: format!("status {status}: {err}"),
        })?;
    parsed.into_result().map_err(|envelope| Error::Application {
        messages: envelope.errors,
        code: envelope.code,
    })
}

/// Mutations answer with an empty body on success, or the envelope.
async fn decode_no_content(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(());
    }
    let parsed: ApiResponse<NoContent> =
        serde_json::from_str(&body).map_err(|err| Error::MalformedResponse {
            detail: format!("status {status}: {err}"),
        })?;
    parsed
        .into_result()
        .map(|_| ())
        .map_err(|envelope| Error::Application {
            messages: envelope.errors,
            code: envelope.code,
        })
}
