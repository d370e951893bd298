//! Palisade Client - Peer Directory over the Management API
//!
//! Async client for a mesh node's peer membership and trust surface.
//! Fetches the four raw collections (self identity, available peers, known
//! peers, address overrides), reconciles them through `palisade-directory`,
//! and drives the admit / remove / rebind / unbind lifecycle with strict
//! read-after-write semantics.
//!
//! # Architecture
//!
//! - **Dto**: wire shapes and the success-or-envelope union
//! - **Http**: [`Authority`] -- typed handle over the nine endpoints
//! - **Store**: [`DirectoryStore`] -- concurrent loads, snapshot assembly
//! - **Mutate**: [`PeerDirectory`] -- validated mutations, reload on success
//!
//! # Example
//!
//! ```no_run
//! use palisade_client::{Authority, DirectoryStore, PeerDirectory, Session};
//! use palisade_directory::{Certificate, PeerUuid};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let authority = Authority::new("http://localhost:8080", Session::anonymous())?;
//!     let directory = PeerDirectory::new(DirectoryStore::new(authority));
//!
//!     let snapshot = directory
//!         .admit(&PeerUuid::new("p1"), &Certificate::new("Y2VydA=="))
//!         .await?;
//!     println!("known peers: {}", snapshot.known.len());
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod http;
pub mod mutate;
pub mod store;

pub use error::{Error, Result};
pub use http::{Authority, Session};
pub use mutate::PeerDirectory;
pub use store::DirectoryStore;
