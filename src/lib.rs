// Copyright (c) 2025 VeilChain Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # VeilChain
//!
//! A forward-private dynamic searchable symmetric encryption (DSSE) core:
//! a client/server protocol that lets a client outsource an encrypted
//! inverted index plus ciphertext file blobs to an untrusted but
//! honest-but-curious server, and later search that index by keyword
//! without revealing the keyword, file contents, or the link between
//! successive updates under the same keyword.
//!
//! ## Architecture
//!
//! - [`crypto`] -- stateless AEAD seal/open, HMAC-based address derivation,
//!   and secure random bytes.
//! - [`node`] -- the canonical plaintext encoding of one chain node.
//! - [`server`] -- pure storage: a persistent [`server::Server`] backed by
//!   an embedded key-value store, plus an [`server::InMemoryServer`] test
//!   double. Both implement [`server::ServerStore`].
//! - [`client`] -- [`client::Client`], which owns the per-keyword head
//!   pointers and performs `update`/`search`/`upload_file`/`retrieve_file`.
//!
//! ## Quick start
//!
//! ```
//! use std::sync::Arc;
//! use veilchain::client::Client;
//! use veilchain::server::InMemoryServer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let server = Arc::new(InMemoryServer::new());
//! let client = Client::open(dir.path().join("state.bin"), server)?;
//!
//! client.update(b"ProjectX", [1u8; 16])?;
//! client.update(b"ProjectX", [2u8; 16])?;
//!
//! let (records, _status) = client.search(b"ProjectX")?;
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].doc_id, [2u8; 16]); // newest first
//! # Ok(())
//! # }
//! ```
//!
//! ## Forward privacy
//!
//! Every chain node's symmetric key is a fresh uniform random sample, never
//! derived from the keyword, the document, or any prior key. The server's
//! address for that node is `HMAC-SHA256(node_key, "address")`. Because
//! the server never learns `node_key` until the client presents it (by
//! requesting that exact address), an adversary who has observed every
//! prior search token cannot link a future update to the keyword it
//! concerns -- there is nothing keyword-derived anywhere in what the
//! server sees.
//!
//! Backward privacy is explicitly out of scope: deletion is not
//! implemented, and this is a deliberate design choice, not an oversight.

pub mod client;
pub mod crypto;
pub mod error;
pub mod node;
pub mod server;

pub use client::{Client, SearchRecord};
pub use error::{ChainStatus, ClientError, CryptoError, ServerError};
pub use server::{InMemoryServer, Server, ServerStore};
