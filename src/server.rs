// Copyright (c) 2025 VeilChain Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pure storage. The server never sees keys, keywords, or plaintext -- it
//! only ever stores and returns opaque rows keyed by address or file id.

use serde::{Deserialize, Serialize};

use crate::crypto::{MAC_LEN, NONCE_LEN};
use crate::error::ServerError;
use crate::node::DOC_ID_LEN;

/// A stored chain node row: a nonce and the AEAD ciphertext it was sealed
/// under. The address is the sled key, not part of the row itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeRow {
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

/// A stored file row: nonce pair, encrypted file bytes, and encrypted name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRow {
    pub nonce_file: [u8; NONCE_LEN],
    pub nonce_name: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
    pub enc_name: Vec<u8>,
}

/// The four operations an honest-but-curious server exposes. Implemented as
/// a trait so the chain-walking client can be driven either in-process
/// (as here) or through a networked binding without changing its logic.
pub trait ServerStore: Send + Sync {
    fn put_node(&self, address: [u8; MAC_LEN], row: NodeRow) -> Result<(), ServerError>;
    fn get_node(&self, address: &[u8; MAC_LEN]) -> Result<NodeRow, ServerError>;
    fn put_file(&self, file_id: [u8; DOC_ID_LEN], row: FileRow) -> Result<(), ServerError>;
    fn get_file(&self, file_id: &[u8; DOC_ID_LEN]) -> Result<FileRow, ServerError>;

    /// Diagnostic accessor: number of nodes currently stored. Not part of
    /// the cryptographic protocol; operational surface only.
    fn node_count(&self) -> usize;
    /// Diagnostic accessor: number of files currently stored.
    fn file_count(&self) -> usize;
}

/// Persistent server backed by an embedded ordered key-value store. Two
/// trees (`nodes`, `files`) give the two tables §6 of the spec names;
/// `sled` provides the point-lookup durability and atomic single-key writes
/// the spec requires without introducing a network dependency.
pub struct Server {
    nodes: sled::Tree,
    files: sled::Tree,
    db: sled::Db,
}

impl Server {
    /// Opens (or creates) the server's persistent store at `path`.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, ServerError> {
        let db = sled::open(path)?;
        let nodes = db.open_tree("nodes")?;
        let files = db.open_tree("files")?;
        Ok(Self { nodes, files, db })
    }

    /// Flushes both trees to durable storage. `put_node`/`put_file` already
    /// flush on every call per the spec's "writes MUST be committed before
    /// the server acknowledges them" rule; this is exposed for callers that
    /// want an explicit checkpoint (e.g. before reporting overall success).
    pub fn flush(&self) -> Result<(), ServerError> {
        self.nodes.flush()?;
        self.files.flush()?;
        Ok(())
    }
}

impl ServerStore for Server {
    fn put_node(&self, address: [u8; MAC_LEN], row: NodeRow) -> Result<(), ServerError> {
        if self.nodes.contains_key(address)? {
            tracing::warn!(address = %hex::encode(address), "put_node collision");
            return Err(ServerError::Collision(hex::encode(address)));
        }
        let encoded = bincode::serialize(&row)?;
        self.nodes.insert(address, encoded)?;
        self.nodes.flush()?;
        tracing::debug!(address = %hex::encode(address), "put_node");
        Ok(())
    }

    fn get_node(&self, address: &[u8; MAC_LEN]) -> Result<NodeRow, ServerError> {
        tracing::trace!(address = %hex::encode(address), "get_node");
        let bytes = self
            .nodes
            .get(address)?
            .ok_or_else(|| ServerError::NotFound(hex::encode(address)))?;
        Ok(bincode::deserialize(&bytes)?)
    }

    fn put_file(&self, file_id: [u8; DOC_ID_LEN], row: FileRow) -> Result<(), ServerError> {
        if self.files.contains_key(file_id)? {
            tracing::warn!(file_id = %hex::encode(file_id), "put_file collision");
            return Err(ServerError::Collision(hex::encode(file_id)));
        }
        let encoded = bincode::serialize(&row)?;
        self.files.insert(file_id, encoded)?;
        self.files.flush()?;
        tracing::debug!(file_id = %hex::encode(file_id), size = row.ciphertext.len(), "put_file");
        Ok(())
    }

    fn get_file(&self, file_id: &[u8; DOC_ID_LEN]) -> Result<FileRow, ServerError> {
        tracing::trace!(file_id = %hex::encode(file_id), "get_file");
        let bytes = self
            .files
            .get(file_id)?
            .ok_or_else(|| ServerError::NotFound(hex::encode(file_id)))?;
        Ok(bincode::deserialize(&bytes)?)
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.db.flush();
    }
}

/// In-memory test double satisfying the same [`ServerStore`] contract as
/// [`Server`]. Used instead of a mocking framework: tests that do not need
/// cross-restart persistence run against this cheaper implementation.
#[derive(Default)]
pub struct InMemoryServer {
    nodes: std::sync::Mutex<std::collections::HashMap<[u8; MAC_LEN], NodeRow>>,
    files: std::sync::Mutex<std::collections::HashMap<[u8; DOC_ID_LEN], FileRow>>,
}

impl InMemoryServer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ServerStore for InMemoryServer {
    fn put_node(&self, address: [u8; MAC_LEN], row: NodeRow) -> Result<(), ServerError> {
        let mut nodes = self.nodes.lock().unwrap();
        if nodes.contains_key(&address) {
            return Err(ServerError::Collision(hex::encode(address)));
        }
        nodes.insert(address, row);
        Ok(())
    }

    fn get_node(&self, address: &[u8; MAC_LEN]) -> Result<NodeRow, ServerError> {
        self.nodes
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| ServerError::NotFound(hex::encode(address)))
    }

    fn put_file(&self, file_id: [u8; DOC_ID_LEN], row: FileRow) -> Result<(), ServerError> {
        let mut files = self.files.lock().unwrap();
        if files.contains_key(&file_id) {
            return Err(ServerError::Collision(hex::encode(file_id)));
        }
        files.insert(file_id, row);
        Ok(())
    }

    fn get_file(&self, file_id: &[u8; DOC_ID_LEN]) -> Result<FileRow, ServerError> {
        self.files
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(|| ServerError::NotFound(hex::encode(file_id)))
    }

    fn node_count(&self) -> usize {
        self.nodes.lock().unwrap().len()
    }

    fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}
