// Copyright (c) 2025 VeilChain Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The client owns every secret: the per-keyword head pointers and, at
//! upload time, the per-file keys it hands to the index. It is the only
//! component that ever sees a keyword in the clear.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::crypto::{self, KEY_LEN, MAC_LEN, NONCE_LEN};
use crate::error::{ChainStatus, ClientError};
use crate::node::{Link, Node, DOC_ID_LEN, NODE_LEN};
use crate::server::{FileRow, NodeRow, ServerStore};

/// A single decrypted chain record, as returned by [`Client::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRecord {
    pub doc_id: [u8; DOC_ID_LEN],
    pub file_key: [u8; KEY_LEN],
}

/// The head pointer for one keyword's chain, or its absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Head {
    key: [u8; KEY_LEN],
    addr: [u8; MAC_LEN],
}

/// On-disk representation of one keyword's head entry. `keyword` is stored
/// verbatim (not hashed) since this file never leaves the client; fields
/// that must round-trip byte-for-byte are kept as raw `Vec<u8>`/arrays
/// rather than text encodings, matching how this lineage persists binary
/// state elsewhere (length-prefixed/binary, not textual framing).
#[derive(Debug, Serialize, Deserialize)]
struct HeadEntry {
    keyword: Vec<u8>,
    head_key: [u8; KEY_LEN],
    head_addr: [u8; MAC_LEN],
}

/// A DSSE client: per-keyword head pointers plus the server handle they
/// index into. `heads` is the client's entire secret state.
pub struct Client<S: ServerStore> {
    server: Arc<S>,
    state_path: PathBuf,
    heads: Mutex<HashMap<Vec<u8>, Head>>,
}

impl<S: ServerStore> Client<S> {
    /// Opens a client against `state_path`, loading any existing head table.
    /// A missing file is treated as an empty client (first run); any other
    /// read/parse failure is a fatal [`ClientError::State`].
    pub fn open(state_path: impl Into<PathBuf>, server: Arc<S>) -> Result<Self, ClientError> {
        let state_path = state_path.into();
        let heads = match std::fs::read(&state_path) {
            Ok(bytes) => Self::decode_state(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(ClientError::Io(e)),
        };
        Ok(Self {
            server,
            state_path,
            heads: Mutex::new(heads),
        })
    }

    fn decode_state(bytes: &[u8]) -> Result<HashMap<Vec<u8>, Head>, ClientError> {
        let entries: Vec<HeadEntry> = bincode::deserialize(bytes)
            .map_err(|e| ClientError::State(format!("malformed head table: {e}")))?;
        Ok(entries
            .into_iter()
            .map(|e| {
                (
                    e.keyword,
                    Head {
                        key: e.head_key,
                        addr: e.head_addr,
                    },
                )
            })
            .collect())
    }

    /// Atomically persists the head table: write to a temp file in the same
    /// directory, then rename over the real path, so a crash never leaves a
    /// torn file.
    fn flush_locked(&self, heads: &HashMap<Vec<u8>, Head>) -> Result<(), ClientError> {
        let entries: Vec<HeadEntry> = heads
            .iter()
            .map(|(keyword, head)| HeadEntry {
                keyword: keyword.clone(),
                head_key: head.key,
                head_addr: head.addr,
            })
            .collect();
        let bytes = bincode::serialize(&entries)
            .map_err(|e| ClientError::State(format!("failed to encode head table: {e}")))?;

        let dir = self.state_path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp_path = self.state_path.clone();
        tmp_path.set_extension("tmp");
        std::fs::create_dir_all(dir)?;
        std::fs::write(&tmp_path, &bytes)?;
        std::fs::rename(&tmp_path, &self.state_path)?;
        Ok(())
    }

    /// Appends a plain index entry (no associated file) for `keyword`.
    /// Equivalent to `upload_file` with a zeroed file key.
    pub fn update(&self, keyword: &[u8], doc_id: [u8; DOC_ID_LEN]) -> Result<(), ClientError> {
        self.update_with_file_key(keyword, doc_id, [0u8; KEY_LEN])
    }

    fn update_with_file_key(
        &self,
        keyword: &[u8],
        doc_id: [u8; DOC_ID_LEN],
        file_key: [u8; KEY_LEN],
    ) -> Result<(), ClientError> {
        // Critical section: steps 3-7 of the update algorithm must be
        // serialized per client so head rotation is linearizable.
        let mut heads = self.heads.lock().unwrap();

        let node_key: [u8; KEY_LEN] = crypto::random_array()?;
        let nonce: [u8; NONCE_LEN] = crypto::random_array()?;
        let new_addr = crypto::derive_address(&node_key);

        let prev = match heads.get(keyword) {
            Some(h) => Link::Node { key: h.key, addr: h.addr },
            None => Link::Nil,
        };

        let plaintext = Node::new(doc_id, file_key, prev).encode();
        let ciphertext = crypto::aead_seal(&node_key, &nonce, &plaintext, &new_addr)?;

        self.server.put_node(
            new_addr,
            NodeRow {
                nonce,
                ciphertext,
            },
        )?;
        tracing::debug!(address = %hex::encode(new_addr), "update appended node");

        // Only after the server has acknowledged the write do we rotate the
        // head and flush -- a crash before this point leaves an orphan node
        // on the server (harmless) but never a branched or inconsistent
        // chain.
        heads.insert(
            keyword.to_vec(),
            Head {
                key: node_key,
                addr: new_addr,
            },
        );
        self.flush_locked(&heads)?;
        Ok(())
    }

    /// Walks `keyword`'s chain from the head to the tail, returning every
    /// record in newest-first order along with whether the walk completed.
    /// An absent keyword returns an empty list and [`ChainStatus::Intact`].
    pub fn search(
        &self,
        keyword: &[u8],
    ) -> Result<(Vec<SearchRecord>, ChainStatus), ClientError> {
        let head = {
            let heads = self.heads.lock().unwrap();
            match heads.get(keyword) {
                Some(h) => *h,
                None => return Ok((Vec::new(), ChainStatus::Intact)),
            }
        };

        let mut records = Vec::new();
        let mut cursor = Link::Node { key: head.key, addr: head.addr };

        loop {
            let (key, addr) = match cursor {
                Link::Nil => break,
                Link::Node { key, addr } => (key, addr),
            };

            let row = match self.server.get_node(&addr) {
                Ok(row) => row,
                Err(_) => {
                    tracing::warn!(address = %hex::encode(addr), "chain broken: node missing");
                    return Ok((records, ChainStatus::Broken));
                }
            };

            let plaintext = match crypto::aead_open(&key, &row.nonce, &row.ciphertext, &addr) {
                Ok(pt) => pt,
                Err(_) => {
                    tracing::warn!(address = %hex::encode(addr), "chain corrupt: auth failed");
                    return Ok((records, ChainStatus::Corrupt));
                }
            };

            let node = Node::decode(&plaintext)
                .ok_or_else(|| ClientError::Codec(format!("expected {NODE_LEN} bytes")))?;

            records.push(SearchRecord {
                doc_id: node.doc_id,
                file_key: node.file_key,
            });
            cursor = node.prev;
        }

        Ok((records, ChainStatus::Intact))
    }

    /// Encrypts `file_bytes`/`file_name` under a fresh random key, stores
    /// the ciphertext on the server under a fresh random file id, and
    /// indexes that file id under `keyword` with the file key embedded in
    /// the chain node. Returns the file id (the new `doc_id`).
    pub fn upload_file(
        &self,
        keyword: &[u8],
        file_bytes: &[u8],
        file_name: &str,
    ) -> Result<[u8; DOC_ID_LEN], ClientError> {
        let file_key: [u8; KEY_LEN] = crypto::random_array()?;
        let file_id_bytes: [u8; DOC_ID_LEN] = crypto::random_array()?;
        let nonce_file: [u8; NONCE_LEN] = crypto::random_array()?;
        let nonce_name: [u8; NONCE_LEN] = crypto::random_array()?;

        let ciphertext = crypto::aead_seal(&file_key, &nonce_file, file_bytes, &file_id_bytes)?;

        let mut name_aad = file_id_bytes.to_vec();
        name_aad.extend_from_slice(b"name");
        let enc_name = crypto::aead_seal(&file_key, &nonce_name, file_name.as_bytes(), &name_aad)?;

        self.server.put_file(
            file_id_bytes,
            FileRow {
                nonce_file,
                nonce_name,
                ciphertext,
                enc_name,
            },
        )?;
        tracing::debug!(file_id = %hex::encode(file_id_bytes), size = file_bytes.len(), "upload_file stored ciphertext");

        self.update_with_file_key(keyword, file_id_bytes, file_key)?;
        Ok(file_id_bytes)
    }

    /// Looks up a file record by id and opens both its ciphertext and
    /// encrypted name under `file_key` (normally obtained from a prior
    /// [`Client::search`]). Returns `(file_name, file_bytes)`.
    pub fn retrieve_file(
        &self,
        file_id: &[u8; DOC_ID_LEN],
        file_key: &[u8; KEY_LEN],
    ) -> Result<(String, Vec<u8>), ClientError> {
        let row = self.server.get_file(file_id)?;

        let file_bytes = crypto::aead_open(file_key, &row.nonce_file, &row.ciphertext, file_id)?;

        let mut name_aad = file_id.to_vec();
        name_aad.extend_from_slice(b"name");
        let name_bytes = crypto::aead_open(file_key, &row.nonce_name, &row.enc_name, &name_aad)?;
        let file_name = String::from_utf8(name_bytes)
            .map_err(|e| ClientError::Codec(format!("file name is not valid UTF-8: {e}")))?;

        Ok((file_name, file_bytes))
    }
}
