// Copyright (c) 2025 VeilChain Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical plaintext encoding of one chain node.
//!
//! ```text
//! byte  0       : flag -- 0x00 if prev = NIL, 0x01 otherwise
//! bytes 1-16    : doc_id (or file_id; 16 bytes)
//! bytes 17-48   : file_key (32 bytes)
//! bytes 49-80   : prev_key (32 bytes; zeros if flag = 0x00)
//! bytes 81-112  : prev_addr (32 bytes; zeros if flag = 0x00)
//! ```
//!
//! Total plaintext size is fixed at 113 bytes. This layout is part of the
//! wire/storage contract, so it is hand-encoded to the exact offsets above
//! rather than left to a general-purpose serializer.

use crate::crypto::{KEY_LEN, MAC_LEN};

/// Length of a `doc_id` / `file_id`.
pub const DOC_ID_LEN: usize = 16;
/// Total size of the canonical plaintext node encoding.
pub const NODE_LEN: usize = 1 + DOC_ID_LEN + KEY_LEN + KEY_LEN + MAC_LEN;

const FLAG_OFFSET: usize = 0;
const DOC_ID_OFFSET: usize = 1;
const FILE_KEY_OFFSET: usize = DOC_ID_OFFSET + DOC_ID_LEN;
const PREV_KEY_OFFSET: usize = FILE_KEY_OFFSET + KEY_LEN;
const PREV_ADDR_OFFSET: usize = PREV_KEY_OFFSET + KEY_LEN;

/// A decoded chain link: the previous node's key and address, or the tail
/// sentinel (`NIL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Nil,
    Node {
        key: [u8; KEY_LEN],
        addr: [u8; MAC_LEN],
    },
}

impl Link {
    pub fn is_nil(&self) -> bool {
        matches!(self, Link::Nil)
    }
}

/// The decoded plaintext content of one chain node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub doc_id: [u8; DOC_ID_LEN],
    pub file_key: [u8; KEY_LEN],
    pub prev: Link,
}

impl Node {
    pub fn new(doc_id: [u8; DOC_ID_LEN], file_key: [u8; KEY_LEN], prev: Link) -> Self {
        Self { doc_id, file_key, prev }
    }

    /// Encodes this node to the canonical 113-byte layout.
    pub fn encode(&self) -> [u8; NODE_LEN] {
        let mut out = [0u8; NODE_LEN];
        out[DOC_ID_OFFSET..FILE_KEY_OFFSET].copy_from_slice(&self.doc_id);
        out[FILE_KEY_OFFSET..PREV_KEY_OFFSET].copy_from_slice(&self.file_key);

        match &self.prev {
            Link::Nil => {
                out[FLAG_OFFSET] = 0x00;
            }
            Link::Node { key, addr } => {
                out[FLAG_OFFSET] = 0x01;
                out[PREV_KEY_OFFSET..PREV_ADDR_OFFSET].copy_from_slice(key);
                out[PREV_ADDR_OFFSET..NODE_LEN].copy_from_slice(addr);
            }
        }
        out
    }

    /// Decodes a node from the canonical layout. Returns `None` if `bytes`
    /// is not exactly [`NODE_LEN`] long or the flag byte is invalid.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != NODE_LEN {
            return None;
        }

        let mut doc_id = [0u8; DOC_ID_LEN];
        doc_id.copy_from_slice(&bytes[DOC_ID_OFFSET..FILE_KEY_OFFSET]);

        let mut file_key = [0u8; KEY_LEN];
        file_key.copy_from_slice(&bytes[FILE_KEY_OFFSET..PREV_KEY_OFFSET]);

        let prev = match bytes[FLAG_OFFSET] {
            0x00 => Link::Nil,
            0x01 => {
                let mut key = [0u8; KEY_LEN];
                key.copy_from_slice(&bytes[PREV_KEY_OFFSET..PREV_ADDR_OFFSET]);
                let mut addr = [0u8; MAC_LEN];
                addr.copy_from_slice(&bytes[PREV_ADDR_OFFSET..NODE_LEN]);
                Link::Node { key, addr }
            }
            _ => return None,
        };

        Some(Node { doc_id, file_key, prev })
    }
}
