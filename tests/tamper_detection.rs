// Copyright (c) 2025 VeilChain Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scenario 4 (spec §8): tampering with a stored node is detected, and
//! does not poison records already returned from earlier in the walk.
//!
//! `ServerStore` deliberately has no enumeration/read-back-by-plaintext
//! operation (the spec forbids anything that would let an observer learn
//! keyword identity), so these tests reach into the persistent `Server`'s
//! backing sled tree directly to simulate an on-path attacker corrupting a
//! row -- the same vantage point the threat model already grants the
//! honest-but-curious server.

use std::sync::Arc;

use veilchain::error::ChainStatus;
use veilchain::server::NodeRow;
use veilchain::{Client, Server};

fn only_key_in(tree: &sled::Tree) -> Vec<u8> {
    let mut iter = tree.iter();
    let (key, _) = iter.next().unwrap().unwrap();
    assert!(iter.next().is_none(), "expected exactly one row");
    key.to_vec()
}

fn corrupt_row(tree: &sled::Tree, key: &[u8]) {
    let value = tree.get(key).unwrap().unwrap();
    let mut row: NodeRow = bincode::deserialize(&value).unwrap();
    row.ciphertext[0] ^= 0xff;
    tree.insert(key, bincode::serialize(&row).unwrap()).unwrap();
    tree.flush().unwrap();
}

#[test]
fn flipped_ciphertext_byte_on_head_yields_chain_corrupt() {
    let server_dir = tempfile::tempdir().unwrap();
    let server = Arc::new(Server::open(server_dir.path()).unwrap());
    let client = Client::open(
        tempfile::tempdir().unwrap().path().join("state.bin"),
        Arc::clone(&server),
    )
    .unwrap();

    client.update(b"kw", [1u8; 16]).unwrap();

    let db = sled::open(server_dir.path()).unwrap();
    let tree = db.open_tree("nodes").unwrap();
    let head_key = only_key_in(&tree);
    corrupt_row(&tree, &head_key);
    drop(tree);
    drop(db);

    let (records, status) = client.search(b"kw").unwrap();
    assert_eq!(status, ChainStatus::Corrupt);
    assert!(records.is_empty(), "head was tampered, nothing is recoverable");
}

#[test]
fn tamper_on_tail_preserves_already_returned_head_record() {
    let server_dir = tempfile::tempdir().unwrap();
    let server = Arc::new(Server::open(server_dir.path()).unwrap());
    let client = Client::open(
        tempfile::tempdir().unwrap().path().join("state.bin"),
        Arc::clone(&server),
    )
    .unwrap();

    client.update(b"kw", [1u8; 16]).unwrap(); // becomes the tail

    let db = sled::open(server_dir.path()).unwrap();
    let tree = db.open_tree("nodes").unwrap();
    let tail_key = only_key_in(&tree);

    client.update(b"kw", [2u8; 16]).unwrap(); // becomes the new head

    corrupt_row(&tree, &tail_key);
    drop(tree);
    drop(db);

    let (records, status) = client.search(b"kw").unwrap();
    assert_eq!(status, ChainStatus::Corrupt);
    assert_eq!(records.len(), 1, "the head record, decrypted before the walk reached the tampered tail, is still returned");
    assert_eq!(records[0].doc_id, [2u8; 16]);
}

#[test]
fn missing_node_yields_chain_broken() {
    let server_dir = tempfile::tempdir().unwrap();
    let server = Arc::new(Server::open(server_dir.path()).unwrap());
    let client = Client::open(
        tempfile::tempdir().unwrap().path().join("state.bin"),
        Arc::clone(&server),
    )
    .unwrap();

    client.update(b"kw", [1u8; 16]).unwrap();

    let db = sled::open(server_dir.path()).unwrap();
    let tree = db.open_tree("nodes").unwrap();
    let head_key = only_key_in(&tree);
    tree.remove(&head_key).unwrap();
    tree.flush().unwrap();
    drop(tree);
    drop(db);

    let (records, status) = client.search(b"kw").unwrap();
    assert_eq!(status, ChainStatus::Broken);
    assert!(records.is_empty());
}
