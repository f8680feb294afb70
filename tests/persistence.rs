// Copyright (c) 2025 VeilChain Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scenario 5 (spec §8): client and server both recover from durable
//! state after a full restart.

use std::sync::Arc;

use veilchain::{Client, Server};

#[test]
fn search_survives_client_and_server_restart() {
    let server_dir = tempfile::tempdir().unwrap();
    let state_dir = tempfile::tempdir().unwrap();
    let state_path = state_dir.path().join("state.bin");

    {
        let server = Arc::new(Server::open(server_dir.path()).unwrap());
        let client = Client::open(&state_path, server).unwrap();
        client.update(b"K", [b'd'; 16]).unwrap();
    } // client and server both dropped here, simulating a full process exit

    let server = Arc::new(Server::open(server_dir.path()).unwrap());
    let client = Client::open(&state_path, server).unwrap();
    let (records, status) = client.search(b"K").unwrap();

    assert_eq!(status, veilchain::ChainStatus::Intact);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].doc_id, [b'd'; 16]);
}

#[test]
fn head_table_round_trips_through_multiple_keywords_and_restarts() {
    let server_dir = tempfile::tempdir().unwrap();
    let state_dir = tempfile::tempdir().unwrap();
    let state_path = state_dir.path().join("state.bin");

    {
        let server = Arc::new(Server::open(server_dir.path()).unwrap());
        let client = Client::open(&state_path, server).unwrap();
        client.update(b"alpha", [1u8; 16]).unwrap();
        client.update(b"beta", [2u8; 16]).unwrap();
        client.update(b"alpha", [3u8; 16]).unwrap();
    }

    let server = Arc::new(Server::open(server_dir.path()).unwrap());
    let client = Client::open(&state_path, server).unwrap();

    let (alpha, _) = client.search(b"alpha").unwrap();
    assert_eq!(alpha.len(), 2);
    assert_eq!(alpha[0].doc_id, [3u8; 16]);
    assert_eq!(alpha[1].doc_id, [1u8; 16]);

    let (beta, _) = client.search(b"beta").unwrap();
    assert_eq!(beta.len(), 1);
    assert_eq!(beta[0].doc_id, [2u8; 16]);
}

#[test]
fn missing_state_file_is_treated_as_a_fresh_client() {
    let server = Arc::new(Server::open(tempfile::tempdir().unwrap().path()).unwrap());
    let state_path = tempfile::tempdir().unwrap().path().join("nested/state.bin");
    let client = Client::open(&state_path, server).unwrap();

    let (records, _) = client.search(b"anything").unwrap();
    assert!(records.is_empty());
}
