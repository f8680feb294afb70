// Copyright (c) 2025 VeilChain Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unified error hierarchy for the VeilChain workspace.

use thiserror::Error;

/// Errors from [`crate::crypto`] primitives.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("entropy source unavailable: {0}")]
    Entropy(String),

    #[error("AEAD seal failed: {0}")]
    SealFailed(String),

    /// AEAD verify-and-decrypt failed. Callers MUST NOT use the accompanying
    /// plaintext buffer; implementations never populate it on this path.
    #[error("AEAD authentication failed")]
    AuthFailed,
}

/// Errors from the [`crate::server`] storage layer.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("no row for address {0}")]
    NotFound(String),

    /// A `put_node`/`put_file` targeted an address or file id that already
    /// exists. This indicates a randomness failure upstream, not a benign
    /// race, and callers must not retry under the same key.
    #[error("collision at address {0}: a row already exists")]
    Collision(String),

    #[error("storage backend error: {0}")]
    Io(#[from] sled::Error),

    #[error("row encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

/// Errors from the [`crate::client`] orchestration layer.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("local client state is unreadable or malformed: {0}")]
    State(String),

    #[error("malformed chain node: {0}")]
    Codec(String),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of walking a keyword's chain to the end.
///
/// `search` returns `Ok` with whatever records were recovered before a break,
/// paired with a [`ChainStatus`] describing whether the walk ran to
/// completion (`Intact`) or was cut short. A cut-short walk is not itself a
/// hard error: records returned before the break point remain valid per the
/// spec's "previously returned records are still valid" rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStatus {
    /// The walk reached `NIL` with every link intact.
    Intact,
    /// A `get_node` lookup for the next link returned [`ServerError::NotFound`].
    Broken,
    /// An `aead_open` on the next link failed authentication.
    Corrupt,
}
