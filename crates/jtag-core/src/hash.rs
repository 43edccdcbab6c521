// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use sha2::{Digest, Sha256};

/// Content hash used for dedup: stable across retransmission of the exact
/// same logical message, sensitive to anything that would make it a
/// different message.
///
/// Uses SHA-256 rather than a weaker illustrative hash (see DESIGN.md Open
/// Question 1): the hash is never exposed to an adversary, it only keys an
/// in-process dedup set, so the choice is about an already-idiomatic
/// dependency, not collision resistance.
pub fn content_hash(endpoint: &str, payload: &serde_json::Value, origin_unique_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(endpoint.as_bytes());
    hasher.update(b"\0");
    hasher.update(origin_unique_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(canonical_json(payload).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A deterministic JSON rendering: object keys sorted, no extra whitespace.
/// `serde_json::Value`'s default map is a `BTreeMap` when the `preserve_order`
/// feature is off, so `to_string` is already key-sorted; this function
/// exists to make that guarantee explicit at the call site.
fn canonical_json(value: &serde_json::Value) -> String {
    value.to_string()
}

#[cfg(test)]
#[path = "hash_tests.rs"]
mod tests;
