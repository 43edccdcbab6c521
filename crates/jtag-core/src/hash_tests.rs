// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn identical_inputs_hash_identically() {
    let a = content_hash("files/read", &json!({"path": "a.txt"}), "peer-1");
    let b = content_hash("files/read", &json!({"path": "a.txt"}), "peer-1");
    assert_eq!(a, b);
}

#[test]
fn different_payload_hashes_differently() {
    let a = content_hash("files/read", &json!({"path": "a.txt"}), "peer-1");
    let b = content_hash("files/read", &json!({"path": "b.txt"}), "peer-1");
    assert_ne!(a, b);
}

#[test]
fn different_origin_hashes_differently() {
    let a = content_hash("files/read", &json!({"path": "a.txt"}), "peer-1");
    let b = content_hash("files/read", &json!({"path": "a.txt"}), "peer-2");
    assert_ne!(a, b);
}

#[test]
fn key_order_does_not_affect_hash() {
    let a = content_hash("files/read", &json!({"a": 1, "b": 2}), "peer-1");
    let b = content_hash("files/read", &json!({"b": 2, "a": 1}), "peer-1");
    assert_eq!(a, b);
}
