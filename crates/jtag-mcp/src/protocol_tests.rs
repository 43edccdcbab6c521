// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn ok_response_omits_error_field() {
    let response = RpcResponse::ok(json!(1), json!({"tools": []}));
    let value = serde_json::to_value(&response).unwrap();
    assert!(value.get("error").is_none());
    assert_eq!(value["result"]["tools"], json!([]));
}

#[test]
fn err_response_omits_result_field() {
    let response = RpcResponse::err(json!(1), "boom");
    let value = serde_json::to_value(&response).unwrap();
    assert!(value.get("result").is_none());
    assert_eq!(value["error"]["message"], json!("boom"));
}
