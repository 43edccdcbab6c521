// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::Value;

/// Parses the raw `["endpoint", "--param=key=value", ...]` tail clap hands
/// back for an unrecognized (external) subcommand into the endpoint string
/// and a params object. A value that parses as JSON is sent as JSON;
/// anything else goes through as a plain string.
pub fn parse_invoke_args(raw: &[String]) -> anyhow::Result<(String, Value)> {
    let (endpoint, rest) = raw.split_first().ok_or_else(|| anyhow::anyhow!("missing endpoint"))?;

    let mut params = serde_json::Map::new();
    for arg in rest {
        let pair = arg.strip_prefix("--param=").ok_or_else(|| anyhow::anyhow!("unrecognized argument: {arg}"))?;
        let (key, value) = pair.split_once('=').ok_or_else(|| anyhow::anyhow!("malformed --param (expected key=value): {pair}"))?;
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        params.insert(key.to_string(), value);
    }

    Ok((endpoint.clone(), Value::Object(params)))
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;
