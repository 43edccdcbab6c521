use super::*;

#[test]
fn parses_endpoint_with_no_params() {
    let raw = vec!["system/status".to_string()];
    let (endpoint, params) = parse_invoke_args(&raw).unwrap();
    assert_eq!(endpoint, "system/status");
    assert_eq!(params, serde_json::json!({}));
}

#[test]
fn parses_string_and_json_params() {
    let raw = vec![
        "files/read".to_string(),
        "--param=path=README.md".to_string(),
        "--param=count=3".to_string(),
    ];
    let (endpoint, params) = parse_invoke_args(&raw).unwrap();
    assert_eq!(endpoint, "files/read");
    assert_eq!(params, serde_json::json!({"path": "README.md", "count": 3}));
}

#[test]
fn rejects_missing_endpoint() {
    let raw: Vec<String> = vec![];
    assert!(parse_invoke_args(&raw).is_err());
}

#[test]
fn rejects_malformed_param() {
    let raw = vec!["files/read".to_string(), "--param=noequals".to_string()];
    assert!(parse_invoke_args(&raw).is_err());
}
