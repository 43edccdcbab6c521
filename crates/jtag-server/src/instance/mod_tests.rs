// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn ensure_created_makes_every_subdirectory() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = InstancePaths::resolve_under(tmp.path().to_path_buf(), "test-instance");
    paths.ensure_created().unwrap();

    assert!(paths.logs_dir().is_dir());
    assert!(paths.signals_dir().is_dir());
    assert!(paths.artifacts_dir().is_dir());
}

#[test]
fn schema_catalog_lives_at_state_root() {
    let paths = InstancePaths::resolve_under(PathBuf::from("/tmp/jtag-test"), "default");
    assert_eq!(
        paths.schema_catalog_path(),
        PathBuf::from("/tmp/jtag-test/default/generated-command-schemas.json")
    );
}
