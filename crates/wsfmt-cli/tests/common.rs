#![allow(dead_code)]

use std::{fs, path::Path};

use assert_cmd::assert::Assert;
use serde_json::Value;
use tempfile::TempDir;

pub const EDITORCONFIG: &str = "root = true\n\n[*.cs]\nend_of_line = lf\ninsert_final_newline = true\ntrim_trailing_whitespace = true\n";

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

/// Writes `files` (relative path, contents) under a fresh temporary directory.
pub fn fixture(prefix: &str, files: &[(&str, &str)]) -> TempDir {
    let temp = tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("tempdir");
    for (rel, contents) in files {
        write_file(temp.path(), rel, contents);
    }
    temp
}

pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dirs");
    }
    fs::write(path, contents).expect("write fixture file");
}

pub fn read_file(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).expect("read fixture file")
}
