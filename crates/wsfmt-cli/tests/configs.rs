use assert_cmd::cargo::cargo_bin_cmd;

mod common;

use common::{fixture, parse_json, EDITORCONFIG};

#[test]
fn configs_resolves_options_for_a_file() {
    let temp = fixture(
        "wsfmt-configs",
        &[(".editorconfig", EDITORCONFIG), ("src/A.cs", "class A {}\n")],
    );
    let assert = cargo_bin_cmd!("wsfmt")
        .current_dir(temp.path())
        .args(["--json", "configs", "src/A.cs"])
        .assert()
        .success();

    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["details"]["covered"], true);
    let configs = payload["details"]["configs"].as_array().expect("configs");
    assert!(configs
        .iter()
        .any(|c| c.as_str().is_some_and(|p| p.ends_with(".editorconfig"))));
    assert_eq!(payload["details"]["options"]["end_of_line"], "lf");
    assert_eq!(payload["details"]["options"]["insert_final_newline"], "true");
}

#[test]
fn configs_reports_uncovered_files() {
    let temp = fixture(
        "wsfmt-configs-uncovered",
        &[(".editorconfig", EDITORCONFIG), ("Module.vb", "Module M\nEnd Module\n")],
    );
    let assert = cargo_bin_cmd!("wsfmt")
        .current_dir(temp.path())
        .args(["--json", "configs", "Module.vb"])
        .assert()
        .success();

    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["covered"], false);
    assert!(payload["details"]["options"].is_null());
}

#[test]
fn configs_human_output_lists_paths() {
    let temp = fixture("wsfmt-configs-human", &[(".editorconfig", EDITORCONFIG)]);
    let assert = cargo_bin_cmd!("wsfmt")
        .current_dir(temp.path())
        .args(["--no-color", "configs"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("wsfmt configs: found"), "{stdout}");
    assert!(stdout.contains(".editorconfig"), "{stdout}");
}
