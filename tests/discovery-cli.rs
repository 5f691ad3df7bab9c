use std::ffi::OsStr;
use std::path::Path;

use assert_cmd::{assert::Assert, Command};
use predicates::prelude::*;
use serde_json::Value;

mod stubs;

use stubs::payloads;

const DEVICE: &str = "GAT-123";
const FAMILY: &str = "bacnet";

fn cmd_assert<I, S>(data_dir: &Path, args: I) -> Assert
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::cargo_bin("udmi-coord").unwrap();
    cmd.env("UDMI_DATA_DIR", data_dir).args(args).assert()
}

fn phase_of(assert: Assert) -> String {
    let output = assert.success().get_output().stdout.clone();
    let state: Value = serde_json::from_slice(&output).unwrap();
    state["phase"].as_str().unwrap().to_string()
}

#[test]
fn bacnet_scan_runs_to_completion() {
    let tempdir = tempfile::tempdir().unwrap();
    let dir = tempdir.path();

    let assert = cmd_assert(dir, ["configure", DEVICE, FAMILY, payloads::BACNET_CONFIG]);
    assert_eq!(phase_of(assert), "pending");

    let assert = cmd_assert(dir, ["start", DEVICE, FAMILY]);
    assert_eq!(phase_of(assert), "active");

    let assert = cmd_assert(dir, ["tick", DEVICE, FAMILY, payloads::GENERATION_2, "30"]);
    assert_eq!(phase_of(assert), "active");

    let assert = cmd_assert(dir, ["tick", DEVICE, FAMILY, payloads::GENERATION_2, "60"]);
    assert_eq!(phase_of(assert), "done");

    cmd_assert(dir, ["state", DEVICE])
        .success()
        .stdout(predicate::str::contains(r#""bacnet":{"#))
        .stdout(predicate::str::contains(r#""phase":"done""#));
}

#[test]
fn second_start_is_rejected() {
    let tempdir = tempfile::tempdir().unwrap();
    let dir = tempdir.path();

    cmd_assert(dir, ["configure", DEVICE, FAMILY, payloads::BACNET_CONFIG]).success();
    cmd_assert(dir, ["start", DEVICE, FAMILY]).success();
    cmd_assert(dir, ["start", DEVICE, FAMILY])
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("invalid-transition"));

    cmd_assert(dir, ["state", DEVICE])
        .success()
        .stdout(predicate::str::contains(r#""phase":"active""#));
}

#[test]
fn stale_tick_and_config_are_ignored() {
    let tempdir = tempfile::tempdir().unwrap();
    let dir = tempdir.path();

    cmd_assert(dir, ["configure", DEVICE, FAMILY, payloads::BACNET_CONFIG]).success();
    cmd_assert(dir, ["start", DEVICE, FAMILY]).success();

    let assert = cmd_assert(dir, ["tick", DEVICE, FAMILY, payloads::GENERATION_1, "600"]);
    assert_eq!(phase_of(assert), "active");

    let assert = cmd_assert(dir, ["configure", DEVICE, FAMILY, payloads::OLD_BACNET_CONFIG]);
    assert_eq!(phase_of(assert), "active");
}

#[test]
fn duration_longer_than_interval_is_rejected() {
    let tempdir = tempfile::tempdir().unwrap();
    cmd_assert(tempdir.path(), ["configure", DEVICE, FAMILY, payloads::INVALID_DURATION_CONFIG])
        .failure()
        .stderr(predicate::str::contains("invalid-duration"));
}

#[test]
fn out_of_range_passive_is_rejected() {
    let tempdir = tempfile::tempdir().unwrap();
    cmd_assert(tempdir.path(), ["configure", DEVICE, "ipv4", payloads::HUGE_PASSIVE_CONFIG])
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("invalid-passive"));
}

#[test]
fn unconfigured_family_cannot_start() {
    let tempdir = tempfile::tempdir().unwrap();
    cmd_assert(tempdir.path(), ["start", DEVICE, "ipv4"])
        .failure()
        .stderr(predicate::str::contains("has not been configured"));
}

#[test]
fn config_read_from_file() {
    let tempdir = tempfile::tempdir().unwrap();
    let config_path = tempdir.path().join("bacnet.json");
    std::fs::write(&config_path, payloads::BACNET_CONFIG).unwrap();

    let arg = format!("@{}", config_path.display());
    let assert = cmd_assert(tempdir.path(), ["configure", DEVICE, FAMILY, arg.as_str()]);
    assert_eq!(phase_of(assert), "pending");
}

#[test]
fn scheduled_generation_supersedes_configured() {
    let tempdir = tempfile::tempdir().unwrap();
    let dir = tempdir.path();

    cmd_assert(dir, ["configure", DEVICE, FAMILY, payloads::BACNET_CONFIG]).success();
    cmd_assert(dir, ["start", DEVICE, FAMILY]).success();

    let output = cmd_assert(dir, ["configure", "--schedule", DEVICE, FAMILY, payloads::BACNET_CONFIG])
        .success()
        .get_output()
        .stdout
        .clone();
    let state: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(state["phase"], "pending");
    assert_ne!(state["generation"], payloads::GENERATION_2);
}

#[test]
fn results_are_recorded_and_resolved() {
    let tempdir = tempfile::tempdir().unwrap();
    let dir = tempdir.path();

    cmd_assert(dir, ["configure", DEVICE, FAMILY, payloads::BACNET_CONFIG]).success();
    cmd_assert(dir, ["start", DEVICE, FAMILY]).success();
    let output = cmd_assert(
        dir,
        ["record-result", DEVICE, FAMILY, payloads::GENERATION_2, payloads::BACNET_RESULT],
    )
    .success()
    .get_output()
    .stdout
    .clone();
    let state: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(state["record_count"], 1);

    // configured "entries" depth keeps keys only
    let output = cmd_assert(dir, ["results", DEVICE, FAMILY])
        .success()
        .get_output()
        .stdout
        .clone();
    let results: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(results["28179023"]["refs"]["AI:1"], serde_json::json!({}));
    assert_eq!(results["28179023"]["event_no"], 1);
    assert_eq!(results["28179023"]["scan_family"], FAMILY);

    let output = cmd_assert(dir, ["results", "--depth", "details", DEVICE, FAMILY])
        .success()
        .get_output()
        .stdout
        .clone();
    let results: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(results["28179023"]["refs"]["AI:1"]["units"], "Degrees-Celsius");
}

#[test]
fn result_without_address_is_rejected() {
    let tempdir = tempfile::tempdir().unwrap();
    let dir = tempdir.path();

    cmd_assert(dir, ["configure", DEVICE, FAMILY, payloads::BACNET_CONFIG]).success();
    cmd_assert(dir, ["start", DEVICE, FAMILY]).success();
    cmd_assert(
        dir,
        ["record-result", DEVICE, FAMILY, payloads::GENERATION_2, payloads::RESULT_WITHOUT_ADDR],
    )
    .failure()
    .stderr(predicate::str::contains("scan_addr"));
}

#[test]
fn passive_sighting_waits_for_holdoff() {
    let tempdir = tempfile::tempdir().unwrap();
    let dir = tempdir.path();

    cmd_assert(dir, ["configure", DEVICE, "ipv4", payloads::PASSIVE_CONFIG]).success();
    cmd_assert(
        dir,
        ["observe", "--at", "2024-03-01T12:00:00Z", DEVICE, "ipv4", payloads::BACNET_RESULT],
    )
    .success();

    cmd_assert(dir, ["promote", "--now", "2024-03-01T12:00:10Z", DEVICE, "ipv4"])
        .success()
        .stdout("0\n");
    cmd_assert(dir, ["promote", "--now", "2024-03-01T12:00:30Z", DEVICE, "ipv4"])
        .success()
        .stdout("1\n");
    cmd_assert(dir, ["results", "--depth", "details", DEVICE, "ipv4"])
        .success()
        .stdout(predicate::str::contains("28179023"));
}

#[test]
fn withdrawn_sighting_never_promotes() {
    let tempdir = tempfile::tempdir().unwrap();
    let dir = tempdir.path();

    cmd_assert(dir, ["configure", DEVICE, "ipv4", payloads::PASSIVE_CONFIG]).success();
    cmd_assert(
        dir,
        ["observe", "--at", "2024-03-01T12:00:00Z", DEVICE, "ipv4", payloads::BACNET_RESULT],
    )
    .success();
    cmd_assert(dir, ["withdraw", DEVICE, "ipv4", "28179023"]).success();
    cmd_assert(dir, ["promote", "--now", "2024-03-01T13:00:00Z", DEVICE, "ipv4"])
        .success()
        .stdout("0\n");
}
