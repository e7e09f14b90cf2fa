// tests/cli_test.rs
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_azvm"))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn run(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .current_dir(dir.path())
        .env_remove("AZURE_SUBSCRIPTION_ID")
        .env_remove("AZURE_ACCESS_TOKEN")
        .output()
        .expect("Failed to run command")
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join(".azvm.toml");

    let output = run(
        &temp_dir,
        &["init", "--subscription", "sub-123", "--location", "westus"],
    );

    assert!(
        output.status.success(),
        "Command failed: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(config_path.exists(), "Config file not created");

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("subscription_id = \"sub-123\""));
    assert!(content.contains("location = \"westus\""));
}

#[test]
fn test_init_refuses_overwrite_without_force() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join(".azvm.toml");
    fs::write(&config_path, "existing").unwrap();

    let output = run(&temp_dir, &["init", "--subscription", "sub-123"]);

    assert!(!output.status.success(), "Should have failed");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("already exists"),
        "Expected error about existing file, got: {}",
        stderr
    );
    assert_eq!(fs::read_to_string(&config_path).unwrap(), "existing");

    let output = run(&temp_dir, &["init", "--subscription", "sub-123", "--force"]);
    assert!(output.status.success());
    assert!(fs::read_to_string(&config_path)
        .unwrap()
        .contains("sub-123"));
}

#[test]
fn test_vm_new_dry_run_prints_body() {
    let temp_dir = TempDir::new().unwrap();
    let profile = fixture_path("windows_vm.toml");

    let output = run(
        &temp_dir,
        &[
            "vm",
            "new",
            "rg1",
            "vm1",
            "westus",
            &profile,
            "",
            "false",
            "--dry-run",
        ],
    );

    assert!(
        output.status.success(),
        "Command failed: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["name"], "vm1");
    assert_eq!(body["location"], "westus");
    assert!(body["properties"].get("availabilitySet").is_none());
    assert_eq!(
        body["properties"]["osProfile"]["windowsConfiguration"]["provisionVMAgent"],
        false
    );
}

#[test]
fn test_vm_new_rejects_empty_location() {
    let temp_dir = TempDir::new().unwrap();
    let profile = fixture_path("windows_vm.toml");

    let output = run(
        &temp_dir,
        &["vm", "new", "rg1", "vm1", "", &profile, "--dry-run"],
    );

    assert!(!output.status.success(), "Should have failed");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("missing required value: location"),
        "unexpected stderr: {}",
        stderr
    );
}

#[test]
fn test_vm_new_reports_missing_profile() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(
        &temp_dir,
        &["vm", "new", "rg1", "vm1", "westus", "missing.toml", "--dry-run"],
    );

    assert!(!output.status.success(), "Should have failed");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to read profile"),
        "unexpected stderr: {}",
        stderr
    );
}
