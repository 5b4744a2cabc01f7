/// Smoke tests to verify the binary runs without panicking
use std::process::Command;

fn visitflow() -> Command {
    Command::new(env!("CARGO_BIN_EXE_visitflow"))
}

fn fixture() -> String {
    format!("{}/tests/fixtures/sample.csv", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn binary_shows_help() {
    let output = visitflow()
        .arg("--help")
        .output()
        .expect("Failed to execute visitflow");

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("visitflow"),
        "Help output should mention visitflow"
    );
    assert!(stdout.contains("geojson"));
}

#[test]
fn binary_shows_version() {
    let output = visitflow()
        .arg("--version")
        .output()
        .expect("Failed to execute visitflow");

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn invalid_subcommand_fails_gracefully() {
    let output = visitflow()
        .arg("nonexistent-command")
        .output()
        .expect("Failed to execute visitflow");

    // Should fail with error, not panic
    assert!(
        !output.status.success(),
        "Invalid subcommand should return error status"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("panicked at"),
        "Invalid subcommand should not cause panic"
    );
}

#[test]
fn geojson_from_file() {
    let output = visitflow()
        .args(["geojson", "--file", &fixture(), "--seed", "1"])
        .output()
        .expect("Failed to execute visitflow");

    assert!(
        output.status.success(),
        "geojson failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["type"], "FeatureCollection");
    assert!(!value["features"].as_array().unwrap().is_empty());
}

#[test]
fn summary_from_file() {
    let output = visitflow()
        .args(["summary", "--file", &fixture(), "--top", "3"])
        .output()
        .expect("Failed to execute visitflow");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("12 records, 7 countries"));
}

#[test]
fn missing_file_reports_error() {
    let output = visitflow()
        .args(["charts", "--file", "no/such/file.csv"])
        .output()
        .expect("Failed to execute visitflow");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load the data file"));
    assert!(!stderr.contains("panicked at"));
}

#[test]
fn failed_load_leaves_output_file_alone() {
    let path = std::env::temp_dir().join(format!("visitflow-keep-{}.geojson", std::process::id()));
    std::fs::write(&path, "previous export").unwrap();

    let output = visitflow()
        .args(["geojson", "--file", "no/such/file.csv", "--output"])
        .arg(&path)
        .output()
        .expect("Failed to execute visitflow");

    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert!(!output.status.success());
    assert_eq!(contents, "previous export");
}

#[test]
fn geojson_written_to_output_file() {
    let path = std::env::temp_dir().join(format!("visitflow-out-{}.geojson", std::process::id()));

    let output = visitflow()
        .args(["geojson", "--file", &fixture(), "--seed", "2", "--output"])
        .arg(&path)
        .output()
        .expect("Failed to execute visitflow");

    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value["type"], "FeatureCollection");
}

#[test]
fn zero_samples_rejected() {
    let output = visitflow()
        .args(["geojson", "--file", &fixture(), "--samples", "0"])
        .output()
        .expect("Failed to execute visitflow");

    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("panicked at"));
}

#[test]
fn max_lines_caps_each_country() {
    let output = visitflow()
        .args(["geojson", "--file", &fixture(), "--seed", "3", "--max-lines", "1"])
        .output()
        .expect("Failed to execute visitflow");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let lines = value["features"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|f| f["geometry"]["type"] == "LineString")
        .count();
    // five countries in the sample have map positions
    assert_eq!(lines, 5);
}
