//! Integration tests for the Roadwatch CLI

use std::process::Command;

fn roadwatch() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_roadwatch"));
    // Keep the developer's environment out of the configuration
    for (key, _) in std::env::vars() {
        if key.starts_with("ROADWATCH_") {
            command.env_remove(key);
        }
    }
    command
}

/// Test that the CLI describes itself and its options
#[test]
fn test_cli_help() {
    let output = roadwatch()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("roadwatch"));
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--port"));
}

#[test]
fn test_cli_version() {
    let output = roadwatch()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

/// An invalid configuration file stops the server before it binds
#[test]
fn test_invalid_config_file_is_rejected() {
    let config_path = std::env::temp_dir().join(format!(
        "roadwatch-invalid-{}.toml",
        std::process::id()
    ));
    std::fs::write(&config_path, "[map]\nzoom = 42\n").unwrap();

    let output = roadwatch()
        .arg("--config")
        .arg(&config_path)
        .output()
        .expect("Failed to execute command");
    std::fs::remove_file(&config_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to load configuration"),
        "unexpected stderr: {stderr}"
    );
}

/// Fixed location mode without coordinates is a configuration error
#[test]
fn test_fixed_location_requires_coordinates() {
    let output = roadwatch()
        .env("ROADWATCH_LOCATION__MODE", "fixed")
        .arg("--config")
        .arg(std::env::temp_dir().join("roadwatch-does-not-exist.toml"))
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load configuration"));
}
