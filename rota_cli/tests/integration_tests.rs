//! Integration tests for the rota binary.
//!
//! These tests verify end-to-end behavior including:
//! - Session start and single change suggestions
//! - Forecast text and JSON output
//! - Configuration file handling
//! - Interactive prompt and manual pod override

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get the path to the CLI binary, isolated from any user config
fn cli() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rota"));
    cmd.env("XDG_CONFIG_HOME", "/nonexistent/rota-test-config");
    cmd
}

/// Helper to create a directory for config files
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("Failed to run rota");
    assert!(
        output.status.success(),
        "rota failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is not UTF-8")
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Sensor and pod site rotation planner",
        ));
}

#[test]
fn test_start_prints_confirmation() {
    cli()
        .arg("start")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Sensor: Right Stomach (Changed on 2025-05-28)",
        ))
        .stdout(predicate::str::contains(
            "Pod: Right Arm (Changed on 2025-05-31)",
        ));
}

#[test]
fn test_start_with_custom_sites() {
    cli()
        .args(["start", "--sensor-site", "left arm", "--pod-site", "Right_Leg"])
        .args(["--sensor-date", "2025-07-01", "--pod-date", "2025-07-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Sensor: Left Arm (Changed on 2025-07-01)",
        ))
        .stdout(predicate::str::contains(
            "Pod: Right Leg (Changed on 2025-07-02)",
        ));
}

#[test]
fn test_sensor_suggestion() {
    cli()
        .arg("sensor")
        .assert()
        .success()
        .stdout(predicate::str::diff("Next sensor site: Left Stomach\n"));
}

#[test]
fn test_sensor_suggestion_with_index() {
    cli()
        .args(["sensor", "--sensor-site", "Left Stomach", "--sensor-index", "0"])
        .assert()
        .success()
        .stdout(predicate::str::diff("Next sensor site: Right Stomach\n"));
}

#[test]
fn test_pod_suggestion_is_compatible() {
    for seed in 0..10 {
        let stdout = stdout_of(cli().args(["pod", "--seed", &seed.to_string()]));
        let site = stdout
            .trim()
            .strip_prefix("Next pod site: ")
            .expect("unexpected pod output");
        // Right Stomach sensor; Right Arm is the current pod
        assert!(
            ["Left Leg", "Right Leg", "Left Arm"].contains(&site),
            "seed {} gave {}",
            seed,
            site
        );
    }
}

#[test]
fn test_forecast_default_weeks() {
    let stdout = stdout_of(cli().args(["forecast", "--today", "2025-06-01", "--seed", "1"]));
    let lines: Vec<_> = stdout.lines().collect();

    assert_eq!(lines.iter().filter(|l| l.contains("Pod Change")).count(), 9);
    assert_eq!(lines.iter().filter(|l| l.contains("Sensor Change")).count(), 3);
    assert!(lines[0].starts_with("Jun 03, 2025: Pod Change -> "));
    assert!(stdout.contains("Jun 07, 2025: Sensor Change -> Left Stomach"));
    assert!(stdout.contains("Jun 17, 2025: Sensor Change -> Right Stomach"));
}

#[test]
fn test_forecast_same_seed_same_output() {
    let args = ["forecast", "--today", "2025-06-01", "--seed", "42", "--weeks", "8"];
    let first = stdout_of(cli().args(args));
    let second = stdout_of(cli().args(args));
    assert_eq!(first, second);
}

#[test]
fn test_forecast_legacy_order() {
    let stdout = stdout_of(cli().args([
        "forecast",
        "--today",
        "2025-06-01",
        "--until",
        "2025-07-10",
        "--legacy-order",
        "--seed",
        "3",
    ]));
    let lines: Vec<_> = stdout.lines().collect();

    let mut sorted = lines.clone();
    sorted.sort();
    assert_eq!(lines, sorted);
    assert!(lines[0].starts_with("Jul 03, 2025: Pod Change"));
}

#[test]
fn test_forecast_json() {
    let stdout = stdout_of(cli().args([
        "forecast",
        "--today",
        "2025-06-01",
        "--until",
        "2025-06-11",
        "--seed",
        "5",
        "--json",
    ]));
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON");
    let events = value["events"].as_array().expect("events array");

    assert_eq!(events.len(), 4);
    assert_eq!(events[0]["date"], "2025-06-03");
    assert_eq!(events[0]["kind"], "pod");
    assert_eq!(events[1]["date"], "2025-06-06");
    assert_eq!(events[2]["kind"], "sensor");
    assert_eq!(events[2]["site"], "left_stomach");
}

#[test]
fn test_forecast_nothing_due() {
    cli()
        .args(["forecast", "--today", "2025-05-31", "--until", "2025-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes due through 2025-06-01"));
}

#[test]
fn test_weeks_conflicts_with_until() {
    cli()
        .args(["forecast", "--weeks", "2", "--until", "2025-07-01"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_date_fails() {
    cli()
        .args(["start", "--sensor-date", "2025-13-40"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2025-13-40"));
}

#[test]
fn test_unknown_site_fails() {
    cli()
        .args(["sensor", "--sensor-site", "Right Knee"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Right Knee"));
}

#[test]
fn test_config_file_sets_order_and_seed() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[forecast]
order = "legacy"

[selection]
seed = 9
"#,
    )
    .unwrap();

    let args = ["forecast", "--today", "2025-06-01", "--until", "2025-07-10"];
    let from_config = stdout_of(cli().args(args).arg("--config").arg(&config_path));
    let from_flags = stdout_of(cli().args(args).args(["--legacy-order", "--seed", "9"]));

    assert_eq!(from_config, from_flags);
    assert!(from_config.starts_with("Jul"));
}

#[test]
fn test_config_file_intervals() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[schedule]
pod_interval_days = 2
sensor_interval_days = 14
"#,
    )
    .unwrap();

    let stdout = stdout_of(
        cli()
            .args(["forecast", "--today", "2025-05-31", "--until", "2025-06-11"])
            .arg("--config")
            .arg(&config_path),
    );

    assert_eq!(stdout.lines().filter(|l| l.contains("Pod Change")).count(), 5);
    assert_eq!(stdout.lines().filter(|l| l.contains("Sensor Change")).count(), 1);
    assert!(stdout.contains("Jun 02, 2025: Pod Change"));
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[selection]\nrecency_depth = 0\n").unwrap();

    cli()
        .arg("start")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("recency_depth"));
}

#[test]
fn test_interactive_session() {
    cli()
        .args(["interactive", "--today", "2025-06-01", "--seed", "4"])
        .write_stdin("s\np\nf\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sensor: Right Stomach"))
        .stdout(predicate::str::contains("Next sensor site: Left Stomach"))
        .stdout(predicate::str::contains("Next pod site: "))
        .stdout(predicate::str::contains("4-Week Forecast"));
}

#[test]
fn test_default_command_is_interactive_and_stops_at_eof() {
    cli()
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sensor: Right Stomach"));
}

#[test]
fn test_interactive_unknown_choice() {
    cli()
        .write_stdin("x\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown choice 'x'"));
}

#[test]
fn test_pod_confirm_accepts_suggestion() {
    cli()
        .args(["pod", "--confirm", "--seed", "1"])
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Suggested pod site: "))
        .stdout(predicate::str::contains("Next pod site: "));
}

#[test]
fn test_pod_confirm_override() {
    cli()
        .args(["pod", "--confirm", "--seed", "1"])
        .write_stdin("Right Arm\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Next pod site: Right Arm"));
}

#[test]
fn test_pod_confirm_rejects_incompatible_override() {
    // Stomach pods are not allowed while the sensor is on the stomach
    cli()
        .args(["pod", "--confirm", "--seed", "1"])
        .write_stdin("Left Stomach\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Next pod site: Left Stomach").not());
}

#[test]
fn test_interactive_survives_long_run_of_unknown_choices() {
    let mut input = "x\n".repeat(60_000);
    input.push_str("q\n");

    let output = cli()
        .args(["interactive", "--today", "2025-06-01", "--seed", "1"])
        .write_stdin(input)
        .output()
        .expect("Failed to run rota");

    assert!(
        output.status.success(),
        "rota failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("Unknown choice 'x'").count(), 60_000);
}

#[test]
fn test_interactive_pod_override() {
    cli()
        .args(["interactive", "--today", "2025-06-01", "--seed", "1"])
        .write_stdin("o\nRight Arm\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Suggested pod site: "))
        .stdout(predicate::str::contains("Next pod site: Right Arm"));
}

#[test]
fn test_interactive_pod_override_accepts_suggestion() {
    let stdout = stdout_of(
        cli()
            .args(["interactive", "--today", "2025-06-01", "--seed", "1"])
            .write_stdin("o\n\nq\n"),
    );
    let suggested = stdout
        .lines()
        .find_map(|l| l.strip_prefix("Suggested pod site: "))
        .expect("no suggestion shown");
    assert!(stdout.contains(&format!("Next pod site: {}", suggested)));
}
