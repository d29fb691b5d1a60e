use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn groundhog(config_home: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("groundhog"));
    // Keep the user's own settings out of the tests
    cmd.env_remove("GROUNDHOG_CONFIG")
        .env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home);
    cmd
}

const DEBEER_INPUT: &str = r#"{
    "depth": [0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0],
    "qc": [1.0, 1.5, 2.0, 8.0, 14.0, 16.0, 18.0],
    "diameter_pile": 0.5,
    "layers": [
        {"depth_from": 0.0, "depth_to": 4.0, "soil_type": "Clay"},
        {"depth_from": 4.0, "depth_to": 12.0, "soil_type": "Sand"}
    ],
    "water_level": 1.0,
    "pile": {
        "penetration": 10.0,
        "base_area": 0.19635,
        "circumference": 1.5708,
        "alpha_b_tertiary_clay": 1.0,
        "alpha_b_other": 1.0,
        "alpha_s_tertiary_clay": 0.6,
        "alpha_s_other": 0.6
    }
}"#;

#[test]
fn test_info_prints_package_identity() {
    let dir = tempdir().unwrap();
    groundhog(dir.path())
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("groundhog"))
        .stdout(predicate::str::contains("0.6.0"));

    let output = groundhog(dir.path())
        .args(["info", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["author"], "Bruno Stuyts");
}

#[test]
fn test_correlations_lists_names() {
    let dir = tempdir().unwrap();
    groundhog(dir.path())
        .arg("correlations")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ic Robertson and Wride (1998)"))
        .stdout(predicate::str::contains("Es Bellotti (1989) - sand"));
}

#[test]
fn test_correlate_prints_json() {
    let dir = tempdir().unwrap();
    let output = groundhog(dir.path())
        .args([
            "correlate",
            "Su Rad and Lunne (1988)",
            "--param",
            "qnet=1.0",
            "--param",
            "Nk=20",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["Su [kPa]"], 50.0);
}

#[test]
fn test_correlate_out_of_range_fails_silently_or_strictly() {
    let dir = tempdir().unwrap();
    groundhog(dir.path())
        .args(["correlate", "Su Rad and Lunne (1988)", "-p", "qnet=1.0", "-p", "Nk=50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("null"));

    groundhog(dir.path())
        .args([
            "correlate",
            "Su Rad and Lunne (1988)",
            "-p",
            "qnet=1.0",
            "-p",
            "Nk=50",
            "--strict",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nk"));
}

#[test]
fn test_correlate_unknown_name_fails() {
    let dir = tempdir().unwrap();
    groundhog(dir.path())
        .args(["correlate", "Nobody (2099)"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown correlation"));
}

#[test]
fn test_config_file_makes_correlations_strict() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("settings.json");
    fs::write(&config, r#"{"fail_silently": false}"#).unwrap();

    groundhog(dir.path())
        .args(["correlate", "Su Rad and Lunne (1988)", "-p", "qnet=1.0", "-p", "Nk=50"])
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();

    groundhog(dir.path())
        .env("GROUNDHOG_CONFIG", &config)
        .args(["correlate", "Su Rad and Lunne (1988)", "-p", "qnet=1.0", "-p", "Nk=50"])
        .assert()
        .failure();
}

#[test]
fn test_malformed_config_is_reported() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("settings.json");
    fs::write(&config, "{fail_silently").unwrap();

    groundhog(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["correlate", "Su Rad and Lunne (1988)", "-p", "qnet=1.0", "-p", "Nk=20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed settings file"));
}

#[test]
fn test_process_writes_records_with_results() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cpt.json");
    let output = dir.path().join("out.json");
    fs::write(
        &input,
        r#"[
            {"z [m]": 1.0, "qc [MPa]": 10.0, "Vertical effective stress [kPa]": 100.0},
            {"z [m]": 2.0, "qc [MPa]": 200.0, "Vertical effective stress [kPa]": 100.0}
        ]"#,
    )
    .unwrap();

    groundhog(dir.path())
        .args(["process", "Gmax Rix and Stokoe (1991)", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let records: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["z [m]"], 1.0);
    assert!(records[0]["Gmax [kPa]"].as_f64().unwrap() > 0.0);
    assert!(records[1]["Gmax [kPa]"].is_null());

    groundhog(dir.path())
        .args(["process", "Gmax Rix and Stokoe (1991)", "--strict", "--input"])
        .arg(&input)
        .assert()
        .failure();
}

#[test]
fn test_process_missing_input_file() {
    let dir = tempdir().unwrap();
    groundhog(dir.path())
        .args(["process", "Gmax Rix and Stokoe (1991)", "--input"])
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn test_debeer_calculates_pile_resistance() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("pile.json");
    fs::write(&input, DEBEER_INPUT).unwrap();

    let output = groundhog(dir.path())
        .args(["debeer", "--input"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["base_resistance"]["diameter_1 [m]"], 0.4);
    assert_eq!(summary["base_resistance"]["diameter_2 [m]"], 0.6);
    assert_eq!(summary["layers"].as_array().unwrap().len(), 3);

    let pile = &summary["pile_resistance"];
    let rb = pile["Rb [kN]"].as_f64().unwrap();
    let rs = pile["Rs [kN]"].as_f64().unwrap();
    let rc = pile["Rc [kN]"].as_f64().unwrap();
    assert!(rb > 0.0 && rs > 0.0);
    assert!((rc - rb - rs).abs() < 1e-6);
}

#[test]
fn test_debeer_rejects_shallow_profile() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("pile.json");
    fs::write(
        &input,
        DEBEER_INPUT.replace(r#""depth_to": 12.0"#, r#""depth_to": 8.0"#),
    )
    .unwrap();

    groundhog(dir.path())
        .args(["debeer", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Layering ends"));
}

#[test_log::test]
fn test_debeer_logs_progress_with_verbose_filter() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("pile.json");
    fs::write(&input, DEBEER_INPUT).unwrap();

    groundhog(dir.path())
        .env("RUST_LOG", "info")
        .args(["debeer", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Pile resistance at 10m"));
}
