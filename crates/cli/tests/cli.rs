use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_dataset(dir: &TempDir) -> PathBuf {
    let records = serde_json::json!([
        {"district": "강남구", "period": 202412, "price": 150000.0},
        {"district": "서초구", "period": 202412, "price": 140000.0},
        {"district": "용산구", "period": 202412, "price": 100000.0},
        {"district": "마포구", "period": 202412, "price": 85000.0},
        {"district": "도봉구", "period": 202412, "price": 50000.0},
        {"district": "강남구", "period": 202411, "price": 148000.0}
    ]);
    let path = dir.path().join("transactions.json");
    fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();
    path
}

fn write_boundaries(dir: &TempDir) -> PathBuf {
    // Two unit squares sharing an edge, one far away.
    let boundaries = serde_json::json!([
        {"name": "강남구", "rings": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]]},
        {"name": "서초구", "rings": [[[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0]]]},
        {"name": "도봉구", "rings": [[[9.0, 9.0], [10.0, 9.0], [10.0, 10.0], [9.0, 10.0]]]}
    ]);
    let path = dir.path().join("boundaries.json");
    fs::write(&path, serde_json::to_string(&boundaries).unwrap()).unwrap();
    path
}

fn marble() -> Command {
    Command::cargo_bin("marble").unwrap()
}

#[test]
fn help_lists_subcommands() {
    marble()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rank"))
        .stdout(predicate::str::contains("quintiles"))
        .stdout(predicate::str::contains("similar"));
}

#[test]
fn rank_orders_districts_by_price() {
    let dir = TempDir::new().unwrap();
    let data = write_dataset(&dir);

    marble()
        .args(["--data", data.to_str().unwrap(), "--quiet", "rank", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("강남구"))
        .stdout(predicate::str::contains("\"rank\": 1"));
}

#[test]
fn similar_uses_inclusive_window() {
    let dir = TempDir::new().unwrap();
    let data = write_dataset(&dir);

    // Target 용산구 at 100000 and ±15%: 마포구 (85000) is on the boundary and
    // included, 강남구 (150000) is not.
    marble()
        .args([
            "--data",
            data.to_str().unwrap(),
            "--quiet",
            "similar",
            "용산구",
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("마포구"))
        .stdout(predicate::str::contains("강남구").not());
}

#[test]
fn adjacent_reports_shared_borders() {
    let dir = TempDir::new().unwrap();
    let data = write_dataset(&dir);
    let boundaries = write_boundaries(&dir);

    marble()
        .args([
            "--data",
            data.to_str().unwrap(),
            "--quiet",
            "adjacent",
            "강남구",
            "--boundaries",
            boundaries.to_str().unwrap(),
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("서초구"))
        .stdout(predicate::str::contains("도봉구").not());
}

#[test]
fn state_downgrades_comparison_without_district() {
    let dir = TempDir::new().unwrap();
    let data = write_dataset(&dir);

    marble()
        .args([
            "--data",
            data.to_str().unwrap(),
            "--quiet",
            "state",
            "--stage",
            "comparison",
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("district_selected"));
}

#[test]
fn ask_echoes_question_with_context() {
    let dir = TempDir::new().unwrap();
    let data = write_dataset(&dir);

    marble()
        .args([
            "--data",
            data.to_str().unwrap(),
            "--quiet",
            "ask",
            "강남구는",
            "몇",
            "위야?",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[echo]"))
        .stdout(predicate::str::contains("강남구는 몇 위야?"))
        .stdout(predicate::str::contains("Current mode: Seoul overview"));
}
