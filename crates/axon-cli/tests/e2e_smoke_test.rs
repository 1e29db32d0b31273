use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tempfile::tempdir;

use axon_cli::{Args, MeasureKind, run};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Collects all .json files from a directory
fn collect_json_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args_for(input: &Path, output: &Path) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        log_level: "off".to_string(),
        measure: MeasureKind::Fixed,
    }
}

fn find<'a>(items: &'a Value, key: &str, id: &str) -> &'a Value {
    items[key]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["id"] == id)
        .unwrap_or_else(|| panic!("no `{id}` in {key}"))
}

#[test]
fn e2e_smoke_test_valid_fixtures() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let valid_fixtures = collect_json_files(fixtures_dir());

    assert!(!valid_fixtures.is_empty(), "No fixtures found in tests/fixtures/");

    let mut failed = Vec::new();

    for fixture in &valid_fixtures {
        let output_path = temp_dir
            .path()
            .join(fixture.file_name().unwrap());

        if let Err(e) = run(&args_for(fixture, &output_path)) {
            failed.push((fixture.clone(), e));
            continue;
        }

        let output: Value = serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
        assert_eq!(output["version"], 2, "{}", fixture.display());
    }

    if !failed.is_empty() {
        eprintln!("\nValid fixtures that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid fixture(s) failed unexpectedly", failed.len());
    }

    println!("✅ All {} valid fixtures passed", valid_fixtures.len());
}

#[test]
fn e2e_smoke_test_error_fixtures() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_fixtures = collect_json_files(fixtures_dir().join("errors"));

    assert!(
        !error_fixtures.is_empty(),
        "No error fixtures found in tests/fixtures/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for fixture in &error_fixtures {
        let output_path = temp_dir
            .path()
            .join(format!("error_{}", fixture.file_name().unwrap().to_string_lossy()));

        if run(&args_for(fixture, &output_path)).is_ok() {
            unexpectedly_succeeded.push(fixture.clone());
        }
        assert!(!output_path.exists(), "{} wrote output", fixture.display());
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError fixtures that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error fixture(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!(
        "✅ All {} error fixtures failed as expected",
        error_fixtures.len()
    );
}

#[test]
fn e2e_cnn_is_scaffolded_renamed_and_laid_out() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output_path = temp_dir.path().join("cnn.json");

    run(&args_for(&fixtures_dir().join("cnn.json"), &output_path)).unwrap();
    let output: Value = serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();

    let conv = find(&output, "elements", "c1");
    assert_eq!(conv["ownedElements"].as_array().unwrap().len(), 3);
    assert!(conv["bounds"]["width"].as_f64().unwrap() >= 100.0);

    let pooling = find(&output, "elements", "p1");
    assert_eq!(pooling["ownedElements"].as_array().unwrap().len(), 3);

    let container = find(&output, "elements", "net");
    assert!(container["bounds"]["width"].as_f64().unwrap() >= 200.0);
    assert!(container["bounds"]["height"].as_f64().unwrap() >= 150.0);

    assert_eq!(find(&output, "relationships", "r3")["name"], "next");
}

#[test]
fn e2e_legacy_values_are_migrated() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output_path = temp_dir.path().join("legacy.json");

    run(&args_for(&fixtures_dir().join("legacy_training.json"), &output_path)).unwrap();
    let output: Value = serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();

    assert_eq!(find(&output, "elements", "loss")["value"], "crossentropy");
    assert_eq!(find(&output, "elements", "metrics")["value"], "[accuracy, mae]");
    assert_eq!(
        find(&output, "elements", "metrics")["name"],
        "metrics = [accuracy, mae]"
    );
}

#[test]
fn e2e_missing_config_file_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let mut args = args_for(
        &fixtures_dir().join("empty.json"),
        &temp_dir.path().join("out.json"),
    );
    args.config = Some(temp_dir.path().join("absent.toml").to_string_lossy().to_string());

    assert!(run(&args).is_err());
}

#[test]
fn e2e_explicit_config_is_applied() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[layout]\ncomposite_min_width = 400.0\n").unwrap();
    let output_path = temp_dir.path().join("out.json");

    let mut args = args_for(&fixtures_dir().join("cnn.json"), &output_path);
    args.config = Some(config_path.to_string_lossy().to_string());
    run(&args).unwrap();

    let output: Value = serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert!(find(&output, "elements", "l1")["bounds"]["width"].as_f64().unwrap() >= 400.0);
}
