use std::path::Path;

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;

const CONFIG: &str = "\
input_folder: data/raw
file_extensions: ['.csv']
output_final: data/processed/final_data.csv
rename_columns: [Date, Details, Amount, Account]
date_column: Date
amount_column: Amount
description_column: Details
merge_columns: [Date, Details, Amount, Account]
currency: EUR
separator: ';'
skiprows: 1
encoding: utf-8
rules_file: config/categories.json
";

const RULES: &str = r#"{
    "restaurants": {"main_category": "food", "patterns": ["UBER EATS", "DELIVEROO"]}
}"#;

fn setup(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir.join("config"))?;
    std::fs::create_dir_all(dir.join("data/raw"))?;
    std::fs::write(dir.join("config/config.yml"), CONFIG)?;
    std::fs::write(dir.join("config/categories.json"), RULES)?;
    Ok(())
}

fn write_statement(dir: &Path, name: &str, rows: &[&str]) -> Result<()> {
    let mut body = String::from("Releve de compte\nDate;Libelle;Montant\n");
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    std::fs::write(dir.join("data/raw").join(name), body)?;
    Ok(())
}

fn releve(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("releve").unwrap();
    cmd.current_dir(dir);
    cmd
}

#[test]
fn run_with_empty_folder_is_a_successful_noop() -> Result<()> {
    let dir = tempfile::tempdir()?;
    setup(dir.path())?;

    releve(dir.path())
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("No new operations."));
    assert!(!dir.path().join("data/processed/final_data.csv").exists());
    Ok(())
}

#[test]
fn run_ingests_and_categorizes() -> Result<()> {
    let dir = tempfile::tempdir()?;
    setup(dir.path())?;
    write_statement(
        dir.path(),
        "ACC00012345_jan.csv",
        &[
            "15/01/2024;UBER EATS PARIS;-23,90",
            "29/01/2024;VIREMENT SALAIRE;2500,00",
        ],
    )?;

    releve(dir.path())
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 new operation(s) added"));

    let output = std::fs::read_to_string(dir.path().join("data/processed/final_data.csv"))?;
    let mut lines = output.lines();
    assert!(lines
        .next()
        .unwrap()
        .starts_with("Date,Details,Amount,Currency,Account,Debit/Credit"));
    assert!(output.contains("UBER EATS PARIS"));
    assert!(output.contains("restaurants"));
    assert!(output.contains("ACC00012345"));
    Ok(())
}

#[test]
fn second_run_adds_nothing_and_leaves_the_file_alone() -> Result<()> {
    let dir = tempfile::tempdir()?;
    setup(dir.path())?;
    write_statement(
        dir.path(),
        "ACC00012345_jan.csv",
        &["15/01/2024;UBER EATS PARIS;-23,90"],
    )?;

    releve(dir.path()).arg("run").assert().success();
    let first = std::fs::read_to_string(dir.path().join("data/processed/final_data.csv"))?;

    releve(dir.path())
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("No new operations."));
    let second = std::fs::read_to_string(dir.path().join("data/processed/final_data.csv"))?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn missing_config_is_an_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    releve(dir.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no configuration file found"));
    Ok(())
}

#[test]
fn bad_amount_fails_without_writing_output() -> Result<()> {
    let dir = tempfile::tempdir()?;
    setup(dir.path())?;
    write_statement(
        dir.path(),
        "ACC00012345_jan.csv",
        &["15/01/2024;UBER EATS PARIS;douze"],
    )?;

    releve(dir.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unparseable amount"));
    assert!(!dir.path().join("data/processed/final_data.csv").exists());
    Ok(())
}

#[test]
fn rules_lists_in_evaluation_order() -> Result<()> {
    let dir = tempfile::tempdir()?;
    setup(dir.path())?;
    releve(dir.path())
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("restaurants").and(predicate::str::contains("UBER EATS")));
    Ok(())
}

#[test]
fn status_reports_dataset_counts() -> Result<()> {
    let dir = tempfile::tempdir()?;
    setup(dir.path())?;

    releve(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dataset not found"));

    write_statement(
        dir.path(),
        "ACC00012345_jan.csv",
        &["15/01/2024;UBER EATS PARIS;-23,90"],
    )?;
    releve(dir.path()).arg("run").assert().success();

    releve(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Operations:  1")
                .and(predicate::str::contains("Accounts:    1")),
        );
    Ok(())
}

#[test]
fn init_scaffolds_config_and_rules() -> Result<()> {
    let dir = tempfile::tempdir()?;
    releve(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Next steps"));
    assert!(dir.path().join("config/config.yml").exists());
    assert!(dir.path().join("config/categories.json").exists());
    assert!(dir.path().join("data/raw").is_dir());

    // A second init without --force refuses to clobber.
    releve(dir.path()).arg("init").assert().failure();
    Ok(())
}
