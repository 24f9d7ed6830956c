#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn rp() -> Command {
    cargo_bin_cmd!("rpresence")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rpresence.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Fresh database with the schema in place
pub fn init_test_db(name: &str) -> String {
    let db_path = setup_test_db(name);
    rp().args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();
    db_path
}

/// Sign in with the simulated host so the account has its starter grant
pub fn login(db_path: &str) {
    rp().args(["--db", db_path, "login"]).assert().success();
}

/// One fully attended session completed on `date`
pub fn complete_session(db_path: &str, date: &str) {
    rp().args(["--db", db_path, "simulate", "--every", "60", "--date", date])
        .assert()
        .success();
}
