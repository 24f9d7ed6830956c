use predicates::str::contains;

mod common;
use common::{complete_session, init_test_db, login, rp};

#[test]
fn test_login_grants_once() {
    let db_path = init_test_db("login_grants");

    rp().args(["--db", &db_path, "login"])
        .assert()
        .success()
        .stdout(contains("Signed in as 0x"))
        .stdout(contains("Welcome grant: 25 tokens"));

    rp().args(["--db", &db_path, "login"])
        .assert()
        .success()
        .stdout(contains("Balance: 25"));

    rp().args(["--db", &db_path, "history", "--ledger"])
        .assert()
        .success()
        .stdout(contains("grant"));
}

#[test]
fn test_cancelled_login_changes_nothing() {
    let db_path = init_test_db("login_cancelled");

    rp().args(["--db", &db_path, "--dev-cancel", "login"])
        .assert()
        .success()
        .stdout(contains("cancelled"))
        .stdout(contains("user_rejected"));

    rp().args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("not signed in"))
        .stdout(contains("Balance  : 0"));
}

#[test]
fn test_boost_needs_funds() {
    let db_path = init_test_db("boost_no_funds");

    rp().args(["--db", &db_path, "boost"])
        .assert()
        .success()
        .stdout(contains("Not enough tokens for a boost: 5 needed, 0 available"));

    rp().args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("Boost    : off"));
}

#[test]
fn test_boost_is_debited_and_consumed_by_next_session() {
    let db_path = init_test_db("boost_debit");
    login(&db_path);

    rp().args(["--db", &db_path, "boost"])
        .assert()
        .success()
        .stdout(contains("Boost active"))
        .stdout(contains("Balance: 20"));

    rp().args(["--db", &db_path, "boost"])
        .assert()
        .success()
        .stdout(contains("already waiting"));

    rp().args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("active for next session"));

    complete_session(&db_path, "2026-04-01");

    rp().args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("Boost    : off"))
        .stdout(contains("Balance  : 30"));
}

#[test]
fn test_buy_requires_sign_in() {
    let db_path = init_test_db("buy_no_login");

    rp().args(["--db", &db_path, "buy", "0.5"])
        .assert()
        .success()
        .stdout(contains("Sign in first"));
}

#[test]
fn test_buy_credits_converted_tokens() {
    let db_path = init_test_db("buy_credits");
    login(&db_path);

    rp().args(["--db", &db_path, "buy", "0.5"])
        .assert()
        .success()
        .stdout(contains("Payment confirmed: 5 tokens credited"))
        .stdout(contains("Balance: 30"));

    rp().args(["--db", &db_path, "history", "--ledger"])
        .assert()
        .success()
        .stdout(contains("purchase"));
}

#[test]
fn test_buy_rejects_bad_amount() {
    let db_path = init_test_db("buy_bad_amount");
    login(&db_path);

    rp().args(["--db", &db_path, "buy", "abc"])
        .assert()
        .failure()
        .stderr(contains("Invalid amount"));
}

#[test]
fn test_verify_marks_account() {
    let db_path = init_test_db("verify_marks");
    login(&db_path);

    rp().args(["--db", &db_path, "verify", "--level", "device"])
        .assert()
        .success()
        .stdout(contains("Verified (device)"));

    rp().args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("Verified : yes"));
}

#[test]
fn test_tx_returns_transaction_id() {
    let db_path = init_test_db("tx_submit");
    login(&db_path);

    rp().args([
        "--db",
        &db_path,
        "tx",
        "--contract",
        "0xdef0",
        "--function",
        "mint",
        "1",
    ])
    .assert()
    .success()
    .stdout(contains("Transaction submitted: 0x"));

    rp().args([
        "--db",
        &db_path,
        "--dev-cancel",
        "tx",
        "--contract",
        "0xdef0",
        "--function",
        "mint",
    ])
    .assert()
    .success()
    .stdout(contains("Transaction cancelled"));

    // contract calls never credit or debit tokens
    rp().args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("Balance  : 25"));
}

#[test]
fn test_rewards_add_to_granted_balance() {
    let db_path = init_test_db("rewards_add");
    login(&db_path);
    complete_session(&db_path, "2026-05-01");

    rp().args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("Balance  : 35"));
}

#[test]
fn test_boost_forgives_one_missed_check() {
    let db_path = init_test_db("boost_forgives");
    login(&db_path);

    rp().args(["--db", &db_path, "boost"]).assert().success();

    rp().args([
        "--db",
        &db_path,
        "simulate",
        "--taps",
        "120,180,240,300,360,420,480,540",
        "--date",
        "2026-06-01",
    ])
    .assert()
    .success()
    .stdout(contains("[+01:10]"))
    .stdout(contains("Boost forgave a missed check"))
    .stdout(contains("Session completed"))
    .stdout(contains("Earned 10 tokens"));

    rp().args(["--db", &db_path, "history"])
        .assert()
        .success()
        .stdout(contains("yes"));
}
