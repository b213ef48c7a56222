use assert_cmd::Command;
use predicates::prelude::*;

fn rokar(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("rokar").unwrap();
    cmd.env("HOME", home);
    cmd
}

fn init(home: &std::path::Path) {
    rokar(home)
        .args(["init", "--user", "Asha"])
        .arg("--data-dir")
        .arg(home.join("books").to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized ledger"));
}

#[test]
fn test_help_lists_command_groups() {
    Command::cargo_bin("rokar")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("accounts"))
        .stdout(predicate::str::contains("voucher"))
        .stdout(predicate::str::contains("cheque"))
        .stdout(predicate::str::contains("reconcile"));
}

#[test]
fn test_init_accounts_and_voucher_flow() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    rokar(home.path())
        .args([
            "accounts",
            "add",
            "Shop Current",
            "--number",
            "3201456789",
            "--bank",
            "State Bank",
            "--opening",
            "10000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added account"));

    rokar(home.path())
        .args([
            "voucher",
            "add",
            "Payment",
            "--account",
            "2",
            "--amount",
            "4000",
            "--party",
            "Rent",
            "--date",
            "2025-04-10",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("PAY000001"));

    rokar(home.path())
        .args(["accounts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shop Current"))
        .stdout(predicate::str::contains("6,000.00"));

    rokar(home.path())
        .args(["voucher", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PAY000001"))
        .stdout(predicate::str::contains("Rent"));
}

#[test]
fn test_invalid_voucher_type_fails() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    rokar(home.path())
        .args([
            "voucher", "add", "Journal", "--account", "1", "--amount", "10",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown voucher type"));
}

#[test]
fn test_status_before_init_points_at_setup() {
    let home = tempfile::tempdir().unwrap();
    rokar(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("rokar init"));
}
