use std::fs;

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;

fn shell(home: &assert_fs::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("spendwise_cli").unwrap();
    cmd.env("SPENDWISE_CLI_SCRIPT", "1")
        .env("SPENDWISE_HOME", home.path())
        .env("SPENDWISE_TODAY", "2024-06-23")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn script_mode_records_and_renders_a_calendar() {
    let home = assert_fs::TempDir::new().unwrap();
    let input = "\
category add Rent --amount 500 --frequency monthly
expense toggle Rent 2024-06-01
calendar Rent 2024-06
exit
";

    shell(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Added category 💰 Rent (Monthly)"))
        .stdout(contains("Marked 2024-06-01 as paid"))
        .stdout(contains("Ordered: 1  Skipped: 1  Planned: 0"));

    home.child("books/personal.json")
        .assert(predicate::path::exists())
        .assert(contains("\"name\": \"Rent\""))
        .assert(contains("\"is_auto_generated\": true"));
}

#[test]
fn book_persists_between_runs() {
    let home = assert_fs::TempDir::new().unwrap();
    shell(&home)
        .write_stdin("category add Gym --frequency custom --days mon,wed\nexpense add 12.5 --category gym --date 2024-06-03 --note \"spin class\"\n")
        .assert()
        .success();

    shell(&home)
        .write_stdin("expense list 2024-06\ncategory list\n")
        .assert()
        .success()
        .stdout(contains("spin class"))
        .stdout(contains("1 expense(s), total ₹12.50"))
        .stdout(contains("Mon, Wed"));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let home = assert_fs::TempDir::new().unwrap();
    shell(&home)
        .write_stdin("calender Rent\n")
        .assert()
        .success()
        .stderr(contains("Unknown command `calender`"))
        .stdout(contains("Suggestion: `calendar`?"));
}

#[test]
fn bad_arguments_point_at_help() {
    let home = assert_fs::TempDir::new().unwrap();
    shell(&home)
        .write_stdin("expense add lots\n")
        .assert()
        .success()
        .stderr(contains("invalid amount `lots`"))
        .stderr(contains("Use `help <command>` for usage details."));
}

#[test]
fn sending_a_report_queues_it_in_the_outbox() {
    let home = assert_fs::TempDir::new().unwrap();
    let input = "\
settings set email me@example.com
category add Rent --amount 500
expense add 500 --category Rent --date 2024-06-01
report monthly 2024-06 --send
";
    shell(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Queued \"Analysis Hub: June 2024 Report\" for me@example.com"));

    let outbox = home.child("outbox");
    outbox.assert(predicate::path::is_dir());
    let files: Vec<_> = fs::read_dir(outbox.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    let queued = fs::read_to_string(&files[0]).unwrap();
    assert!(queued.contains("\"SpendWise Reports\\\" <reports@spendwise.local>"));
    assert!(queued.contains("Monthly Analysis Hub"));
}

#[test]
fn budget_categories_show_spending_against_their_limit() {
    let home = assert_fs::TempDir::new().unwrap();
    let input = "\
category add Food --budget 100 --frequency daily
category add Rent --amount 500
expense add 60 --category food --date 2024-06-03
expense add 55 --category food --date 2024-06-10
budget
calendar Food
category edit Food --active off
budget Food
expense toggle Food 2024-06-11
budget
";

    shell(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Budgets for June 2024"))
        .stdout(contains("115%"))
        .stdout(contains("Spent ₹115.00 / ₹100.00"))
        .stdout(contains("No active budget categories."))
        .stderr(contains("₹15.00 over"))
        .stderr(contains("1 budget(s) exceeded"))
        .stderr(contains("category `Food` is inactive"))
        .stdout(contains("Ordered:").not());
}
