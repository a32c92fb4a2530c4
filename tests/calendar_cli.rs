mod support;

use predicates::str::contains;
use support::{eventops_cmd, run_json, TestRepo, EVENTS_CSV, TASKS_CSV};

fn seeded() -> TestRepo {
    let repo = TestRepo::init().expect("repo");
    repo.seed_table("events.csv", EVENTS_CSV).expect("seed events");
    repo.seed_table("tasks.csv", TASKS_CSV).expect("seed tasks");
    repo
}

#[test]
fn summary_counts() {
    let repo = seeded();
    let body = run_json(&repo, &["summary"]);
    assert_eq!(body["data"]["today"], "2024-05-15");
    assert_eq!(body["data"]["total_events"], 3);
    assert_eq!(body["data"]["ongoing"], 1);
    assert_eq!(body["data"]["upcoming"], 1);
    assert_eq!(body["data"]["overdue_tasks"], 1);
}

#[test]
fn calendar_text_marks_today_and_items() {
    let repo = seeded();
    eventops_cmd(&repo)
        .args(["calendar"])
        .assert()
        .success()
        .stdout(contains("May 2024"))
        .stdout(contains("15 *"))
        .stdout(contains("E Spring Open"))
        .stdout(contains("T Pay invoices"))
        .stdout(contains("eventops calendar --year 2024 --month 6"));
}

#[test]
fn calendar_json_has_monday_first_weeks() {
    let repo = seeded();
    let body = run_json(&repo, &["calendar", "--year", "2024", "--month", "5"]);
    let weeks = body["data"]["weeks"].as_array().unwrap();
    assert_eq!(weeks.len(), 5);
    assert_eq!(weeks[0][0]["date"], "2024-04-29");
    assert_eq!(weeks[0][0]["in_month"], false);
    assert_eq!(body["data"]["summary"]["total_events"], 3);
}

#[test]
fn calendar_rejects_out_of_range_years() {
    let repo = seeded();
    eventops_cmd(&repo)
        .args(["calendar", "--year", "1999", "--month", "5"])
        .assert()
        .code(2);
    eventops_cmd(&repo)
        .args(["calendar", "--month", "13"])
        .assert()
        .code(2);
}

#[test]
fn agenda_lists_events_and_tasks() {
    let repo = seeded();
    eventops_cmd(&repo)
        .args(["agenda"])
        .assert()
        .success()
        .stdout(contains("Agenda for 2024-05-15"))
        .stdout(contains("Spring Open"))
        .stdout(contains("Pay invoices"));

    eventops_cmd(&repo)
        .args(["agenda", "2024-06-03"])
        .assert()
        .success()
        .stdout(contains("- No events."))
        .stdout(contains("- No tasks."));

    let body = run_json(&repo, &["agenda", "2024-05-21"]);
    assert_eq!(body["data"]["events"][0]["event_name"], "Autumn Cup");
}
