mod support;

use predicates::str::contains;
use support::{eventops_cmd, run_json, run_json_err, TestRepo, EVENTS_CSV};

fn seeded() -> TestRepo {
    let repo = TestRepo::init().expect("repo");
    repo.seed_table("events.csv", EVENTS_CSV).expect("seed events");
    repo.seed_table(
        "referees.csv",
        "ref_id,first_name,last_name,nf,level\n1,Ana,Silva,POR,International\n",
    )
    .expect("seed referees");
    repo
}

#[test]
fn new_referee_gets_next_id() {
    let repo = seeded();
    let created = run_json(
        &repo,
        &["referee", "new", "--first-name", "Rui", "--last-name", "Costa", "--nf", "POR"],
    );
    assert_eq!(created["data"]["ref_id"], "2");
    assert_eq!(repo.head_message(), "Add referee 2");

    eventops_cmd(&repo)
        .args(["referee", "list"])
        .assert()
        .success()
        .stdout(contains("#1 | Silva Ana | POR (International)"))
        .stdout(contains("#2 | Costa Rui | POR"));
}

#[test]
fn assignments_are_joined_and_deduplicated() {
    let repo = seeded();

    let added = run_json(
        &repo,
        &["assign", "add", "--event", "1", "--ref", "1", "--position", "referee delegate"],
    );
    assert_eq!(added["data"]["position"], "Referee Delegate");
    assert_eq!(added["data"]["label"], "#1 | Silva Ana | POR");
    assert_eq!(repo.head_message(), "Add assignment: 1 ref 1");

    let (code, body) = run_json_err(
        &repo,
        &["assign", "add", "--event", "1", "--ref", "1", "--position", "Referee Delegate"],
    );
    assert_eq!(code, 2);
    assert_eq!(body["error"]["details"]["position"], "Referee Delegate");

    // A second position for the same referee is allowed.
    run_json(&repo, &["assign", "add", "--event", "1", "--ref", "1", "--position", "Referee"]);

    let listed = run_json(&repo, &["assign", "list", "--event", "1"]);
    assert_eq!(listed["data"]["total"], 2);
    assert_eq!(listed["data"]["assignments"][0]["last_name"], "Silva");
    assert_eq!(listed["data"]["assignments"][0]["level"], "International");

    eventops_cmd(&repo)
        .args(["assign", "list", "--event", "1"])
        .assert()
        .success()
        .stdout(contains("#1 | Silva Ana | POR (International) as Referee Delegate"));
    eventops_cmd(&repo)
        .args(["event", "show", "1"])
        .assert()
        .success()
        .stdout(contains("referee #2 #1 | Silva Ana | POR (International) as Referee"));

    let (code, _) = run_json_err(
        &repo,
        &["assign", "add", "--event", "1", "--ref", "1", "--position", "Umpire"],
    );
    assert_eq!(code, 2);

    run_json(&repo, &["assign", "remove", "1"]);
    assert_eq!(repo.head_message(), "Remove assignment 1");
    assert_eq!(run_json(&repo, &["assign", "list", "--event", "1"])["data"]["total"], 1);
}
