mod support;

use eventops::error::{exit_codes, Error};
use support::{run_json_err, TestRepo, EVENTS_CSV};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let conflict = Error::RevisionConflict("data/tasks.csv".to_string());
    assert_eq!(conflict.exit_code(), exit_codes::REJECTED);

    let api = Error::Api {
        status: 500,
        message: "boom".to_string(),
    };
    assert_eq!(api.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn duplicate_assignment_details_in_error_envelope() {
    let err = Error::DuplicateAssignment {
        event_id: "1".to_string(),
        ref_id: "2".to_string(),
        position: "Referee".to_string(),
    };
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    assert_eq!(err.details().expect("details")["ref_id"], "2");

    let repo = TestRepo::init().expect("repo");
    repo.seed_table("events.csv", EVENTS_CSV).expect("seed events");
    repo.seed_table("referees.csv", "ref_id,first_name,last_name\n2,Ben,Kim\n")
        .expect("seed referees");
    repo.seed_table(
        "assignments.csv",
        "assign_id,ref_id,event_id,position\n1,2,1,Referee\n",
    )
    .expect("seed assignments");

    let (code, body) = run_json_err(
        &repo,
        &["assign", "add", "--event", "1", "--ref", "2", "--position", "Referee"],
    );
    assert_eq!(code, exit_codes::USER_ERROR);
    assert_eq!(body["schema_version"], "eventops.v1");
    assert_eq!(body["command"], "assign add");
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["code"], exit_codes::USER_ERROR);
    assert_eq!(body["error"]["kind"], "user_error");
    assert!(body["error"]["message"]
        .as_str()
        .expect("message")
        .contains("already assigned as Referee"));
    assert_eq!(body["error"]["details"]["ref_id"], "2");
}

#[test]
fn not_found_envelope_points_at_list_command() {
    let repo = TestRepo::init().expect("repo");
    repo.seed_table("events.csv", EVENTS_CSV).expect("seed events");

    let (code, body) = run_json_err(&repo, &["event", "show", "9"]);
    assert_eq!(code, exit_codes::USER_ERROR);
    assert_eq!(body["error"]["message"], "Event not found: 9");
    assert_eq!(body["next_steps"][0], "eventops event list");
}

#[test]
fn not_found_names_the_kind() {
    let err = Error::NotFound {
        kind: "Task",
        id: "9".to_string(),
    };
    assert_eq!(err.to_string(), "Task not found: 9");
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
}
