//! eventops referee and assign command implementation

use serde::Serialize;

use crate::error::Result;
use crate::model::Referee;
use crate::output::{emit_success, HumanOutput};
use crate::referees::{self, AssignmentView, NewReferee};

use super::Globals;

#[derive(Serialize)]
struct RefereeListReport {
    total: usize,
    referees: Vec<Referee>,
}

#[derive(Serialize)]
struct AssignmentListReport {
    event_id: String,
    total: usize,
    assignments: Vec<AssignmentView>,
}

fn referee_line(referee: &Referee) -> String {
    let mut line = referee.label();
    if !referee.level.trim().is_empty() {
        line.push_str(&format!(" ({})", referee.level.trim()));
    }
    line
}

pub(crate) fn assignment_line(view: &AssignmentView) -> String {
    let mut line = format!("#{} {}", view.assignment.assign_id.trim(), view.label);
    if !view.level.trim().is_empty() {
        line.push_str(&format!(" ({})", view.level.trim()));
    }
    line.push_str(&format!(" as {}", view.assignment.position.trim()));
    line
}

pub fn run_list(globals: &Globals) -> Result<()> {
    let ctx = globals.context()?;
    let referees = referees::list_referees(&ctx)?;

    let mut human = HumanOutput::new(format!("eventops referee list: {} referee(s)", referees.len()));
    for referee in &referees {
        human.push_detail(referee_line(referee));
    }

    let report = RefereeListReport {
        total: referees.len(),
        referees,
    };
    emit_success(globals.output, "referee list", &report, Some(&human))
}

pub fn run_new(globals: &Globals, input: NewReferee) -> Result<()> {
    let ctx = globals.context()?;
    let referee = referees::create_referee(&ctx, input)?;

    let mut human = HumanOutput::new(format!("eventops referee new: added referee {}", referee.ref_id));
    human.push_summary("referee", referee_line(&referee));
    human.push_next_step(format!(
        "eventops assign add --event <id> --ref {} --position Referee",
        referee.ref_id
    ));

    emit_success(globals.output, "referee new", &referee, Some(&human))
}

pub fn run_assign_list(globals: &Globals, event_id: &str) -> Result<()> {
    let ctx = globals.context()?;
    let event = ctx.data.load::<crate::model::Event>()?.get(event_id)?.clone();
    let assignments = referees::assignments_for_event(&ctx, &event.event_id)?;

    let mut human = HumanOutput::new(format!(
        "eventops assign list: {} referee(s) for {}",
        assignments.len(),
        event.event_name.trim()
    ));
    for view in &assignments {
        human.push_detail(assignment_line(view));
        if view.first_name.is_empty() && view.last_name.is_empty() {
            human.push_warning(format!(
                "assignment {} points at unknown referee {}",
                view.assignment.assign_id.trim(),
                view.assignment.ref_id.trim()
            ));
        }
    }

    let report = AssignmentListReport {
        event_id: event.event_id.trim().to_string(),
        total: assignments.len(),
        assignments,
    };
    emit_success(globals.output, "assign list", &report, Some(&human))
}

pub fn run_assign_add(globals: &Globals, event_id: &str, ref_id: &str, position: &str) -> Result<()> {
    let ctx = globals.context()?;
    let view = referees::add_assignment(&ctx, event_id, ref_id, position)?;

    let mut human = HumanOutput::new(format!(
        "eventops assign add: assignment {} created",
        view.assignment.assign_id
    ));
    human.push_summary("event", view.assignment.event_id.trim());
    human.push_summary("referee", view.label.clone());
    if !view.level.trim().is_empty() {
        human.push_summary("level", view.level.trim());
    }
    human.push_summary("position", view.assignment.position.trim());
    human.push_next_step(format!("eventops assign list --event {}", view.assignment.event_id.trim()));

    emit_success(globals.output, "assign add", &view, Some(&human))
}

pub fn run_assign_remove(globals: &Globals, id: &str) -> Result<()> {
    let ctx = globals.context()?;
    let removed = referees::remove_assignment(&ctx, id)?;

    let mut human = HumanOutput::new(format!(
        "eventops assign remove: removed assignment {}",
        removed.assign_id
    ));
    human.push_summary("event", removed.event_id.trim());
    human.push_summary("referee", removed.ref_id.trim());
    human.push_summary("position", removed.position.trim());

    emit_success(globals.output, "assign remove", &removed, Some(&human))
}
