//! Referees and their nominations to events.

use serde::Serialize;

use crate::config::canonical_choice;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::events::required;
use crate::model::{Assignment, Event, Referee};
use crate::table::{same_id, Table};

#[derive(Debug, Clone, Default)]
pub struct NewReferee {
    pub first_name: String,
    pub last_name: String,
    pub nf: String,
    pub level: String,
}

/// An assignment joined with the referee's name fields.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentView {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub first_name: String,
    pub last_name: String,
    pub nf: String,
    pub level: String,
    pub label: String,
}

pub fn list_referees(ctx: &Context) -> Result<Vec<Referee>> {
    Ok(ctx.data.load::<Referee>()?.rows)
}

pub fn create_referee(ctx: &Context, input: NewReferee) -> Result<Referee> {
    let first_name = required("first name", &input.first_name)?;
    let last_name = required("last name", &input.last_name)?;

    let mut table = ctx.data.load::<Referee>()?;
    let id = table.push(Referee {
        ref_id: String::new(),
        first_name,
        last_name,
        nf: input.nf.trim().to_string(),
        level: input.level.trim().to_string(),
    });
    ctx.data.save(&mut table, &format!("Add referee {id}"))?;
    table.get(&id).cloned()
}

/// Assignments of one event, with referee names (blank when unknown).
pub fn assignments_for_event(ctx: &Context, event_id: &str) -> Result<Vec<AssignmentView>> {
    let referees = ctx.data.load::<Referee>()?;
    let assignments = ctx.data.load::<Assignment>()?;
    Ok(assignments
        .rows
        .into_iter()
        .filter(|assignment| same_id(&assignment.event_id, event_id))
        .map(|assignment| join_referee(assignment, &referees))
        .collect())
}

fn join_referee(assignment: Assignment, referees: &Table<Referee>) -> AssignmentView {
    match referees.find(&assignment.ref_id) {
        Some(referee) => AssignmentView {
            first_name: referee.first_name.clone(),
            last_name: referee.last_name.clone(),
            nf: referee.nf.clone(),
            level: referee.level.clone(),
            label: referee.label(),
            assignment,
        },
        None => AssignmentView {
            first_name: String::new(),
            last_name: String::new(),
            nf: String::new(),
            level: String::new(),
            label: format!("#{}", assignment.ref_id.trim()),
            assignment,
        },
    }
}

/// Nominate a referee for an event in a position.
///
/// The same referee may hold several positions at one event, but not the same
/// one twice.
pub fn add_assignment(
    ctx: &Context,
    event_id: &str,
    ref_id: &str,
    position: &str,
) -> Result<AssignmentView> {
    let event_id = ctx.data.load::<Event>()?.get(event_id)?.event_id.clone();
    let referees = ctx.data.load::<Referee>()?;
    let ref_id = referees.get(ref_id)?.ref_id.clone();
    let position = canonical_choice("position", position, &ctx.config.referees.positions)?;

    let mut table = ctx.data.load::<Assignment>()?;
    let duplicate = table.rows.iter().any(|row| {
        same_id(&row.event_id, &event_id)
            && same_id(&row.ref_id, &ref_id)
            && row.position.trim() == position
    });
    if duplicate {
        return Err(Error::DuplicateAssignment {
            event_id,
            ref_id,
            position,
        });
    }

    let id = table.push(Assignment {
        assign_id: String::new(),
        ref_id: ref_id.clone(),
        event_id: event_id.clone(),
        position,
    });
    ctx.data
        .save(&mut table, &format!("Add assignment: {event_id} ref {ref_id}"))?;
    let assignment = table.get(&id)?.clone();
    Ok(join_referee(assignment, &referees))
}

pub fn remove_assignment(ctx: &Context, id: &str) -> Result<Assignment> {
    let mut table = ctx.data.load::<Assignment>()?;
    let assign_id = table.get(id)?.assign_id.clone();
    let mut removed = table.remove_ids(&[assign_id.clone()]);
    ctx.data
        .save(&mut table, &format!("Remove assignment {assign_id}"))?;
    Ok(removed.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::memory_context;
    use crate::table::tests::MemoryStore;

    fn memory() -> MemoryStore {
        MemoryStore::default()
            .with_file("data/events.csv", "event_id,event_name\n1,Spring Open\n")
            .with_file(
                "data/referees.csv",
                "ref_id,first_name,last_name,nf,level\n1,Ana,Silva,POR,A\n2,Ben,Kim,,B\n",
            )
    }

    #[test]
    fn assign_then_reject_duplicate() {
        let memory = memory();
        let ctx = memory_context(&memory);

        let view = add_assignment(&ctx, "1", "1", "line judge").unwrap();
        assert_eq!(view.assignment.assign_id, "1");
        assert_eq!(view.assignment.position, "Line Judge");
        assert_eq!(view.label, "#1 | Silva Ana | POR");

        let again = add_assignment(&ctx, "1", "1", "Line Judge");
        assert!(matches!(again, Err(Error::DuplicateAssignment { .. })));

        add_assignment(&ctx, "1", "1", "Referee").unwrap();
        assert_eq!(
            memory.messages.borrow().as_slice(),
            ["Add assignment: 1 ref 1", "Add assignment: 1 ref 1"]
        );
    }

    #[test]
    fn assign_checks_event_referee_and_position() {
        let memory = memory();
        let ctx = memory_context(&memory);
        assert!(matches!(
            add_assignment(&ctx, "9", "1", "Referee"),
            Err(Error::NotFound { kind: "Event", .. })
        ));
        assert!(matches!(
            add_assignment(&ctx, "1", "9", "Referee"),
            Err(Error::NotFound { kind: "Referee", .. })
        ));
        assert!(matches!(
            add_assignment(&ctx, "1", "1", "Coach"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn list_joins_unknown_referee_as_blank() {
        let memory = memory().with_file(
            "data/assignments.csv",
            "assign_id,ref_id,event_id,position\n1,2,1,Referee\n2,7,1,Other\n3,1,2,Referee\n",
        );
        let ctx = memory_context(&memory);
        let views = assignments_for_event(&ctx, "1").unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].last_name, "Kim");
        assert_eq!(views[0].level, "B");
        assert_eq!(views[1].level, "");
        assert_eq!(views[1].last_name, "");
        assert_eq!(views[1].label, "#7");

        let removed = remove_assignment(&ctx, "1").unwrap();
        assert_eq!(removed.ref_id, "2");
        assert_eq!(assignments_for_event(&ctx, "1").unwrap().len(), 1);
    }

    #[test]
    fn new_referee_gets_next_id() {
        let memory = memory();
        let ctx = memory_context(&memory);
        let referee = create_referee(
            &ctx,
            NewReferee {
                first_name: "Cara".into(),
                last_name: "Lopes".into(),
                ..NewReferee::default()
            },
        )
        .unwrap();
        assert_eq!(referee.ref_id, "3");
        assert_eq!(list_referees(&ctx).unwrap().len(), 3);
        assert!(create_referee(&ctx, NewReferee::default()).is_err());
    }
}
