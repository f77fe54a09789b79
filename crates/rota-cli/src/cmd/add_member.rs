//! `rota add-member`: create a member on the server and attach it to a schedule.

use crate::output::{OutputMode, pretty_kv, render_mode};
use clap::Args;
use rota_core::http::Transport;
use rota_core::{NewMember, ScheduleId, ScheduleStore};
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct AddMemberArgs {
    /// Schedule id.
    pub schedule: u64,

    /// Display name of the new member.
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AddedMember {
    pub schedule: u64,
    pub member_id: u64,
    pub name: String,
}

pub fn run_add_member<T: Transport>(
    args: &AddMemberArgs,
    store: &mut ScheduleStore<T>,
    output: OutputMode,
) -> anyhow::Result<()> {
    let name = args.name.trim();
    if name.is_empty() {
        anyhow::bail!("member name must not be empty");
    }
    let schedule = ScheduleId(args.schedule);
    super::load_schedule(store, schedule, output)?;
    let id = super::report(store.add_member(schedule, &NewMember::new(name)), output)?;

    let added = AddedMember {
        schedule: schedule.0,
        member_id: id.0,
        name: name.to_string(),
    };
    render_mode(
        output,
        &added,
        |a, w: &mut dyn Write| writeln!(w, "{}\t{}", a.member_id, a.name),
        |a, w: &mut dyn Write| {
            pretty_kv(w, "Added", &a.name)?;
            pretty_kv(w, "Member id", a.member_id.to_string())?;
            pretty_kv(w, "Schedule", a.schedule.to_string())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::test_support::store_with_schedule;
    use serde_json::json;

    #[test]
    fn posts_the_trimmed_name_and_registers_the_member() {
        let (transport, mut store) = store_with_schedule();
        transport.push_json(201, json!({"memberId": 12}));
        let args = AddMemberArgs {
            schedule: 1,
            name: "  Cid ".to_string(),
        };

        run_add_member(&args, &mut store, OutputMode::Json).expect("add member");

        let request = transport.last_request().expect("request");
        assert!(request.url.ends_with("/api/schedules/1/members"));
        assert_eq!(request.body.as_deref(), Some(r#"{"name":"Cid"}"#));
        let names: Vec<String> = store
            .members_of(ScheduleId(1))
            .expect("loaded")
            .into_iter()
            .map(|m| m.name.clone())
            .collect();
        assert_eq!(names, vec!["Ann", "Bob", "Cid"]);
    }

    #[test]
    fn blank_names_are_rejected_locally() {
        let (transport, mut store) = store_with_schedule();
        let args = AddMemberArgs {
            schedule: 1,
            name: "   ".to_string(),
        };
        assert!(run_add_member(&args, &mut store, OutputMode::Json).is_err());
        assert_eq!(transport.request_count(), 0);
    }
}
