//! `rota edit`: change who works a slot and submit the result.

use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};
use chrono::NaiveDate;
use clap::Args;
use rota_core::http::Transport;
use rota_core::{MemberId, ScheduleId, ScheduleStore, ShiftAction, ShiftTypeId, SlotKey};
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Schedule id.
    pub schedule: u64,

    /// Day of the slot (YYYY-MM-DD).
    #[arg(long)]
    pub date: NaiveDate,

    /// Shift type id of the slot.
    #[arg(long = "shift-type")]
    pub shift_type: u64,

    /// Member id to assign. Repeatable.
    #[arg(long = "add", value_name = "MEMBER")]
    pub add: Vec<u64>,

    /// Member id to unassign. Repeatable.
    #[arg(long = "remove", value_name = "MEMBER")]
    pub remove: Vec<u64>,

    /// Show the resulting assignment without submitting it.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct EditOutcome {
    pub schedule: u64,
    pub slot: String,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub changed: bool,
    pub submitted: bool,
}

fn names<T: Transport>(
    store: &ScheduleStore<T>,
    schedule: ScheduleId,
    slot: &SlotKey,
    output: OutputMode,
) -> anyhow::Result<Vec<String>> {
    Ok(super::report(store.assigned_members(schedule, slot), output)?
        .into_iter()
        .map(|m| m.name.clone())
        .collect())
}

fn apply<T: Transport>(
    store: &mut ScheduleStore<T>,
    args: &EditArgs,
    output: OutputMode,
) -> anyhow::Result<EditOutcome> {
    if args.add.is_empty() && args.remove.is_empty() {
        let mut err = CliError::new("nothing to change");
        err.suggestion = Some("pass at least one --add or --remove member id".to_string());
        render_error(output, &err)?;
        anyhow::bail!("{}", err.message);
    }

    let schedule = ScheduleId(args.schedule);
    let slot = SlotKey::new(args.date, ShiftTypeId(args.shift_type));
    super::load_schedule(store, schedule, output)?;

    let known_type = store
        .schedule(schedule)
        .is_some_and(|s| s.shift_types().contains(&slot.shift_type_id));
    if !known_type {
        let mut err = CliError::new(format!(
            "shift type {} is not part of schedule {schedule}",
            slot.shift_type_id
        ));
        err.suggestion = Some(format!("run `rota show {schedule}` to list shift types"));
        render_error(output, &err)?;
        anyhow::bail!("{}", err.message);
    }

    super::report(store.fetch_shifts_cached(schedule, &[args.date]), output)?;
    let before = names(store, schedule, &slot, output)?;

    let edits = args
        .remove
        .iter()
        .map(|id| (ShiftAction::Remove, *id))
        .chain(args.add.iter().map(|id| (ShiftAction::Add, *id)));
    let mut dirty = false;
    for (action, member) in edits {
        dirty = super::report(
            store.modify_shift(schedule, slot, action, MemberId(member)),
            output,
        )?;
    }
    let after = names(store, schedule, &slot, output)?;

    let submitted = if dirty && !args.dry_run {
        super::report(store.submit_edits(schedule), output)? > 0
    } else {
        false
    };

    Ok(EditOutcome {
        schedule: schedule.0,
        slot: slot.to_string(),
        before,
        after,
        changed: dirty,
        submitted,
    })
}

pub fn run_edit<T: Transport>(
    args: &EditArgs,
    store: &mut ScheduleStore<T>,
    output: OutputMode,
) -> anyhow::Result<()> {
    let outcome = apply(store, args, output)?;
    render_mode(output, &outcome, render_edit_text, render_edit_human)
}

fn render_edit_text(outcome: &EditOutcome, w: &mut dyn Write) -> std::io::Result<()> {
    let state = match (outcome.changed, outcome.submitted) {
        (false, _) => "unchanged",
        (true, true) => "submitted",
        (true, false) => "pending",
    };
    writeln!(w, "{}\t{}\t{}", outcome.slot, state, outcome.after.join(","))
}

fn render_edit_human(outcome: &EditOutcome, w: &mut dyn Write) -> std::io::Result<()> {
    let list = |names: &[String]| {
        if names.is_empty() {
            "-".to_string()
        } else {
            names.join(", ")
        }
    };
    pretty_section(w, &format!("Slot {}", outcome.slot))?;
    pretty_kv(w, "Before", list(&outcome.before))?;
    pretty_kv(w, "After", list(&outcome.after))?;
    let status = match (outcome.changed, outcome.submitted) {
        (false, _) => "no change",
        (true, true) => "submitted",
        (true, false) => "not submitted (dry run)",
    };
    pretty_kv(w, "Status", status)
}
