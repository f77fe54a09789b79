//! `rota show`: members and shift types.

use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};
use clap::Args;
use rota_core::http::Transport;
use rota_core::model::ShiftType;
use rota_core::{Member, ScheduleId, ScheduleStore};
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Schedule id.
    pub schedule: u64,
}

#[derive(Debug, Serialize)]
pub struct ShowSchedule {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub members: Vec<Member>,
    pub shift_types: Vec<ShiftType>,
}

fn build_view<T: Transport>(
    store: &mut ScheduleStore<T>,
    schedule: ScheduleId,
    output: OutputMode,
) -> anyhow::Result<ShowSchedule> {
    super::load_schedule(store, schedule, output)?;
    let members = super::report(store.members_of(schedule), output)?
        .into_iter()
        .cloned()
        .collect();
    let shift_types = super::report(store.shift_types_of(schedule), output)?
        .into_iter()
        .cloned()
        .collect();
    let name = store
        .schedule(schedule)
        .and_then(|s| s.name().map(str::to_string));

    Ok(ShowSchedule {
        id: schedule.0,
        name,
        members,
        shift_types,
    })
}

pub fn run_show<T: Transport>(
    args: &ShowArgs,
    store: &mut ScheduleStore<T>,
    output: OutputMode,
) -> anyhow::Result<()> {
    let view = build_view(store, ScheduleId(args.schedule), output)?;
    render_mode(output, &view, render_show_text, render_show_human)
}

fn render_show_text(view: &ShowSchedule, w: &mut dyn Write) -> std::io::Result<()> {
    for member in &view.members {
        writeln!(w, "member\t{}\t{}", member.id, member.name)?;
    }
    for shift_type in &view.shift_types {
        writeln!(w, "shift_type\t{}\t{}", shift_type.id, shift_type.label())?;
    }
    Ok(())
}

fn render_show_human(view: &ShowSchedule, w: &mut dyn Write) -> std::io::Result<()> {
    let title = view
        .name
        .as_deref()
        .map_or_else(|| format!("Schedule {}", view.id), |n| format!("{n} (#{})", view.id));
    pretty_section(w, &title)?;
    pretty_kv(w, "Members", view.members.len().to_string())?;
    for member in &view.members {
        writeln!(w, "  {:>6}  {}", member.id, member.name)?;
    }
    pretty_kv(w, "Shift types", view.shift_types.len().to_string())?;
    for shift_type in &view.shift_types {
        writeln!(w, "  {:>6}  {}", shift_type.id, shift_type.label())?;
    }
    pretty_rule(w)
}
