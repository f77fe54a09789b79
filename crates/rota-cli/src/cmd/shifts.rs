//! `rota shifts`: assigned members per slot over a date range.

use crate::output::{CliError, OutputMode, pretty_section, render_error, render_mode};
use chrono::NaiveDate;
use clap::Args;
use rota_core::http::{MAX_RANGE_DAYS, Transport};
use rota_core::model::slot::dates_between;
use rota_core::{ScheduleId, ScheduleStore, ShiftTypeId, SlotKey};
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct ShiftsArgs {
    /// Schedule id.
    pub schedule: u64,

    /// First day to show (YYYY-MM-DD).
    #[arg(long)]
    pub from: NaiveDate,

    /// Last day to show, inclusive. Defaults to --from.
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Fetch with a single minDate/maxDate query instead of a date list.
    #[arg(long)]
    pub range: bool,
}

#[derive(Debug, Serialize)]
pub struct SlotRow {
    pub date: NaiveDate,
    pub shift_type_id: u64,
    pub shift_type: String,
    pub members: Vec<String>,
    pub dirty: bool,
}

#[derive(Debug, Serialize)]
pub struct ShiftsView {
    pub schedule: u64,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub slots: Vec<SlotRow>,
}

fn build_view<T: Transport>(
    store: &mut ScheduleStore<T>,
    args: &ShiftsArgs,
    output: OutputMode,
) -> anyhow::Result<ShiftsView> {
    let schedule = ScheduleId(args.schedule);
    let from = args.from;
    let to = args.to.unwrap_or(from);
    let span = (to - from).num_days() + 1;
    if !(1..=MAX_RANGE_DAYS).contains(&span) {
        let mut err = CliError::new(format!("invalid date range {from}..{to}"));
        err.suggestion = Some(format!(
            "--to must not precede --from and the range is limited to {MAX_RANGE_DAYS} days"
        ));
        render_error(output, &err)?;
        anyhow::bail!("{}", err.message);
    }

    let dates = dates_between(from, to);
    super::load_schedule(store, schedule, output)?;
    let fetched = if args.range {
        store.fetch_shifts_between(schedule, Some(from), Some(to))
    } else {
        store.fetch_shifts_cached(schedule, &dates)
    };
    super::report(fetched, output)?;

    let shift_types: Vec<(ShiftTypeId, String)> =
        super::report(store.shift_types_of(schedule), output)?
            .into_iter()
            .map(|t| (t.id, t.label()))
            .collect();
    let loaded = store.schedule(schedule);

    let mut slots = Vec::with_capacity(dates.len() * shift_types.len());
    for date in dates {
        for (id, label) in &shift_types {
            let slot = SlotKey::new(date, *id);
            let members = super::report(store.assigned_members(schedule, &slot), output)?
                .into_iter()
                .map(|m| m.name.clone())
                .collect();
            slots.push(SlotRow {
                date,
                shift_type_id: id.0,
                shift_type: label.clone(),
                members,
                dirty: loaded.is_some_and(|s| s.is_dirty(&slot)),
            });
        }
    }

    Ok(ShiftsView {
        schedule: schedule.0,
        from,
        to,
        slots,
    })
}

pub fn run_shifts<T: Transport>(
    args: &ShiftsArgs,
    store: &mut ScheduleStore<T>,
    output: OutputMode,
) -> anyhow::Result<()> {
    let view = build_view(store, args, output)?;
    render_mode(output, &view, render_shifts_text, render_shifts_human)
}

fn render_shifts_text(view: &ShiftsView, w: &mut dyn Write) -> std::io::Result<()> {
    for row in &view.slots {
        writeln!(
            w,
            "{}\t{}\t{}",
            row.date,
            row.shift_type_id,
            row.members.join(",")
        )?;
    }
    Ok(())
}

fn render_shifts_human(view: &ShiftsView, w: &mut dyn Write) -> std::io::Result<()> {
    let heading = if view.from == view.to {
        format!("Schedule {} on {}", view.schedule, view.from)
    } else {
        format!("Schedule {} from {} to {}", view.schedule, view.from, view.to)
    };
    pretty_section(w, &heading)?;

    let mut current: Option<NaiveDate> = None;
    for row in &view.slots {
        if current != Some(row.date) {
            writeln!(w, "{}", row.date.format("%a %Y-%m-%d"))?;
            current = Some(row.date);
        }
        let who = if row.members.is_empty() {
            "-".to_string()
        } else {
            row.members.join(", ")
        };
        let marker = if row.dirty { " *" } else { "" };
        writeln!(w, "  {:<16} {who}{marker}", row.shift_type)?;
    }
    Ok(())
}
