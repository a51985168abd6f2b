//! Shift CLI commands

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;

use super::output::Output;
use crate::domain::date::{day_range, inclusive_day_range, now_local, parse_calendar_date, today_local, week_range};
use crate::domain::{DateRange, NewShift, Patch, ShiftPatch};
use crate::storage::Workspace;

#[derive(Subcommand)]
pub enum ShiftCommands {
    /// Add a shift
    ///
    /// Times are HH:MM between 09:00 and 24:00 on the shift's date.
    Add {
        /// Member ID
        #[arg(long)]
        user: i64,

        /// Shift date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Start time (HH:MM)
        #[arg(long)]
        start: String,

        /// End time (HH:MM, 24:00 for midnight)
        #[arg(long)]
        end: String,

        #[arg(long)]
        memo: Option<String>,

        /// Record the day as off instead of working
        #[arg(long)]
        off: bool,
    },

    /// List shifts for a day, a week or a date range (defaults to today)
    List {
        /// A single day
        #[arg(long, conflicts_with_all = ["week_start", "from", "to"])]
        date: Option<String>,

        /// The Monday-start week containing this day
        #[arg(long, conflicts_with_all = ["from", "to"])]
        week_start: Option<String>,

        /// First day of a range (requires --to)
        #[arg(long)]
        from: Option<String>,

        /// Last day of a range, included (requires --from)
        #[arg(long)]
        to: Option<String>,
    },

    /// Update a shift
    ///
    /// Omitted times keep their stored values; the result is always
    /// re-checked against business hours.
    Update {
        /// Shift ID
        id: i64,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        memo: Option<String>,

        #[arg(long)]
        clear_memo: bool,

        /// Working (true) or off (false)
        #[arg(long)]
        working: Option<bool>,

        /// Move the shift to another member
        #[arg(long)]
        user: Option<i64>,

        /// Partial update as JSON, e.g. '{"startTime": "10:00", "memo": null}'
        #[arg(long)]
        json: Option<String>,
    },

    /// Delete a shift
    Delete {
        /// Shift ID
        id: i64,
    },
}

pub fn run(cmd: ShiftCommands, output: &Output, workspace: Option<&Path>) -> Result<()> {
    let ws = Workspace::open_or_current(workspace)?;

    match cmd {
        ShiftCommands::Add { user, date, start, end, memo, off } => {
            let new_shift = NewShift::parse(user, &date, &start, &end, memo, !off)?;
            add_shift(output, &ws, &new_shift)
        }
        ShiftCommands::List { date, week_start, from, to } => {
            let range = select_range(date.as_deref(), week_start.as_deref(), from.as_deref(), to.as_deref(), today_local())?;
            list_shifts(output, &ws, &range)
        }
        ShiftCommands::Update { id, date, start, end, memo, clear_memo, working, user, json } => {
            let mut patch = match json {
                Some(payload) => ShiftPatch::from_json(&payload)?,
                None => ShiftPatch::default(),
            };
            overlay(&mut patch.date, Patch::from_cli(date, false));
            overlay(&mut patch.start_time, Patch::from_cli(start, false));
            overlay(&mut patch.end_time, Patch::from_cli(end, false));
            overlay(&mut patch.memo, Patch::from_cli(memo, clear_memo));
            overlay(&mut patch.is_working, Patch::from_cli(working, false));
            overlay(&mut patch.user_id, Patch::from_cli(user, false));

            update_shift(output, &ws, id, &patch.normalized())
        }
        ShiftCommands::Delete { id } => delete_shift(output, &ws, id),
    }
}

fn overlay<T>(target: &mut Patch<T>, flag: Patch<T>) {
    if !flag.is_unset() {
        *target = flag;
    }
}

fn parse_day(raw: &str, flag: &str) -> Result<NaiveDate> {
    parse_calendar_date(raw).with_context(|| format!("Invalid --{}", flag))
}

/// Picks the listing range: `--from/--to`, then `--week-start`, then `--date`, then today
fn select_range(
    date: Option<&str>,
    week_start: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange> {
    if from.is_some() || to.is_some() {
        let (Some(from), Some(to)) = (from, to) else {
            bail!("both --from and --to are required");
        };
        return Ok(inclusive_day_range(parse_day(from, "from")?, parse_day(to, "to")?));
    }

    if let Some(week_start) = week_start {
        return Ok(week_range(parse_day(week_start, "week-start")?));
    }

    let day = match date {
        Some(date) => parse_day(date, "date")?,
        None => today,
    };
    Ok(day_range(day))
}

fn add_shift(output: &Output, ws: &Workspace, new_shift: &NewShift) -> Result<()> {
    let mut db = ws.database()?;
    let shift = db.create_shift(new_shift, now_local())?;
    db.close()?;

    if output.is_json() {
        output.data(&shift);
    } else {
        output.success(&format!(
            "Added shift {}: {} {} {}-{}",
            shift.id,
            shift.user_name.as_deref().unwrap_or("?"),
            shift.date,
            shift.start_time.format("%H:%M"),
            fmt_end(&shift.window())
        ));
    }

    Ok(())
}

/// Renders an end instant as a wall-clock time, midnight as 24:00
fn fmt_end(window: &crate::domain::ShiftWindow) -> String {
    if window.end.date() > window.date {
        "24:00".to_string()
    } else {
        window.end.format("%H:%M").to_string()
    }
}

fn list_shifts(output: &Output, ws: &Workspace, range: &DateRange) -> Result<()> {
    output.verbose_ctx("shift", &format!("Listing shifts from {} to {}", range.first_day(), range.last_day()));

    let db = ws.database()?;
    let shifts = db.list_shifts(range)?;
    db.close()?;

    if output.is_json() {
        output.data(&shifts);
    } else if shifts.is_empty() {
        println!("No shifts between {} and {}", range.first_day(), range.last_day());
    } else {
        println!("{:<6} {:<20} {:<11} {:<12} {:<8} MEMO", "ID", "MEMBER", "DATE", "TIME", "STATE");
        println!("{}", "-".repeat(70));

        for shift in &shifts {
            let window = shift.window();
            println!(
                "{:<6} {:<20} {:<11} {:<12} {:<8} {}",
                shift.id,
                shift.user_name.as_deref().unwrap_or("?"),
                shift.date,
                format!("{}-{}", shift.start_time.format("%H:%M"), fmt_end(&window)),
                if shift.is_working { "working" } else { "off" },
                shift.memo.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}

fn update_shift(output: &Output, ws: &Workspace, id: i64, patch: &ShiftPatch) -> Result<()> {
    let now = now_local();
    let mut db = ws.database()?;
    let shift = db.update_shift(id, |current| Ok(patch.apply(current, now)?))?;
    db.close()?;

    if output.is_json() {
        output.data(&shift);
    } else {
        output.success(&format!(
            "Updated shift {}: {} {}-{}",
            shift.id,
            shift.date,
            shift.start_time.format("%H:%M"),
            fmt_end(&shift.window())
        ));
    }

    Ok(())
}

fn delete_shift(output: &Output, ws: &Workspace, id: i64) -> Result<()> {
    let db = ws.database()?;
    db.delete_shift(id)?;
    db.close()?;

    if output.is_json() {
        output.data(&serde_json::json!({ "id": id, "deleted": true }));
    } else {
        output.success(&format!("Deleted shift {}", id));
    }

    Ok(())
}
