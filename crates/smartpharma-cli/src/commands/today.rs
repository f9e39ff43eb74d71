use chrono::{DateTime, FixedOffset, TimeZone};
use clap::Args;
use serde::Serialize;
use smartpharma_core::adherence::todays_doses_with;
use smartpharma_core::{next_dose_trigger, Config, ScheduledDose};

use super::input::{Inputs, Reference, StoreArgs};

#[derive(Args, Debug)]
pub struct TodayArgs {
    #[command(flatten)]
    pub store: StoreArgs,
    /// Also list reminders not linked to a recommendation
    #[arg(long)]
    pub include_custom: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TodayOutput {
    date: chrono::NaiveDate,
    doses: Vec<ScheduledDose>,
    /// Earliest upcoming trigger among doses not yet taken
    next_reminder: Option<DateTime<FixedOffset>>,
}

pub fn run(args: TodayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let inputs = args.store.load()?;
    let include_custom = args.include_custom || config.reminders.include_custom_in_today;

    let output = match &inputs.now {
        Reference::Local(now) => today_view(&inputs, now, include_custom),
        Reference::Fixed(now) => today_view(&inputs, now, include_custom),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn today_view<Tz: TimeZone>(inputs: &Inputs, now: &DateTime<Tz>, include_custom: bool) -> TodayOutput {
    let doses = todays_doses_with(&inputs.reminders, &inputs.logs, now, include_custom);

    let next_reminder = doses
        .iter()
        .filter(|d| !d.taken_today)
        .filter_map(|d| {
            let reminder = inputs.reminders.iter().find(|r| r.id == d.reminder_id)?;
            next_dose_trigger(reminder, d.time_index, now)
        })
        .min()
        .map(|t| t.fixed_offset());

    TodayOutput {
        date: now.date_naive(),
        doses,
        next_reminder,
    }
}
