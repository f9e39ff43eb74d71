use clap::Args;
use serde::Serialize;
use smartpharma_core::{AdherenceSummary, Config, DayAdherence, ProgressPeriod};

use super::input::{Reference, StoreArgs};

#[derive(Args, Debug)]
pub struct ProgressArgs {
    #[command(flatten)]
    pub store: StoreArgs,
    /// week or month
    #[arg(long)]
    pub period: Option<ProgressPeriod>,
    /// Explicit window length in days (overrides --period)
    #[arg(long)]
    pub days: Option<u32>,
    /// Include the per-day series
    #[arg(long)]
    pub breakdown: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressOutput {
    window_days: u32,
    #[serde(flatten)]
    summary: AdherenceSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    days: Option<Vec<DayAdherence>>,
}

pub fn run(args: ProgressArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let inputs = args.store.load()?;
    let engine = config.engine(args.period, args.days);

    let report = match &inputs.now {
        Reference::Local(now) => engine.report(&inputs.reminders, &inputs.logs, now),
        Reference::Fixed(now) => engine.report(&inputs.reminders, &inputs.logs, now),
    };
    let output = ProgressOutput {
        window_days: engine.effective_window(),
        summary: report.summary,
        days: args.breakdown.then_some(report.days),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
