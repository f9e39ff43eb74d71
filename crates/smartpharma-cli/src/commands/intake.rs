use clap::Subcommand;
use serde_json::Value;
use smartpharma_core::{new_intake_entry, SessionContext};

use super::input::{read_json, Reference, StoreArgs};

#[derive(Subcommand)]
pub enum IntakeAction {
    /// Mark one dose of a reminder as taken
    Mark {
        #[command(flatten)]
        store: StoreArgs,
        /// Reminder id
        #[arg(long)]
        reminder: String,
        /// Zero-based dose index within the reminder's times
        #[arg(long)]
        index: usize,
        /// Write the new entry back into the logs file
        #[arg(long)]
        append: bool,
    },
}

pub fn run(action: IntakeAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        IntakeAction::Mark {
            store,
            reminder,
            index,
            append,
        } => {
            let inputs = store.load()?;
            let session: SessionContext = inputs
                .session
                .ok_or("--user is required to mark a dose")?;

            let (reminders, logs) = (&inputs.reminders, &inputs.logs);
            let entry = match &inputs.now {
                Reference::Local(now) => {
                    new_intake_entry(&session, reminders, logs, &reminder, index, now)
                }
                Reference::Fixed(now) => {
                    new_intake_entry(&session, reminders, logs, &reminder, index, now)
                }
            }?;
            let document = entry.to_document();

            if append {
                let mut raw = read_json(&store.logs)?;
                match &mut raw {
                    Value::Array(items) => items.push(document.clone()),
                    Value::Object(obj) => match obj.get_mut("documents") {
                        Some(Value::Array(items)) => items.push(document.clone()),
                        _ => return Err("logs file has no 'documents' array".into()),
                    },
                    _ => return Err("logs file is not a JSON array or list response".into()),
                }
                std::fs::write(&store.logs, serde_json::to_string_pretty(&raw)?)?;
            }

            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }
    Ok(())
}
