use clap::Subcommand;
use smartpharma_core::{parse_recommendation_reply, parse_recommendations, SessionContext};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum RecommendationAction {
    /// List stored recommendations from a JSON export
    List {
        /// JSON export of recommendation documents
        #[arg(long)]
        file: PathBuf,
        /// Only keep records owned by this user
        #[arg(long)]
        user: Option<String>,
    },
    /// Extract herbs from a model reply saved as text
    Parse {
        /// Reply text file
        file: PathBuf,
    },
}

pub fn run(action: RecommendationAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RecommendationAction::List { file, user } => {
            let text = std::fs::read_to_string(&file)
                .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
            let mut records =
                parse_recommendations(&text).map_err(|e| format!("{}: {e}", file.display()))?;
            if let Some(user) = user {
                records = SessionContext::new(user).scope_recommendations(records);
            }
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        RecommendationAction::Parse { file } => {
            let text = std::fs::read_to_string(&file)
                .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
            let herbs = parse_recommendation_reply(&text);
            tracing::debug!(count = herbs.len(), "parsed model reply");
            println!("{}", serde_json::to_string_pretty(&herbs)?);
        }
    }
    Ok(())
}
