use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "smartpharma-cli", version, about = "SmartPharma CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Adherence summary over a trailing window
    Progress(commands::progress::ProgressArgs),
    /// Today's dose slots
    Today(commands::today::TodayArgs),
    /// Intake logging
    Intake {
        #[command(subcommand)]
        action: commands::intake::IntakeAction,
    },
    /// Herbal recommendations
    Recommendations {
        #[command(subcommand)]
        action: commands::recommendations::RecommendationAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Progress(args) => commands::progress::run(args),
        Commands::Today(args) => commands::today::run(args),
        Commands::Intake { action } => commands::intake::run(action),
        Commands::Recommendations { action } => commands::recommendations::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
