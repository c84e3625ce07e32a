use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lockin", version, about = "Screen-activity study coach")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the capture-and-classify watch loop
    Watch {
        /// Study topic for this session (falls back to config)
        #[arg(long)]
        topic: Option<String>,
        /// Seconds between completed cycles (falls back to config)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Classify a single image file
    Classify {
        /// Path to the screenshot
        image: std::path::PathBuf,
        /// Study topic (falls back to config)
        #[arg(long)]
        topic: Option<String>,
        /// Persist the resulting observation
        #[arg(long)]
        save: bool,
    },
    /// Schedule generation and export
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Observation history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Credential management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Canvas course data
    Courses {
        #[command(subcommand)]
        action: commands::courses::CoursesAction,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env().init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Watch { topic, interval } => commands::watch::run(topic, interval).await,
        Commands::Classify { image, topic, save } => {
            commands::classify::run(&image, topic, save).await
        }
        Commands::Schedule { action } => commands::schedule::run(action).await,
        Commands::History { action } => commands::history::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Courses { action } => commands::courses::run(action).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
