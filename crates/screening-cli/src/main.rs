//! screening CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{ArgGroup, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "screening", version, about = "Candidate screening assessment engine")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a randomized question set to a candidate
    Questions {
        /// Candidate email
        #[arg(long)]
        email: String,

        /// Seed for a reproducible set
        #[arg(long)]
        seed: Option<u64>,

        /// Print the set as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether a candidate may take the test
    Eligibility {
        /// Candidate email
        #[arg(long)]
        email: String,

        /// Print the answer as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score a submission
    #[command(group(ArgGroup::new("answer_source").required(true).args(["answers", "answers_file"])))]
    Submit {
        /// Candidate email
        #[arg(long)]
        email: String,

        /// Answers as a JSON object, e.g. '{"1":"A","7":"C"}'
        #[arg(long)]
        answers: Option<String>,

        /// Read the answers object from a JSON file
        #[arg(long)]
        answers_file: Option<PathBuf>,

        /// Attempt duration in seconds
        #[arg(long, default_value = "0")]
        duration: u32,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record an anti-cheat event
    LogEvent {
        /// Candidate email
        #[arg(long)]
        email: String,

        /// Event type, e.g. "blur", "copy", "fullscreen-exit"
        #[arg(long = "type")]
        event_type: String,
    },

    /// Show a candidate's results and anti-cheat events
    History {
        /// Candidate email
        #[arg(long)]
        email: String,

        /// Also list every anti-cheat event
        #[arg(long)]
        events: bool,
    },

    /// Validate question bank TOML files
    Validate {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Create a starter config and file store
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("screening=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Questions { email, seed, json } => {
            commands::questions::execute(email, seed, json, config).await
        }
        Commands::Eligibility { email, json } => {
            commands::eligibility::execute(email, json, config).await
        }
        Commands::Submit {
            email,
            answers,
            answers_file,
            duration,
            json,
        } => commands::submit::execute(email, answers, answers_file, duration, json, config).await,
        Commands::LogEvent { email, event_type } => {
            commands::log_event::execute(email, event_type, config).await
        }
        Commands::History { email, events } => {
            commands::history::execute(email, events, config).await
        }
        Commands::Validate { bank } => commands::validate::execute(bank, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
