mod cmd;
mod output;
mod settings;

use clap::{Parser, Subcommand};
use rotor_core::condition::ConditionStatus;
use settings::Overrides;

#[derive(Parser)]
#[command(
    name = "rotor",
    about = "Rotate through a CSV dataset and alert on natural-language conditions",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start rotation and the HTTP API
    Serve,

    /// Show the row under the cursor
    Row,

    /// List persisted conditions
    Conditions {
        /// Only show conditions in this state (pending, triggered, failed)
        #[arg(long, value_parser = parse_status)]
        status: Option<ConditionStatus>,
    },

    /// Show the effective configuration and validate it
    Config,
}

fn parse_status(s: &str) -> Result<ConditionStatus, String> {
    match s.to_ascii_lowercase().as_str() {
        "pending" => Ok(ConditionStatus::Pending),
        "triggered" => Ok(ConditionStatus::Triggered),
        "failed" => Ok(ConditionStatus::Failed),
        other => Err(format!("unknown status '{other}'")),
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = cli.overrides.resolve().and_then(|config| match cli.command {
        Commands::Serve => cmd::serve::run(&config),
        Commands::Row => cmd::row::run(&config, cli.json),
        Commands::Conditions { status } => cmd::conditions::run(&config, status, cli.json),
        Commands::Config => cmd::config::run(&config, cli.json),
    });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
