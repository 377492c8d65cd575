pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use wasteflow_core::config::{AppConfig, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "wasteflow",
    about = "Wasteflow operator CLI",
    long_about = "Operate Wasteflow migrations, demo fixtures, config inspection, and end-to-end smoke validation.",
    after_help = "Examples:\n  wasteflow doctor --json\n  wasteflow config\n  wasteflow smoke"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo dataset (partners, catalog baseline, one qualified lead)")]
    Seed,
    #[command(about = "Run end-to-end readiness checks, including a full lead-to-quotation propagation pass")]
    Smoke,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and database connectivity readiness checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

/// Logging setup shared by every command; format and level come from the
/// validated config, falling back to compact/info while the config
/// itself is still being diagnosed.
pub fn init_logging(config: Option<&AppConfig>) {
    use tracing::Level;

    let (level, format) = config
        .map(|config| (config.logging.level.as_str(), config.logging.format))
        .unwrap_or(("info", LogFormat::Compact));
    let log_level = level.parse::<Level>().unwrap_or(Level::INFO);

    let builder = tracing_subscriber::fmt().with_target(false).with_max_level(log_level);
    let result = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    // A second init (e.g. from tests) is harmless.
    let _ = result;
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Smoke => commands::smoke::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
