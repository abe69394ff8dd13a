use clap::{Parser, Subcommand};
use console::style;
use crmm_publish::commands;
use crmm_publish::commands::app::AppError;
use crmm_publish::commands::publish::PublishOptions;
use crmm_publish::config::{ConfigError, DEFAULT_CONFIG_FILE, PublishConfig, Settings};
use log::{LevelFilter, debug, info};
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the crmm-publish CLI binary
#[derive(Debug, Error)]
enum CliError {
    /// The config file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Command orchestration failed.
    #[error(transparent)]
    App(#[from] AppError),
}

#[derive(Parser)]
#[command(name = "crmm-publish")]
#[command(about = "CLI to publish mod versions to the CRMM registry", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the publish config (.json, .toml or .yaml)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve game versions, fetch the changelog and upload the version (default)
    Publish {
        /// Build the upload without sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the game versions the config resolves to
    Versions,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    init_logging(&cli);

    info!("Loading config...");
    let config = PublishConfig::load(&cli.config, &Settings::from_env())?;
    debug!("{config:#?}");

    match cli.command.unwrap_or(Commands::Publish { dry_run: false }) {
        Commands::Publish { dry_run } => {
            let report = commands::app::publish(&config, PublishOptions { dry_run })?;
            match report.response {
                Some(response) => {
                    info!("{response:#}");
                    info!(
                        "{} {} with {} game version(s)",
                        style("Published").green().bold(),
                        style(&report.upload.title).bold(),
                        report.upload.game_versions.len()
                    );
                }
                None => info!(
                    "{} {} with {} game version(s)",
                    style("Dry run").yellow().bold(),
                    style(&report.upload.title).bold(),
                    report.upload.game_versions.len()
                ),
            }
        }
        Commands::Versions => {
            commands::app::versions(&config)?;
        }
    }
    Ok(())
}

/// Initialize logging based on the verbosity level specified in the CLI
fn init_logging(cli: &Cli) {
    let mut builder = env_logger::builder();
    builder
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .format(|buf, record| {
            let level = record.level();
            let style = &buf.default_level_style(level);
            writeln!(buf, "[{style}{level}{style:#}] {}", record.args())
        });

    if !cli.verbose {
        builder.format_timestamp(None);
    }

    builder.init();
}
