mod config;
mod link;
mod logging;
mod model;
mod ports;
mod presenter;
mod services;
mod spotify;
mod tui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context, eyre::eyre};

use crate::{
    config::Config,
    logging::setup_logging,
    ports::{bridge::Bridge, dialog::NativeFolderPicker},
    presenter::{BackendUpdate, DownloadOrchestrator, FreezeDryOutcome, updates},
    services::backend::LocalBackend,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "SPOTIDRY_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Console log level (default: off)
    #[arg(long, default_value = "off", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "SPOTIDRY_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Paste a link, preview it and freeze dry it interactively (default)
    Tui,
    /// Print what a Spotify link points at as JSON
    Resolve {
        /// Spotify track, album or playlist link
        link: String,
    },
    /// Download every track of a Spotify link
    FreezeDry {
        /// Spotify track, album or playlist link
        link: String,

        /// The directory to save songs to, instead of the configured one
        #[arg(short, long, env = "SPOTIDRY_OUTPUT_DIRECTORY")]
        output_directory: Option<PathBuf>,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("Spotidry starting");

    let config = {
        if let Some(ref config) = args.config {
            Config::from_file(config)
        } else {
            Config::load()
        }
    }
    .wrap_err("Failed to load spotidry config")?;

    match args.command.unwrap_or(Commands::Tui) {
        Commands::Tui => tui::run(config).await?,
        Commands::Resolve { link } => {
            let (sender, _receiver) = updates::channel();
            let backend = LocalBackend::from_config(
                &config,
                config.download_directory(),
                Box::new(NativeFolderPicker),
                sender,
            )
            .await?;
            let result = backend
                .get_from_link(&link)
                .await
                .wrap_err_with(|| format!("Failed to resolve {}", link))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::FreezeDry {
            link,
            output_directory,
        } => {
            let folder = output_directory.unwrap_or_else(|| config.download_directory());
            let (sender, receiver) = updates::channel();
            let backend = LocalBackend::from_config(
                &config,
                folder,
                Box::new(NativeFolderPicker),
                sender,
            )
            .await?;

            let printer = tokio::spawn(print_updates(receiver));
            let outcome = DownloadOrchestrator::default()
                .freeze_dry(&backend, &link)
                .await;
            drop(backend);
            let _ = printer.await;

            match outcome {
                FreezeDryOutcome::Completed(report) => println!(
                    "Saved {} of {} songs to {} ({} already there, {} failed)",
                    report.downloaded,
                    report.total,
                    report.directory.display(),
                    report.skipped,
                    report.failed
                ),
                FreezeDryOutcome::Failed { message, error } => {
                    return Err(eyre!(error).wrap_err(message));
                }
                FreezeDryOutcome::Busy => return Err(eyre!("A freeze dry is already running")),
            }
        }
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                log::debug!("Creating default config");
                let path = Config::create_default()?;
                println!("{}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
    }

    Ok(())
}

/// One line per track as matches and downloads come in. Ends once the backend is dropped.
async fn print_updates(mut receiver: updates::UpdateReceiver) {
    while let Some(update) = receiver.recv().await {
        match update {
            BackendUpdate::SearchResult { source, .. } => println!("Downloading {}", source.title),
            BackendUpdate::Progress { track_id, fraction } if fraction >= 1.0 => {
                log::debug!("Finished {}", track_id)
            }
            _ => {}
        }
    }
}
