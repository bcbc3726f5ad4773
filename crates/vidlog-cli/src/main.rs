//! vidlog: command-line driver for the watch log.

mod commands;
mod error;
mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use vidlog_lib::core::store::{resolve_data_dir, LOGS_DIR};
use vidlog_lib::VidLog;

#[derive(Parser, Debug)]
#[command(name = "vidlog", version, about = "Log the videos you watch and see your stats")]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Use this data directory instead of the platform default
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List logged videos, newest first
    List {
        /// Only titles matching this (fuzzy, case-insensitive)
        #[arg(long)]
        title: Option<String>,
        /// Only this channel
        #[arg(long)]
        channel: Option<String>,
    },
    /// Show one entry
    Show { id: String },
    /// Log a video
    Add(commands::AddArgs),
    /// Change fields of an existing entry
    Edit(commands::EditArgs),
    /// Delete an entry
    Delete { id: String },
    /// Number of logged videos
    Count,
    /// Ratings, channels, months and streaks
    Stats {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        channel: Option<String>,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Look up title, channel and release date for a URL
    Fetch { url: String },
    /// Print the data directory
    Path,
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    Show,
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => resolve_data_dir().context("could not resolve the data directory")?,
    };
    logging::init_logging(&data_dir.join(LOGS_DIR));

    let mut app = VidLog::open(&data_dir)
        .with_context(|| format!("failed to open {}", data_dir.display()))?;
    let out = commands::Output { json: cli.json };

    match cli.command {
        Command::List { title, channel } => commands::list(&app, &out, title, channel),
        Command::Show { id } => commands::show(&app, &out, &id),
        Command::Add(args) => commands::add(&app, &out, args).await,
        Command::Edit(args) => commands::edit(&app, &out, args),
        Command::Delete { id } => commands::delete(&app, &out, &id),
        Command::Count => commands::count(&app, &out),
        Command::Stats { title, channel } => commands::stats(&app, &out, title, channel),
        Command::Settings { action } => match action {
            SettingsAction::Show => commands::settings_show(&app, &out),
            SettingsAction::Set { key, value } => {
                commands::settings_set(&mut app, &out, &key, &value)
            }
        },
        Command::Fetch { url } => commands::fetch(&app, &out, &url).await,
        Command::Path => commands::path(&app, &out),
    }
}
