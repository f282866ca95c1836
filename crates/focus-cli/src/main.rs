mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use focus_core::config::host_log_path;

#[derive(Parser)]
#[command(name = "focus")]
#[command(about = "Closes browser tabs that drift away from your study topic", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize focus (first-time setup)
    Init {
        /// Study topic to start with
        #[arg(short, long)]
        topic: Option<String>,
    },
    /// Show or change the study topic
    Topic {
        #[command(subcommand)]
        action: Option<TopicAction>,
    },
    /// Manage AI backend configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Classify a page against the study topic and record the verdict
    Analyze {
        /// URL of the page
        url: String,
        /// Judge against this topic instead of the stored one
        #[arg(short, long)]
        topic: Option<String>,
        /// Read HTML from a file instead of downloading the URL
        #[arg(short, long)]
        file: Option<std::path::PathBuf>,
        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show recorded navigations or analyses
    History {
        /// Number of rows to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
        /// Show analysed pages instead of navigations
        #[arg(short, long)]
        analyses: bool,
    },
    /// (Internal) Run the native-messaging host on stdin/stdout
    #[command(hide = true)]
    Host,
}

#[derive(Subcommand, Debug)]
enum TopicAction {
    /// Print the current study topic
    Show,
    /// Set the study topic (overrides the one the extension sends)
    Set { topic: String },
    /// Remove the saved study topic
    Clear,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Get a configuration value (e.g. ai.provider)
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// Show all configuration values
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Host) {
        setup_host_logging()?;
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp_secs()
            .init();
    }

    match cli.command {
        Commands::Init { topic } => commands::init::init_command(topic.as_deref()),
        Commands::Topic { action } => match action.unwrap_or(TopicAction::Show) {
            TopicAction::Show => commands::topic::handle_topic_show(),
            TopicAction::Set { topic } => commands::topic::handle_topic_set(&topic),
            TopicAction::Clear => commands::topic::handle_topic_clear(),
        },
        Commands::Config { action } => match action {
            ConfigAction::Get { key } => commands::config::handle_config_get(&key),
            ConfigAction::Set { key, value } => commands::config::handle_config_set(&key, &value),
            ConfigAction::Show => commands::config::handle_config_show().await,
        },
        Commands::Analyze {
            url,
            topic,
            file,
            json,
        } => {
            commands::analyze::analyze_command(&url, topic.as_deref(), file.as_deref(), json).await
        }
        Commands::History { limit, analyses } => {
            if analyses {
                commands::history::show_analyses(limit)
            } else {
                commands::history::show_navigations(limit)
            }
        }
        Commands::Host => commands::host::host_command().await,
    }
}

/// Stdout carries native-messaging frames, so the host logs to a file
fn setup_host_logging() -> Result<()> {
    use std::fs::{create_dir_all, OpenOptions};

    let log_path = host_log_path()?;
    if let Some(parent) = log_path.parent() {
        create_dir_all(parent)?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .format_timestamp_secs()
        .init();

    Ok(())
}
