use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod account;
mod commands;
mod config;
mod models;
mod notify;
mod store;

use commands::{AddCommand, AuthCommand, ConfigCommand, DoneCommand, ListCommand, RemoveCommand};
use config::Config;
use models::UserId;
use notify::Toast;
use store::{FileStore, HabitStore};

#[derive(Parser)]
#[command(name = "recate")]
#[command(version)]
#[command(about = "A habit tracking CLI application", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new habit
    Add(AddCommand),

    /// Toggle today's completion for a habit
    Done(DoneCommand),

    /// Delete a habit
    Rm(RemoveCommand),

    /// List habits with current streaks
    List(ListCommand),

    /// Manage the account session
    Auth(AuthCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recate=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Add(cmd)) => {
            let mut store = open_store(&config).await;
            cmd.run(&mut store).await?;
        }
        Some(Commands::Done(cmd)) => {
            let mut store = open_store(&config).await;
            cmd.run(&mut store).await?;
        }
        Some(Commands::Rm(cmd)) => {
            let mut store = open_store(&config).await;
            cmd.run(&mut store).await?;
        }
        Some(Commands::List(cmd)) => {
            let store = open_store(&config).await;
            cmd.run(&store)?;
        }
        Some(Commands::Auth(cmd)) => {
            cmd.run(&config).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

/// Open the habit store for the identity of the stored session, or the
/// anonymous identity when nobody is logged in.
///
/// A collection that fails to load is surfaced to the user and replaced
/// with an empty one; the command still runs.
async fn open_store(config: &Config) -> HabitStore<FileStore> {
    let user = config
        .auth
        .user_id
        .clone()
        .map(UserId::new)
        .unwrap_or_else(UserId::anonymous);

    let mut store = HabitStore::new(FileStore::new(config.data_dir.clone()), Box::new(Toast), user);
    tracing::debug!("loading habits for {}", store.user());

    if let Err(e) = store.load().await {
        tracing::warn!("{}", e);
        store.notifier().notify("Failed to load habits");
    }
    store
}
