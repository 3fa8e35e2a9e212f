//! # chat-cli
//!
//! Interactive terminal client for chatsync.
//!
//! Starts a session, polls the backend for differences on a fixed
//! interval, and prints new messages as they arrive. Lines starting with a
//! backslash are commands; everything else is ignored.
//!
//! ## Commands
//!
//! - `\me`: Show the logged-in account
//! - `\contacts`: Show the contact list
//! - `\umsg <id> <message>`: Send a message to a user
//! - `\cmsg <id> <message>`: Send a message to a chat
//! - `\help`: Show the command list
//! - `\quit`: Quit
//!
//! ## Example
//!
//! ```bash
//! chat-cli --poll-interval 2
//! ```
//!
//! The binary currently runs against a canned in-process backend; the real
//! wire transport plugs in behind the same `Backend` trait.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod demo;

use chat_client::{help_text, parse_command, Command, MockBackend, Session, SessionDriver};
use config::AppConfig;

/// Interactive terminal client for chatsync.
#[derive(Parser, Debug)]
#[command(name = "chat-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for configuration and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Seconds between polling ticks (overrides the config file)
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Log file path (overrides the config file)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    let config = AppConfig::load(&data_dir).await?;
    let poll_interval =
        Duration::from_secs(cli.poll_interval.unwrap_or(config.poll_interval_secs).max(1));
    let log_path = cli.log_file.unwrap_or_else(|| config.log_path(&data_dir));
    init_logging(&log_path)?;
    info!(?data_dir, ?poll_interval, "starting chat-cli");

    let mut session = Session::new(demo::backend());
    if let Err(error) = startup(&mut session).await {
        eprintln!("{:#}", error);
        std::process::exit(2);
    }

    let (driver, handle, mut output) = SessionDriver::new(session, poll_interval);

    let printer = tokio::spawn(async move {
        while let Some(line) = output.recv().await {
            println!("{}", line);
        }
    });

    let input_handle = handle.clone();
    let input = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(command) = parse_command(&line) {
                if !input_handle.send_command(command).await {
                    break;
                }
            }
        }
    });

    let signal_handle = handle.clone();
    let signals = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_handle.stop().await;
        }
    });

    let result = driver.run().await;
    input.abort();
    signals.abort();
    let _ = printer.await;

    match result {
        Ok(_) => {
            println!("Bye");
            Ok(())
        }
        Err(error) => {
            eprintln!("fatal: {}", error);
            std::process::exit(2);
        }
    }
}

/// Connect and show the startup banner: account summary, contact count,
/// and the command list. Any failure here is fatal.
async fn startup(session: &mut Session<MockBackend>) -> Result<()> {
    session.connect().await.context("Failed to connect")?;
    println!("Welcome to chatsync");

    let me = Command {
        name: "me".to_string(),
        arguments: String::new(),
    };
    if let chat_client::CommandOutcome::Output(summary) =
        session.dispatch(&me).await.context("Failed to load account")?
    {
        println!("{}", summary);
    }

    let count = session
        .load_contacts()
        .await
        .context("Failed to load contacts")?;
    println!("Loaded {} contacts", count);
    println!("{}", help_text());
    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(file)
        .with_ansi(false)
        .init();
    Ok(())
}

/// Get the default data directory for chat-cli.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "chatsync", "chat-cli")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
