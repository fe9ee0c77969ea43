//! CinderKV CLI
//!
//! Command-line interface operating directly on a local data directory.

use std::process;

use cinderkv::{Command, Config, Engine, Reply};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// CinderKV CLI
#[derive(Parser, Debug)]
#[command(name = "cinderkv-cli")]
#[command(about = "CLI for the CinderKV key-value store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./cinderkv_data")]
    data_dir: String,

    /// Skip the vacuum normally run when the store is closed
    #[arg(long)]
    no_vacuum_on_close: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Print the number of live keys
    Size,

    /// Compact the data log
    Vacuum,
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Get { key } => Command::Get {
                key: key.into_bytes(),
            },
            Commands::Put { key, value } => Command::Put {
                key: key.into_bytes(),
                value: value.into_bytes(),
            },
            Commands::Del { key } => Command::Delete {
                key: key.into_bytes(),
            },
            Commands::Size => Command::Size,
            Commands::Vacuum => Command::Vacuum,
        }
    }
}

fn main() {
    // Initialize tracing/logging (stderr, so replies on stdout stay clean)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cinderkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("CinderKV CLI v{}", cinderkv::VERSION);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .vacuum_on_close(!args.no_vacuum_on_close)
        .build();

    let engine = match Engine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            process::exit(1);
        }
    };

    let result = engine.execute(args.command.into());
    engine.close();

    match result {
        Ok(Reply::Value(Some(value))) => println!("{}", String::from_utf8_lossy(&value)),
        Ok(Reply::Value(None)) => println!("(nil)"),
        Ok(Reply::Size(count)) => println!("{}", count),
        Ok(Reply::Done) => println!("OK"),
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            process::exit(1);
        }
    }
}
