//! Loyalty CLI - Main entry point

use clap::{Parser, Subcommand};
use loyalty_rpc::{commands, AppConfig, AppContext, Response};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "loyalty")]
#[command(about = "Loyalty points ledger", long_about = None)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory path (overrides the config file)
    #[arg(short, long)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the program: supply, sequence counter and ACL
    Init {
        /// Policy document (JSON list of function grants)
        #[arg(long)]
        policy: PathBuf,
        /// Caller attributes file
        #[arg(long)]
        caller: PathBuf,
    },

    /// Invoke a ledger function
    Invoke {
        /// Caller attributes file
        #[arg(long)]
        caller: PathBuf,
        /// Function name, e.g. requestRewardPoints
        function: String,
        /// Positional arguments, in call order
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Print the event log
    Events {
        /// Only events with this name
        #[arg(long)]
        name: Option<String>,
    },

    /// Compute the SHA-256 digest of a receipt file
    Digest {
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(data) = cli.data {
        config.data_dir = data;
    }
    config.ledger = config.ledger.with_env_overrides()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Digest { file } => {
            println!("{}", commands::digest(&file)?);
        }

        Commands::Events { name } => {
            let ctx = AppContext::new(&config)?;
            for event in commands::events(&ctx, name.as_deref())? {
                println!("{}", serde_json::to_string(&event)?);
            }
        }

        Commands::Init { policy, caller } => {
            let caller = commands::load_caller(&caller)?;
            let mut ctx = AppContext::new(&config)?;
            let response = commands::init(&mut ctx, &caller, &policy)?;
            respond(&response)?;
        }

        Commands::Invoke {
            caller,
            function,
            args,
        } => {
            let caller = commands::load_caller(&caller)?;
            let mut ctx = AppContext::new(&config)?;
            let response = commands::invoke(&mut ctx, &caller, &function, &args);
            respond(&response)?;
        }
    }

    Ok(())
}

fn respond(response: &Response) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    if !response.is_ok() {
        std::process::exit(1);
    }
    Ok(())
}
