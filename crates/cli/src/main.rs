//! fetchctl entry point.
//!
//! This binary is the composition root for the workspace. Responsibilities:
//!
//! 1. **Parse configuration**: load the optional TOML file given with
//!    `--config` and validate it.
//! 2. **Wire observability**: configure `tracing-subscriber` with a JSON or
//!    pretty layer and, when configured, an OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: build the reqwest exchange and, for the
//!    stub transport, the remote-procedure handle.
//! 4. **Run one invocation cycle**: print the resulting state as JSON and
//!    exit non-zero when it carries an error.

mod commands;
mod config;
mod messages;
mod telemetry;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::commands::{Context, Transport};
use crate::config::AppConfig;
use crate::messages::LoginRequest;
use fetch::ResultState;

#[derive(Parser)]
#[command(name = "fetchctl")]
#[command(about = "Issue login API calls over JSON, binary, or remote-procedure transports", version)]
struct Cli {
    /// Path to a TOML config file (defaults are used when omitted)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the session token
    Login {
        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,

        /// Transport carrying the request
        #[arg(long, value_enum, default_value_t = Transport::Json)]
        transport: Transport,
    },

    /// Register a new account
    Register {
        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,
    },

    /// Fetch the current user's profile
    Profile,
}

fn report<T: Serialize>(state: &ResultState<T>) -> anyhow::Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(state)?);
    Ok(if state.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let _telemetry = telemetry::init(&config)?;
    let ctx = Context::new(config)?;

    match cli.command {
        Commands::Login {
            username,
            password,
            transport,
        } => {
            let state =
                commands::login(&ctx, LoginRequest { username, password }, transport).await?;
            report(&state)
        }
        Commands::Register { username, password } => {
            report(&commands::register(&ctx, LoginRequest { username, password }).await)
        }
        Commands::Profile => report(&commands::profile(&ctx).await),
    }
}
