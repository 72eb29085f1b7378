//! Terminal host for the OwnSphere client engine.
//!
//! Configuration comes from `OWNSPHERE_*` variables (a `.env` file is honored).
//! Session and market preferences persist in the client store under
//! `OWNSPHERE_DATA_DIR`, so a login survives between invocations.

mod commands;
mod config;
mod main_lib;
mod render;

use clap::Parser;
use commands::Command;
use config::Config;
use main_lib::{build_state, init_tracing};

#[derive(Parser, Debug)]
#[command(name = "ownsphere")]
#[command(about = "OwnSphere client: session, account and market feed")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing();
    let config = Config::from_env()?;
    let state = build_state(&config)?;

    let result = commands::run(&state, args.command).await;
    state.market.shutdown();
    state.connection.shutdown();
    result
}
