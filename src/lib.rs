//! rpresence library root.
//! Exposes CLI parser, high-level run() function, and internal modules.

pub mod backend;
pub mod bridge;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub async fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::Login => cli::commands::login::handle(cfg).await,
        Commands::Verify { .. } => cli::commands::verify::handle(&cli.command, cfg).await,
        Commands::Status => cli::commands::status::handle(cfg),
        Commands::Boost => cli::commands::boost::handle(cfg),
        Commands::Session { .. } => cli::commands::session::handle(&cli.command, cfg).await,
        Commands::Simulate { .. } => cli::commands::simulate::handle(&cli.command, cfg),
        Commands::Buy { .. } => cli::commands::buy::handle(&cli.command, cfg).await,
        Commands::Tx { .. } => cli::commands::tx::handle(&cli.command, cfg).await,
        Commands::History { .. } => cli::commands::history::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // Config is loaded once and then only overridden from the command line
    let mut cfg = Config::load()?;

    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }
    if cli.dev_cancel {
        cfg.dev_cancel = true;
    }

    dispatch(&cli, &cfg).await
}
