//! rangelog library root.
//! Exposes the entry store, the sync engine, the CLI parser and run().

pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod store;
pub mod sync;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use std::path::PathBuf;
use tracing::debug;
use utils::path::resolve_in;

/// Loaded configuration plus the storage paths in effect for this run.
///
/// `--db` / `--fallback` only change the paths here; `cfg` stays as loaded
/// so it can be saved back without leaking the overrides.
pub struct Context {
    pub cfg: Config,
    pub db_path: PathBuf,
    pub fallback_path: PathBuf,
}

impl Context {
    pub fn new(cfg: Config, db: Option<&str>, fallback: Option<&str>) -> Self {
        let dir = Config::config_dir();
        let db_path = db
            .map(|p| resolve_in(&dir, p))
            .unwrap_or_else(|| cfg.database_path());
        let fallback_path = fallback
            .map(|p| resolve_in(&dir, p))
            .unwrap_or_else(|| cfg.fallback_path());
        Self {
            cfg,
            db_path,
            fallback_path,
        }
    }
}

/// Central command dispatcher
pub fn dispatch(cli: &Cli, ctx: &mut Context) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(ctx),
        Commands::Add { .. } => cli::commands::add::handle(&cli.command, ctx),
        Commands::List { .. } => cli::commands::list::handle(&cli.command, ctx),
        Commands::Pending { .. } => cli::commands::pending::handle(&cli.command, ctx),
        Commands::Sync { .. } => cli::commands::sync::handle(&cli.command, ctx),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, ctx),
        Commands::Status => cli::commands::status::handle(ctx),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let cfg = Config::load()?;
    let mut ctx = Context::new(cfg, cli.db.as_deref(), cli.fallback.as_deref());
    debug!(
        db = %ctx.db_path.display(),
        fallback = %ctx.fallback_path.display(),
        "storage paths resolved"
    );
    dispatch(&cli, &mut ctx)
}
