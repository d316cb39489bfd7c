use crate::Context;
use crate::config::Config;
use crate::db::DbPool;
use crate::db::migrate::applied_versions;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use std::fs;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (kept as is when it already exists)
///  - the SQLite database and its schema
pub fn handle(ctx: &mut Context) -> AppResult<()> {
    let dir = Config::config_dir();
    fs::create_dir_all(&dir)?;

    let conf = Config::config_file();
    if conf.exists() {
        info(format!("Config file : {} (kept)", conf.display()));
    } else {
        ctx.cfg.save()?;
        success(format!("Config file : {}", conf.display()));
    }

    if let Some(parent) = ctx.db_path.parent() {
        fs::create_dir_all(parent)?;
    }

    match DbPool::open(&ctx.db_path) {
        Ok(pool) => {
            let versions = applied_versions(&pool.conn)?;
            success(format!(
                "Database    : {} (schema {})",
                ctx.db_path.display(),
                versions.last().map(String::as_str).unwrap_or("-")
            ));
        }
        Err(e) => {
            warning(format!(
                "Cannot open SQLite database {} ({}). Entries will be kept in {}.",
                ctx.db_path.display(),
                e,
                ctx.fallback_path.display()
            ));
        }
    }

    info("rangelog initialization completed.");
    Ok(())
}
