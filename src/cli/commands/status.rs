use super::open_store;
use crate::Context;
use crate::config::Config;
use crate::errors::AppResult;
use crate::sync::background;
use crate::sync::endpoint::Endpoint;
use crate::ui::messages::{entries_word, header, warning};

pub fn handle(ctx: &mut Context) -> AppResult<()> {
    let mut store = open_store(ctx);
    let pending = store.pending_count()?;
    let backend = store.backend_kind();
    let stranded = store.stranded_in_fallback()?;

    let endpoint = Endpoint::from_config(&ctx.cfg);
    let url = match endpoint.resolve() {
        Ok(u) if endpoint.is_fixed() => format!("{u} (fixed)"),
        Ok(u) => u.to_string(),
        Err(_) => "not configured".to_string(),
    };

    header("rangelog status");
    println!("Storage    : {backend}");
    println!("Database   : {}", ctx.db_path.display());
    println!("Fallback   : {}", ctx.fallback_path.display());
    println!("Pending    : {pending}");
    println!("Sync URL   : {url}");
    println!(
        "Device id  : {}",
        ctx.cfg.device_id.as_deref().unwrap_or("not assigned yet")
    );
    println!(
        "Background : {}",
        if background::is_requested(&Config::background_marker()) {
            "sync requested"
        } else {
            "idle"
        }
    );
    if stranded > 0 {
        warning(format!(
            "{} still pending in the fallback file, not uploaded while SQLite is active.",
            entries_word(stranded)
        ));
    }
    Ok(())
}
