use super::{open_store, warn_if_degraded};
use crate::Context;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::sync::SyncEngine;
use crate::sync::background;
use crate::ui::messages::{entries_word, info, success, warning};

pub fn handle(cmd: &Commands, ctx: &mut Context) -> AppResult<()> {
    if let Commands::Sync { background: from_scheduler } = cmd {
        let marker = Config::background_marker();

        if *from_scheduler && !background::is_requested(&marker) {
            info("No background sync requested.");
            return Ok(());
        }

        let mut engine = SyncEngine::from_config(&ctx.cfg)?;
        let mut store = open_store(ctx);

        match engine.sync_now(&mut store) {
            Ok(outcome) => {
                warn_if_degraded(&mut store);
                // A partial ack keeps the request alive for the next scheduled run.
                if store.pending_count()? == 0 {
                    background::clear(&marker)?;
                }
                success(format!("Uploaded {}.", entries_word(outcome.uploaded)));
                Ok(())
            }
            Err(e) => {
                if let AppError::Transport { status: None, .. } = &e {
                    warning("Could not reach the collector: check the sync URL and your connection.");
                }
                if e.is_retryable() {
                    info("Entries stay pending; run `rangelog sync` again later.");
                }
                Err(e)
            }
        }
    } else {
        Ok(())
    }
}
