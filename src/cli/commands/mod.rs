pub mod add;
pub mod config;
pub mod init;
pub mod list;
pub mod pending;
pub mod status;
pub mod sync;

use crate::Context;
use crate::store::EntryStore;
use crate::ui::messages::warning;

/// Entry store over the resolved storage paths. Opening is deferred to first use.
pub(crate) fn open_store(ctx: &Context) -> EntryStore {
    EntryStore::new(&ctx.db_path, &ctx.fallback_path)
}

pub(crate) fn warn_if_degraded(store: &mut EntryStore) {
    if store.is_degraded() {
        warning("SQLite storage unavailable: using the fallback file for this run.");
    }
}
