use super::{open_store, warn_if_degraded};
use crate::Context;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::NewEntry;
use crate::sync::background::try_background_sync;
use crate::ui::messages::success;
use crate::utils::time::{now_dt, parse_dt};

/// Record a new measurement.
pub fn handle(cmd: &Commands, ctx: &mut Context) -> AppResult<()> {
    if let Commands::Add {
        odometer,
        range,
        soc,
        charged,
        notes,
        lat,
        lng,
        dt,
    } = cmd
    {
        //
        // 1. Measurement time: user intent, defaults to now
        //
        let dt = match dt {
            Some(s) => parse_dt(s)?,
            None => now_dt(),
        };

        //
        // 2. Build the record (the store validates it)
        //
        let entry = NewEntry {
            dt,
            odometer: *odometer,
            predicted_range: *range,
            soc: *soc,
            charged: *charged,
            notes: notes.trim().to_string(),
            lat: *lat,
            lng: *lng,
            device_id: ctx.cfg.ensure_device_id()?,
        };

        //
        // 3. Persist locally
        //
        let mut store = open_store(ctx);
        let id = store.add(entry)?;
        warn_if_degraded(&mut store);
        success(format!("Saved locally as #{id}."));

        //
        // 4. Ask for a deferred upload (best-effort)
        //
        try_background_sync(&Config::background_marker());
    }

    Ok(())
}
