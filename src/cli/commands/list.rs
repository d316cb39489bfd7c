use super::{open_store, warn_if_degraded};
use crate::Context;
use crate::cli::parser::Commands;
use crate::errors::AppResult;
use crate::models::Entry;
use crate::ui::messages::info;
use crate::utils::colors::{colorize_sync, optional_value};
use crate::utils::table::{Column, Table};
use crate::utils::time::format_dt;

pub fn handle(cmd: &Commands, ctx: &mut Context) -> AppResult<()> {
    if let Commands::List { limit } = cmd {
        let limit = limit.unwrap_or(ctx.cfg.list_limit);

        let mut store = open_store(ctx);
        let entries = store.list_entries(limit)?;
        warn_if_degraded(&mut store);

        if entries.is_empty() {
            info("No entries recorded yet.");
            return Ok(());
        }

        print!("{}", render(&entries));
    }
    Ok(())
}

fn render(entries: &[Entry]) -> String {
    let mut table = Table::new(vec![
        Column::new("ID"),
        Column::new("When"),
        Column::new("Odometer"),
        Column::new("Range"),
        Column::new("SoC"),
        Column::new("Charged"),
        Column::new("Status"),
    ]);

    for e in entries {
        table.add_row(vec![
            format!("#{}", e.id),
            format_dt(&e.dt),
            format!("{} km", e.odometer),
            format!("{} km", e.predicted_range),
            optional_value(e.soc, "%"),
            if e.charged { "yes".into() } else { "".into() },
            colorize_sync(&e.sync),
        ]);
    }

    table.render()
}
