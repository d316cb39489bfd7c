use super::{open_store, warn_if_degraded};
use crate::Context;
use crate::cli::parser::Commands;
use crate::errors::AppResult;
use crate::models::Entry;
use crate::ui::messages::{entries_word, info};
use crate::utils::table::{Column, Table};
use crate::utils::time::format_millis;

pub fn handle(cmd: &Commands, ctx: &mut Context) -> AppResult<()> {
    if let Commands::Pending { count } = cmd {
        let mut store = open_store(ctx);

        if *count {
            println!("{}", store.pending_count()?);
            return Ok(());
        }

        let mut pending = store.list_pending()?;
        warn_if_degraded(&mut store);

        if pending.is_empty() {
            info("Nothing pending: every entry has been synced.");
            return Ok(());
        }

        pending.sort_by_key(|e| e.id);
        print!("{}", render(&pending));
        info(format!("{} waiting for sync.", entries_word(pending.len())));
    }
    Ok(())
}

fn render(pending: &[Entry]) -> String {
    let mut table = Table::new(vec![
        Column::new("ID"),
        Column::new("Recorded"),
        Column::new("Odometer"),
        Column::new("Range"),
        Column::new("Notes"),
    ]);

    for e in pending {
        let mut notes = e.notes.clone();
        if e.charged {
            notes = if notes.is_empty() {
                "Charged".to_string()
            } else {
                format!("Charged • {notes}")
            };
        }
        table.add_row(vec![
            format!("#{}", e.id),
            format_millis(e.created_at),
            format!("{} km", e.odometer),
            format!("{} km", e.predicted_range),
            notes,
        ]);
    }

    table.render()
}
