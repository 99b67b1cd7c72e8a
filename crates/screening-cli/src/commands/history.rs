//! The `screening history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use screening_core::anticheat::EventTally;
use screening_core::traits::AssessmentStore;
use screening_providers::config::create_store;

pub async fn execute(email: String, show_events: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = screening_providers::load_config_from(config_path.as_deref())?;
    let store = create_store(&config.store)?;

    let results = store.results_for(&email).await?;
    let events = store.events_for(&email).await?;

    if results.is_empty() {
        println!("No results for {email}");
    } else {
        let mut table = Table::new();
        table.set_header(vec![
            "Date", "Score", "Status", "Correct", "Wrong", "Duration",
        ]);
        for r in &results {
            table.add_row(vec![
                Cell::new(r.created_at.format("%Y-%m-%d %H:%M")),
                Cell::new(format!("{}%", r.score)),
                Cell::new(r.status),
                Cell::new(r.correct),
                Cell::new(r.wrong),
                Cell::new(format!("{}m {}s", r.duration / 60, r.duration % 60)),
            ]);
        }
        println!("{table}");
    }

    let tally = EventTally::from_events(&events);
    if tally.total == 0 {
        println!("No anti-cheat events");
    } else {
        let summary: Vec<String> = tally
            .by_type
            .iter()
            .map(|(kind, n)| format!("{kind}={n}"))
            .collect();
        println!("Anti-cheat events: {} ({})", tally.total, summary.join(", "));
    }

    if show_events && !events.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Time", "Event"]);
        for e in &events {
            table.add_row(vec![
                Cell::new(e.occurred_at.format("%Y-%m-%d %H:%M:%S")),
                Cell::new(&e.event_type),
            ]);
        }
        println!("{table}");
    }

    Ok(())
}
