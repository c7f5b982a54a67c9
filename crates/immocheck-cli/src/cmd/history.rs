use crate::output::{print_json, print_table};
use anyhow::Context;
use immocheck_core::ledger;
use std::path::Path;

pub fn run(root: &Path, limit: usize, json: bool) -> anyhow::Result<()> {
    let entries = ledger::recent(root, limit).context("failed to read history")?;

    if json {
        print_json(&entries)?;
        return Ok(());
    }

    if entries.is_empty() {
        println!("No history yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            vec![
                e.recorded_at.format("%Y-%m-%d %H:%M").to_string(),
                e.key.to_string(),
                e.occupant.clone(),
                e.liability.to_string(),
                e.note.clone(),
            ]
        })
        .collect();
    print_table(&["DATE", "UNIT", "OCCUPANT", "VERDICT", "NOTE"], rows);
    Ok(())
}
