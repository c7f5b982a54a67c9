use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use immocheck_core::{config::Config, record::UnitKey, store::DirectoryStore};
use std::path::Path;

#[derive(Subcommand)]
pub enum TenantSubcommand {
    /// Add a tenant, or update the occupant of an existing unit
    Add {
        #[arg(long)]
        property: String,
        #[arg(long)]
        building: Option<String>,
        #[arg(long)]
        unit: String,
        /// Occupant name; may be empty for a vacant or unknown unit
        #[arg(long, default_value = "")]
        name: String,
    },
    /// List directory records
    List {
        /// Restrict to one property
        #[arg(long)]
        property: Option<String>,
    },
    /// Look up the current occupant of a unit
    Find {
        #[arg(long)]
        property: String,
        #[arg(long)]
        building: Option<String>,
        #[arg(long)]
        unit: String,
    },
    /// Remove records, either by occupant name or by unit
    Remove {
        /// Remove every record occupied by this exact name, across all
        /// units (the legacy behavior)
        #[arg(long, conflicts_with_all = ["property", "building", "unit"])]
        name: Option<String>,
        #[arg(long, requires = "unit")]
        property: Option<String>,
        #[arg(long)]
        building: Option<String>,
        #[arg(long, requires = "property")]
        unit: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: TenantSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TenantSubcommand::Add {
            property,
            building,
            unit,
            name,
        } => add(root, property, building, unit, name, json),
        TenantSubcommand::List { property } => list(root, property.as_deref(), json),
        TenantSubcommand::Find {
            property,
            building,
            unit,
        } => find(root, property, building, unit, json),
        TenantSubcommand::Remove {
            name,
            property,
            building,
            unit,
        } => remove(root, name, property, building, unit, json),
    }
}

fn open_store(root: &Path) -> anyhow::Result<(Config, DirectoryStore)> {
    let config = Config::load(root).context("failed to load config")?;
    let store = DirectoryStore::open(root, &config).context("failed to open directory")?;
    Ok((config, store))
}

fn add(
    root: &Path,
    property: String,
    building: Option<String>,
    unit: String,
    name: String,
    json: bool,
) -> anyhow::Result<()> {
    let (config, mut store) = open_store(root)?;
    let key = UnitKey::new(property, building, unit);
    config.validate_key(&key)?;

    store
        .upsert(key.clone(), name.clone())
        .with_context(|| format!("failed to save record for {key}"))?;

    if json {
        print_json(&serde_json::json!({ "unit": key.to_string(), "occupant": name }))?;
    } else {
        println!(
            "Recorded: {key} → {}",
            if name.is_empty() { "unknown" } else { name.as_str() }
        );
    }
    Ok(())
}

fn list(root: &Path, property: Option<&str>, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_store(root)?;
    let records: Vec<_> = store
        .records()
        .iter()
        .filter(|r| property.is_none_or(|p| r.key.property == p))
        .cloned()
        .collect();

    if json {
        print_json(&records)?;
        return Ok(());
    }

    if records.is_empty() {
        println!("No records.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.key.property.clone(),
                r.key.building.clone().unwrap_or_default(),
                r.key.unit.clone(),
                r.occupant.clone(),
            ]
        })
        .collect();
    print_table(&["PROPERTY", "BUILDING", "UNIT", "OCCUPANT"], rows);
    Ok(())
}

fn find(
    root: &Path,
    property: String,
    building: Option<String>,
    unit: String,
    json: bool,
) -> anyhow::Result<()> {
    let (_, store) = open_store(root)?;
    let key = UnitKey::new(property, building, unit);
    let occupant = store.find_occupant(&key);

    if json {
        print_json(&serde_json::json!({ "unit": key.to_string(), "occupant": occupant }))?;
        return Ok(());
    }

    match occupant {
        Some(name) if !name.is_empty() => println!("{key}: {name}"),
        Some(_) => println!("{key}: occupant unknown"),
        None => println!("{key}: no record"),
    }
    Ok(())
}

fn remove(
    root: &Path,
    name: Option<String>,
    property: Option<String>,
    building: Option<String>,
    unit: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let (_, mut store) = open_store(root)?;

    let removed = match (name, property, unit) {
        (Some(name), _, _) => {
            let n = store
                .remove_by_name(&name)
                .context("failed to remove records")?;
            anyhow::ensure!(n > 0, "no record occupied by '{name}'");
            n
        }
        (None, Some(property), Some(unit)) => {
            let key = UnitKey::new(property, building, unit);
            let n = store
                .remove_by_key(&key)
                .context("failed to remove records")?;
            anyhow::ensure!(n > 0, "no record for {key}");
            n
        }
        _ => anyhow::bail!("pass either --name, or --property and --unit"),
    };

    if json {
        print_json(&serde_json::json!({ "removed": removed }))?;
    } else {
        println!("Removed {removed} record(s).");
    }
    Ok(())
}

/// `immocheck refresh` — explicit whole-table re-read, reporting the count.
pub fn refresh(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut store = DirectoryStore::open(root, &config).context("failed to open directory")?;
    store.refresh().context("failed to refresh directory")?;

    if json {
        print_json(&serde_json::json!({ "records": store.records().len() }))?;
    } else {
        println!("Directory: {} record(s).", store.records().len());
    }
    Ok(())
}
