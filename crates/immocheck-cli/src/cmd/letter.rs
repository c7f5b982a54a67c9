use crate::output::print_json;
use anyhow::Context;
use immocheck_core::config::Config;
use immocheck_core::letter::{render, LetterInput, LetterKind};
use immocheck_core::record::UnitKey;
use immocheck_core::store::DirectoryStore;
use immocheck_core::verdict::Liability;
use std::path::Path;

pub struct LetterArgs {
    pub kind: String,
    pub property: String,
    pub building: Option<String>,
    pub unit: String,
    pub occupant: Option<String>,
    pub issue: String,
    pub liability: String,
}

pub fn run(root: &Path, args: LetterArgs, json: bool) -> anyhow::Result<()> {
    anyhow::ensure!(!args.issue.trim().is_empty(), "--issue must not be empty");

    let config = Config::load(root).context("failed to load config")?;
    let key = UnitKey::new(args.property, args.building, args.unit);
    config.validate_key(&key)?;

    let kind: LetterKind = args.kind.parse()?;
    let liability: Liability = args.liability.parse()?;

    // Occupant comes from the directory unless the agent overrides it.
    let occupant = match args.occupant {
        Some(name) => name,
        None => {
            let store =
                DirectoryStore::open(root, &config).context("failed to open directory")?;
            store.find_occupant(&key).unwrap_or_default().to_string()
        }
    };

    let text = render(&LetterInput {
        kind,
        occupant,
        key,
        issue: args.issue,
        liability,
        date: chrono::Utc::now(),
    });

    if json {
        print_json(&serde_json::json!({ "letter": text }))?;
    } else {
        println!("{text}");
    }
    Ok(())
}
