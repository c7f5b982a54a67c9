use anyhow::Context;
use immocheck_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "agency".to_string());

    println!("Initializing ImmoCheck in: {}", root.display());

    let dir = paths::immocheck_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let config = Config::new(&project_name);
        config.save(root).context("failed to write config.yaml")?;
        println!("  created: .immocheck/config.yaml");
    } else {
        println!("  exists:  .immocheck/config.yaml");
    }

    // Empty mirror so the file backend starts from a readable table.
    let mirror = paths::mirror_path(root);
    if io::write_if_missing(&mirror, b"records: []\n")? {
        println!("  created: .immocheck/directory.yaml");
    } else {
        println!("  exists:  .immocheck/directory.yaml");
    }

    println!("\nNext steps:");
    println!("  immocheck tenant add --property Canterane --building A --unit 10 --name Jean");
    println!("  immocheck ui");
    Ok(())
}
