use anyhow::Context;
use stagewise_core::{config::Config, io, paths, store::Store};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing stagewise in: {}", root.display());

    let dir = paths::stagewise_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    if !config_path.exists() {
        Config::default()
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    // An existing config may point the data file somewhere else.
    let config = Config::load(root)?;
    let data_path = config.data_path(root);
    let existed = data_path.exists();
    Store::open(&data_path)
        .with_context(|| format!("failed to open {}", data_path.display()))?;
    let shown = data_path.strip_prefix(root).unwrap_or(&data_path);
    if existed {
        println!("  exists:  {}", shown.display());
    } else {
        println!("  created: {}", shown.display());
    }

    for warning in config.validate() {
        println!("  warning: {}", warning.message);
    }

    println!("\nRun 'stagewise serve' to start the API.");
    Ok(())
}
