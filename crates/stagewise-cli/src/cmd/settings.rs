use crate::output::print_json;
use anyhow::bail;
use clap::Subcommand;
use stagewise_core::settings::{Settings, SettingsPatch};
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum SettingsSubcommand {
    /// Show the company resource pool
    Show,
    /// Change the pool size; omitted totals keep their value
    Set {
        #[arg(long)]
        devops: Option<u32>,
        #[arg(long)]
        engineers: Option<u32>,
    },
}

pub fn run(root: &Path, subcommand: SettingsSubcommand, json: bool) -> anyhow::Result<()> {
    let mut store = super::open_store(root)?;
    let settings = match subcommand {
        SettingsSubcommand::Show => store.settings(),
        SettingsSubcommand::Set { devops, engineers } => {
            if devops.is_none() && engineers.is_none() {
                bail!("nothing to set: pass --devops and/or --engineers");
            }
            store.patch_settings(&SettingsPatch {
                total_devops: devops,
                total_engineers: engineers,
            })?
        }
    };

    if json {
        print_json(&settings)
    } else {
        print_settings(&settings);
        Ok(())
    }
}

fn print_settings(settings: &Settings) {
    println!("DevOps:    {}", settings.total_devops);
    println!("Engineers: {}", settings.total_engineers);
}
