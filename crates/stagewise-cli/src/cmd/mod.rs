pub mod init;
pub mod project;
pub mod report;
pub mod serve;
pub mod settings;
pub mod status;
pub mod user;

use anyhow::Context;
use chrono::NaiveDate;
use stagewise_core::{config::Config, store::Store};
use std::path::Path;

/// Open the data file named by an initialized root's config.
pub(crate) fn open_store(root: &Path) -> anyhow::Result<Store> {
    let config = Config::load(root)?;
    let path = config.data_path(root);
    Store::open(&path).with_context(|| format!("failed to open {}", path.display()))
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
