use std::path::{Path, PathBuf};

pub const STAGEWISE_DIR: &str = ".stagewise";
pub const CONFIG_FILE: &str = ".stagewise/config.yaml";
pub const DEFAULT_DATA_FILE: &str = "data.json";

pub fn stagewise_dir(root: &Path) -> PathBuf {
    root.join(STAGEWISE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve the data file named in the config relative to `.stagewise/`.
pub fn data_path(root: &Path, data_file: &str) -> PathBuf {
    stagewise_dir(root).join(data_file)
}

/// File name offered for a downloaded weekly report.
pub fn report_file_name(week_start: chrono::NaiveDate) -> String {
    format!("weekly-report-{}.txt", week_start.format("%Y-%m-%d"))
}
