use crate::output::print_json;
use anyhow::Context;
use stagewise_core::{io, report::WeeklyReport, types::parse_date};
use std::path::Path;

pub fn run(
    root: &Path,
    week: Option<&str>,
    output: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let store = super::open_store(root)?;
    let today = super::today();
    let week_of = match week.map(str::trim) {
        None | Some("") => today,
        Some(raw) => parse_date(raw).with_context(|| format!("invalid week '{raw}'"))?,
    };

    let report = WeeklyReport::build(&store.project_views(), &store.settings(), week_of, today);

    if json {
        return print_json(&report);
    }

    let text = report.render_text(chrono::Local::now().naive_local());
    match output {
        None => print!("{text}"),
        Some(path) => {
            let target = if path.is_dir() {
                path.join(report.file_name())
            } else {
                path.to_path_buf()
            };
            io::atomic_write(&target, text.as_bytes())
                .with_context(|| format!("failed to write {}", target.display()))?;
            println!("wrote {}", target.display());
        }
    }
    Ok(())
}
