use crate::output::{percent, print_json, print_table};
use stagewise_core::dashboard::Dashboard;
use stagewise_core::progress::ProgressState;
use stagewise_core::resources::ResourceLedger;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = super::open_store(root)?;
    let dashboard = Dashboard::build(&store.project_views(), &store.settings(), super::today());

    if json {
        return print_json(&dashboard);
    }

    let s = &dashboard.summary;
    println!(
        "Projects: {} ({} in progress, {} completed, {} not started)",
        s.total_projects, s.in_progress, s.completed, s.not_started
    );
    println!("Average progress: {}", percent(s.average_progress));
    println!(
        "Schedule: {} on track, {} at risk, {} behind, {} overdue",
        dashboard.on_track, dashboard.at_risk, dashboard.behind, dashboard.overdue
    );
    println!();
    print_resources(&dashboard.resources);

    if !dashboard.projects.is_empty() {
        println!();
        let rows = dashboard
            .projects
            .iter()
            .map(|p| {
                let (schedule, days_left) = match &p.timeline {
                    Some(t) => (t.status.to_string(), t.days_remaining.to_string()),
                    None => ("planning".to_string(), "-".to_string()),
                };
                vec![
                    p.id.to_string(),
                    p.name.clone(),
                    percent(p.progress),
                    state_label(p.state).to_string(),
                    schedule,
                    days_left,
                    p.task_count.to_string(),
                ]
            })
            .collect();
        print_table(
            &["ID", "NAME", "PROGRESS", "STATE", "SCHEDULE", "DAYS LEFT", "TASKS"],
            rows,
        );
    }

    if !dashboard.stages_needing_resources.is_empty() {
        println!("\nStages needing resources:");
        for stage in &dashboard.stages_needing_resources {
            println!(
                "  {} / {} ({}%)",
                stage.project_name, stage.stage_name, stage.percentage
            );
        }
    }

    Ok(())
}

fn print_resources(r: &ResourceLedger) {
    println!(
        "DevOps:    {}/{} used ({}), {} available",
        r.utilized.devops,
        r.total.devops,
        percent(r.devops_utilization),
        r.available.devops
    );
    println!(
        "Engineers: {}/{} used ({}), {} available",
        r.utilized.engineers,
        r.total.engineers,
        percent(r.engineers_utilization),
        r.available.engineers
    );
    let capacity = r
        .potential_new_stages
        .map_or_else(|| "unlimited".to_string(), |n| n.to_string());
    println!("Room for new stages: {capacity}");
}

fn state_label(state: ProgressState) -> &'static str {
    match state {
        ProgressState::NotStarted => "not started",
        ProgressState::InProgress => "in progress",
        ProgressState::Completed => "completed",
    }
}
