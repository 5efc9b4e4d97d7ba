use crate::output::{date_or_dash, percent, print_json, print_table};
use clap::Subcommand;
use stagewise_core::project::{weeks_for_percentage, ProjectView};
use stagewise_core::task::{stage_task_stats, upcoming_tasks};
use stagewise_core::timeline::{ProjectCalendar, ProjectTimeline};
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum ProjectSubcommand {
    /// List all projects with overall progress
    List,
    /// Show one project with its stages and tasks
    Show { id: u64 },
    /// Stage date ranges, deadlines and weekly task load
    Timeline { id: u64 },
}

pub fn run(root: &Path, subcommand: ProjectSubcommand, json: bool) -> anyhow::Result<()> {
    let store = super::open_store(root)?;
    match subcommand {
        ProjectSubcommand::List => list(&store.project_views(), json),
        ProjectSubcommand::Show { id } => show(&store.project_view(id)?, json),
        ProjectSubcommand::Timeline { id } => timeline(&store.project_view(id)?, json),
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(views: &[ProjectView], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&views);
    }
    if views.is_empty() {
        println!("No projects.");
        return Ok(());
    }
    let rows = views
        .iter()
        .map(|v| {
            vec![
                v.project.id.to_string(),
                v.project.name.clone(),
                v.stages.len().to_string(),
                percent(v.overall_progress()),
                date_or_dash(v.project.start_date),
                date_or_dash(v.project.end_date),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "STAGES", "PROGRESS", "START", "END"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(view: &ProjectView, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(view);
    }
    let p = &view.project;
    println!("{} (#{})", p.name, p.id);
    if !p.description.is_empty() {
        println!("{}", p.description);
    }
    println!("Progress: {}", percent(view.overall_progress()));
    match p.schedule() {
        Some((start, end)) => println!("Schedule: {start} to {end}"),
        None => println!("Schedule: planning ({} weeks)", p.planned_weeks),
    }

    if !view.stages.is_empty() {
        println!();
        let rows = view
            .stages
            .iter()
            .map(|s| {
                let stats = stage_task_stats(&view.tasks, s.id);
                vec![
                    s.id.to_string(),
                    s.name.clone(),
                    format!("{}%", s.percentage),
                    format!("{:.1}", weeks_for_percentage(s.percentage, p.planned_weeks)),
                    format!("{}%", s.progress),
                    format!("{}/{}", s.devops, s.engineers),
                    format!("{}/{}", stats.done, stats.total),
                ]
            })
            .collect();
        print_table(
            &["ID", "STAGE", "WEIGHT", "WEEKS", "PROGRESS", "DEVOPS/ENG", "TASKS"],
            rows,
        );
    }

    if !view.tasks.is_empty() {
        println!();
        let rows = view
            .tasks
            .iter()
            .map(|t| {
                let stage = view
                    .stage(t.stage_id)
                    .map_or_else(|| "-".to_string(), |s| s.name.clone());
                vec![
                    t.id.to_string(),
                    t.title.clone(),
                    stage,
                    t.status.label().to_string(),
                    date_or_dash(t.due_date),
                ]
            })
            .collect();
        print_table(&["ID", "TASK", "STAGE", "STATUS", "DUE"], rows);
    }

    if !p.notes.is_empty() {
        println!("\nNotes:\n{}", p.notes);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// timeline
// ---------------------------------------------------------------------------

fn timeline(view: &ProjectView, json: bool) -> anyhow::Result<()> {
    let today = super::today();
    let calendar = ProjectCalendar::build(view, today);
    if json {
        return print_json(&calendar);
    }

    let Some(t) = &calendar.timeline else {
        println!(
            "{} has no schedule yet (planning, {} weeks).",
            view.project.name, view.project.planned_weeks
        );
        return Ok(());
    };
    print_schedule(t);

    println!();
    let rows = calendar
        .stages
        .iter()
        .map(|s| {
            let flag = if s.is_overdue {
                "overdue"
            } else if s.is_at_risk {
                "at risk"
            } else if s.is_upcoming_deadline() {
                "due soon"
            } else {
                ""
            };
            vec![
                s.name.clone(),
                s.start.to_string(),
                s.end.to_string(),
                format!("{}%", s.progress),
                s.days_until_deadline.to_string(),
                flag.to_string(),
            ]
        })
        .collect();
    print_table(&["STAGE", "START", "END", "PROGRESS", "DAYS", "FLAG"], rows);

    if !calendar.overdue_tasks.is_empty() {
        println!("\nOverdue tasks:");
        for o in &calendar.overdue_tasks {
            println!("  #{} {} ({} days overdue)", o.task.id, o.task.title, o.days_overdue);
        }
    }
    let upcoming = upcoming_tasks(&view.tasks, today, Some(5));
    if !upcoming.is_empty() {
        println!("\nUpcoming tasks:");
        for t in upcoming {
            println!("  #{} {} (due {})", t.id, t.title, date_or_dash(t.due_date));
        }
    }
    if !calendar.workload.heavy_weeks.is_empty() {
        let weeks: Vec<String> = calendar
            .workload
            .heavy_weeks
            .iter()
            .map(i64::to_string)
            .collect();
        println!("\nHeavy weeks: {}", weeks.join(", "));
    }
    Ok(())
}

fn print_schedule(t: &ProjectTimeline) {
    println!("Schedule:  {} to {} ({} days)", t.start_date, t.end_date, t.total_days);
    println!(
        "Progress:  {} actual, {} expected ({:+.1})",
        percent(t.actual_progress),
        percent(t.expected_progress),
        t.variance
    );
    println!(
        "Status:    {} ({} days, {} weeks remaining)",
        t.status, t.days_remaining, t.weeks_remaining
    );
}
