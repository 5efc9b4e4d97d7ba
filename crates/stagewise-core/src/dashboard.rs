use crate::progress::ProgressState;
use crate::project::ProjectView;
use crate::resources::{
    project_breakdown, stages_needing_resources, ProjectResources, ResourceLedger, UnstaffedStage,
};
use crate::settings::Settings;
use crate::timeline::{PlanningProject, PortfolioHealth, ProjectTimeline};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Project counts by progress bucket and the mean overall progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_projects: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub not_started: usize,
    pub average_progress: f64,
}

impl PortfolioSummary {
    pub fn of(views: &[ProjectView]) -> Self {
        let mut summary = PortfolioSummary {
            total_projects: views.len(),
            ..Default::default()
        };
        let mut progress_sum = 0.0;
        for view in views {
            let progress = view.overall_progress();
            progress_sum += progress;
            match ProgressState::of(progress) {
                ProgressState::NotStarted => summary.not_started += 1,
                ProgressState::InProgress => summary.in_progress += 1,
                ProgressState::Completed => summary.completed += 1,
            }
        }
        if !views.is_empty() {
            summary.average_progress = progress_sum / views.len() as f64;
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: u64,
    pub name: String,
    pub progress: f64,
    pub state: ProgressState,
    pub stage_count: usize,
    pub task_count: usize,
    /// Absent while the project is being planned.
    pub timeline: Option<ProjectTimeline>,
}

/// The all-projects overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub summary: PortfolioSummary,
    pub resources: ResourceLedger,
    pub stages_needing_resources: Vec<UnstaffedStage>,
    pub project_resources: Vec<ProjectResources>,
    pub on_track: usize,
    pub at_risk: usize,
    pub behind: usize,
    pub overdue: usize,
    pub planning: Vec<PlanningProject>,
    pub projects: Vec<ProjectRow>,
}

impl Dashboard {
    pub fn build(views: &[ProjectView], settings: &Settings, today: NaiveDate) -> Self {
        let health = PortfolioHealth::assess(views, today);
        let projects = views
            .iter()
            .map(|v| {
                let progress = v.overall_progress();
                ProjectRow {
                    id: v.project.id,
                    name: v.project.name.clone(),
                    progress,
                    state: ProgressState::of(progress),
                    stage_count: v.stages.len(),
                    task_count: v.tasks.len(),
                    timeline: health
                        .timelines
                        .iter()
                        .find(|t| t.project_id == v.project.id)
                        .cloned(),
                }
            })
            .collect();

        Self {
            summary: PortfolioSummary::of(views),
            resources: ResourceLedger::global(views, settings),
            stages_needing_resources: stages_needing_resources(views),
            project_resources: project_breakdown(views),
            on_track: health.on_track,
            at_risk: health.at_risk,
            behind: health.behind,
            overdue: health.overdue,
            planning: health.planning,
            projects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{Project, Stage};

    fn view(id: u64, progress: &[(u32, u32)], dated: bool) -> ProjectView {
        let date = |d| NaiveDate::from_ymd_opt(2024, 1, d);
        ProjectView {
            project: Project {
                id,
                name: format!("P{id}"),
                description: String::new(),
                planned_weeks: 4,
                start_date: if dated { date(1) } else { None },
                end_date: if dated { date(11) } else { None },
                notes: String::new(),
                created_at: None,
            },
            stages: progress
                .iter()
                .enumerate()
                .map(|(i, &(percentage, progress))| Stage {
                    id: id * 10 + i as u64,
                    project_id: id,
                    name: format!("S{i}"),
                    description: String::new(),
                    percentage,
                    progress,
                    color: String::new(),
                    order_index: i as u32,
                    devops: 1,
                    engineers: 0,
                })
                .collect(),
            tasks: Vec::new(),
        }
    }

    #[test]
    fn summary_buckets_projects() {
        let views = vec![
            view(1, &[(100, 100)], true),
            view(2, &[(50, 50), (50, 0)], true),
            view(3, &[], false),
        ];
        let s = PortfolioSummary::of(&views);
        assert_eq!((s.completed, s.in_progress, s.not_started), (1, 1, 1));
        assert_eq!(s.total_projects, 3);
        assert!((s.average_progress - 125.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_portfolio_averages_zero() {
        assert_eq!(PortfolioSummary::of(&[]).average_progress, 0.0);
    }

    #[test]
    fn dashboard_lists_planning_and_timelines() {
        let views = vec![view(1, &[(100, 50)], true), view(2, &[(100, 0)], false)];
        let settings = Settings {
            total_devops: 4,
            total_engineers: 2,
        };
        let today = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        let d = Dashboard::build(&views, &settings, today);
        assert_eq!(d.on_track, 1);
        assert_eq!(d.planning.len(), 1);
        assert_eq!(d.planning[0].id, 2);
        assert!(d.projects[0].timeline.is_some());
        assert!(d.projects[1].timeline.is_none());
        assert_eq!(d.resources.utilized.devops, 2);
        assert_eq!(d.project_resources.len(), 2);
    }
}
