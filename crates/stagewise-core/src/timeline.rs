use crate::progress::{stage_ranges, StageRange};
use crate::project::{Project, ProjectView};
use crate::task::Task;
use crate::types::ScheduleStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Variance below this is "behind"; between it and zero is "at risk".
pub const BEHIND_THRESHOLD: f64 = -10.0;

/// Weeks holding at least this many due tasks are flagged as heavy.
pub const HEAVY_WEEK_TASKS: usize = 3;

// ---------------------------------------------------------------------------
// ProjectTimeline
// ---------------------------------------------------------------------------

/// Time-based health of a dated project as of `today`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTimeline {
    pub project_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i64,
    pub elapsed_days: i64,
    pub expected_progress: f64,
    pub actual_progress: f64,
    pub variance: f64,
    pub days_remaining: i64,
    pub weeks_remaining: i64,
    pub status: ScheduleStatus,
    pub is_overdue: bool,
}

impl ProjectTimeline {
    /// `None` for a project still in planning (either date missing).
    pub fn compute(view: &ProjectView, today: NaiveDate) -> Option<Self> {
        let (start, end) = view.project.schedule()?;
        Some(Self::from_parts(
            view.project.id,
            start,
            end,
            view.overall_progress(),
            today,
        ))
    }

    pub fn from_parts(
        project_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        actual_progress: f64,
        today: NaiveDate,
    ) -> Self {
        let total_days = (end - start).num_days();
        let elapsed_days = (today - start).num_days().max(0);
        let expected_progress = expected_progress(elapsed_days, total_days);
        let variance = actual_progress - expected_progress;
        let days_remaining = (end - today).num_days();

        Self {
            project_id,
            start_date: start,
            end_date: end,
            total_days,
            elapsed_days,
            expected_progress,
            actual_progress,
            variance,
            days_remaining,
            weeks_remaining: weeks_remaining(days_remaining),
            status: classify(variance),
            is_overdue: days_remaining < 0 && actual_progress < 100.0,
        }
    }
}

/// elapsed / total as a percentage clamped to 0..=100. A zero-length schedule
/// is fully expected as soon as it has started.
pub fn expected_progress(elapsed_days: i64, total_days: i64) -> f64 {
    if total_days <= 0 {
        return if elapsed_days >= 0 { 100.0 } else { 0.0 };
    }
    (elapsed_days as f64 / total_days as f64 * 100.0).clamp(0.0, 100.0)
}

pub fn classify(variance: f64) -> ScheduleStatus {
    if variance >= 0.0 {
        ScheduleStatus::OnTrack
    } else if variance >= BEHIND_THRESHOLD {
        ScheduleStatus::AtRisk
    } else {
        ScheduleStatus::Behind
    }
}

/// Whole weeks left, rounded away from zero so any partial week counts and
/// an overrun reports as negative weeks.
pub fn weeks_remaining(days_remaining: i64) -> i64 {
    let weeks = (days_remaining.abs() + 6) / 7;
    if days_remaining < 0 {
        -weeks
    } else {
        weeks
    }
}

// ---------------------------------------------------------------------------
// Portfolio health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningProject {
    pub id: u64,
    pub name: String,
    pub planned_weeks: u32,
}

impl From<&Project> for PlanningProject {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            planned_weeks: p.planned_weeks,
        }
    }
}

/// Status counts over every dated project; undated ones are listed apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioHealth {
    pub on_track: usize,
    pub at_risk: usize,
    pub behind: usize,
    pub overdue: usize,
    pub timelines: Vec<ProjectTimeline>,
    pub planning: Vec<PlanningProject>,
}

impl PortfolioHealth {
    pub fn assess(views: &[ProjectView], today: NaiveDate) -> Self {
        let mut health = PortfolioHealth::default();
        for view in views {
            let Some(timeline) = ProjectTimeline::compute(view, today) else {
                health.planning.push(PlanningProject::from(&view.project));
                continue;
            };
            match timeline.status {
                ScheduleStatus::OnTrack => health.on_track += 1,
                ScheduleStatus::AtRisk => health.at_risk += 1,
                ScheduleStatus::Behind => health.behind += 1,
            }
            if timeline.is_overdue {
                health.overdue += 1;
            }
            health.timelines.push(timeline);
        }
        health
    }
}

// ---------------------------------------------------------------------------
// Calendar insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueTask {
    #[serde(flatten)]
    pub task: Task,
    pub days_overdue: i64,
}

/// Due tasks bucketed by project week, where week `n` covers days
/// `7(n-1)+1 ..= 7n` after the start date (day 0 is week 0).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    pub tasks_by_week: BTreeMap<i64, usize>,
    pub max_tasks_per_week: usize,
    pub heavy_weeks: Vec<i64>,
}

pub fn workload(tasks: &[Task], start: NaiveDate) -> Workload {
    let mut tasks_by_week: BTreeMap<i64, usize> = BTreeMap::new();
    for due in tasks.iter().filter_map(|t| t.due_date) {
        let days = (due - start).num_days();
        *tasks_by_week.entry(ceil_div7(days)).or_default() += 1;
    }
    let max_tasks_per_week = tasks_by_week.values().copied().max().unwrap_or(0);
    let heavy_weeks = tasks_by_week
        .iter()
        .filter(|(_, &count)| count >= HEAVY_WEEK_TASKS)
        .map(|(&week, _)| week)
        .collect();
    Workload {
        tasks_by_week,
        max_tasks_per_week,
        heavy_weeks,
    }
}

fn ceil_div7(days: i64) -> i64 {
    days.div_euclid(7) + i64::from(days.rem_euclid(7) != 0)
}

/// Everything the calendar view of one project shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectCalendar {
    pub project_id: u64,
    pub timeline: Option<ProjectTimeline>,
    pub stages: Vec<StageRange>,
    pub overdue_stages: Vec<u64>,
    pub at_risk_stages: Vec<u64>,
    pub upcoming_deadlines: Vec<StageRange>,
    pub overdue_tasks: Vec<OverdueTask>,
    pub workload: Workload,
}

impl ProjectCalendar {
    pub fn build(view: &ProjectView, today: NaiveDate) -> Self {
        let timeline = ProjectTimeline::compute(view, today);
        let (stages, workload) = match view.project.schedule() {
            Some((start, end)) => (
                stage_ranges(&view.stages, start, end, today),
                workload(&view.tasks, start),
            ),
            None => (Vec::new(), Workload::default()),
        };

        let mut upcoming_deadlines: Vec<StageRange> = stages
            .iter()
            .filter(|r| r.is_upcoming_deadline())
            .cloned()
            .collect();
        upcoming_deadlines.sort_by_key(|r| (r.days_until_deadline, r.stage_id));

        let overdue_tasks = view
            .tasks
            .iter()
            .filter_map(|t| {
                t.days_overdue(today).map(|days_overdue| OverdueTask {
                    task: t.clone(),
                    days_overdue,
                })
            })
            .collect();

        Self {
            project_id: view.project.id,
            timeline,
            overdue_stages: stages.iter().filter(|r| r.is_overdue).map(|r| r.stage_id).collect(),
            at_risk_stages: stages.iter().filter(|r| r.is_at_risk).map(|r| r.stage_id).collect(),
            stages,
            upcoming_deadlines,
            overdue_tasks,
            workload,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
