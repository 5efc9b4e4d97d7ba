use crate::error::{Result, StagewiseError};
use crate::project::ProjectView;
use crate::types::{optional_date, patch_date, TaskStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub project_id: u64,
    pub stage_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "optional_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Past its due date and not done. Tasks without a due date are never overdue.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_done() && self.due_date.is_some_and(|due| due < today)
    }

    pub fn days_overdue(&self, today: NaiveDate) -> Option<i64> {
        if !self.is_overdue(today) {
            return None;
        }
        self.due_date.map(|due| (today - due).num_days())
    }

    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        !self.is_done() && self.due_date.is_some_and(|due| due >= today)
    }
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub project_id: u64,
    pub stage_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "optional_date")]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub stage_id: Option<u64>,
    #[serde(default, deserialize_with = "patch_date")]
    pub due_date: Option<Option<NaiveDate>>,
}

pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(StagewiseError::validation("task title is required"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Counts over a task collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    pub overdue: usize,
    /// done / total × 100, or 0 for an empty collection.
    pub completion_rate: f64,
}

pub fn summarize<'a>(tasks: impl IntoIterator<Item = &'a Task>, today: NaiveDate) -> TaskSummary {
    let mut summary = TaskSummary::default();
    for task in tasks {
        summary.total += 1;
        match task.status {
            TaskStatus::Todo => summary.todo += 1,
            TaskStatus::InProgress => summary.in_progress += 1,
            TaskStatus::Done => summary.done += 1,
        }
        if task.is_overdue(today) {
            summary.overdue += 1;
        }
    }
    summary.completion_rate = if summary.total > 0 {
        summary.done as f64 / summary.total as f64 * 100.0
    } else {
        0.0
    };
    summary
}

pub fn group_by_stage<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> BTreeMap<u64, Vec<&'a Task>> {
    let mut groups: BTreeMap<u64, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        groups.entry(task.stage_id).or_default().push(task);
    }
    groups
}

/// Open tasks due today or later, soonest first. `limit` caps the result.
pub fn upcoming_tasks<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    today: NaiveDate,
    limit: Option<usize>,
) -> Vec<&'a Task> {
    let mut upcoming: Vec<&Task> = tasks.into_iter().filter(|t| t.is_upcoming(today)).collect();
    upcoming.sort_by_key(|t| (t.due_date, t.id));
    if let Some(limit) = limit {
        upcoming.truncate(limit);
    }
    upcoming
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTaskStats {
    pub total: usize,
    pub done: usize,
    pub in_progress: usize,
}

pub fn stage_task_stats<'a>(tasks: impl IntoIterator<Item = &'a Task>, stage_id: u64) -> StageTaskStats {
    let mut stats = StageTaskStats::default();
    for task in tasks.into_iter().filter(|t| t.stage_id == stage_id) {
        stats.total += 1;
        match task.status {
            TaskStatus::Done => stats.done += 1,
            TaskStatus::InProgress => stats.in_progress += 1,
            TaskStatus::Todo => {}
        }
    }
    stats
}

// ---------------------------------------------------------------------------
// Kanban board
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardColumn {
    pub stage_id: u64,
    pub stage_name: String,
    pub color: String,
    pub percentage: u32,
    pub progress: u32,
    pub stats: StageTaskStats,
    pub todo: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub done: Vec<Task>,
}

/// One column per stage in `order_index` order, tasks split by status.
pub fn build_board(view: &ProjectView) -> Vec<BoardColumn> {
    let groups = group_by_stage(&view.tasks);
    view.stages
        .iter()
        .map(|stage| {
            let mut column = BoardColumn {
                stage_id: stage.id,
                stage_name: stage.name.clone(),
                color: stage.color.clone(),
                percentage: stage.percentage,
                progress: stage.progress,
                stats: stage_task_stats(&view.tasks, stage.id),
                todo: Vec::new(),
                in_progress: Vec::new(),
                done: Vec::new(),
            };
            for task in groups.get(&stage.id).into_iter().flatten() {
                let bucket = match task.status {
                    TaskStatus::Todo => &mut column.todo,
                    TaskStatus::InProgress => &mut column.in_progress,
                    TaskStatus::Done => &mut column.done,
                };
                bucket.push((*task).clone());
            }
            column
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
