//! Weighted stage progress and per-stage date ranges.

use crate::project::Stage;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Σ(percentage × progress / 100) over all stages; 0 for a project without
/// stages. Unrounded.
pub fn overall_progress(stages: &[Stage]) -> f64 {
    stages.iter().map(Stage::contribution).sum()
}

/// Coarse lifecycle bucket for a progress value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressState {
    pub fn of(progress: f64) -> Self {
        if progress >= 100.0 {
            ProgressState::Completed
        } else if progress > 0.0 {
            ProgressState::InProgress
        } else {
            ProgressState::NotStarted
        }
    }
}

/// Stage counts by lifecycle bucket, plus stages with no resources assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageBreakdown {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub needing_resources: usize,
}

pub fn stage_breakdown<'a>(stages: impl IntoIterator<Item = &'a Stage>) -> StageBreakdown {
    let mut b = StageBreakdown::default();
    for stage in stages {
        b.total += 1;
        match ProgressState::of(f64::from(stage.progress)) {
            ProgressState::Completed => b.completed += 1,
            ProgressState::InProgress => b.in_progress += 1,
            ProgressState::NotStarted => b.not_started += 1,
        }
        if stage.needs_resources() {
            b.needing_resources += 1;
        }
    }
    b
}

// ---------------------------------------------------------------------------
// Stage date ranges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRange {
    pub stage_id: u64,
    pub name: String,
    pub color: String,
    pub percentage: u32,
    pub progress: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// `end - today` in days; negative once the stage window has passed.
    pub days_until_deadline: i64,
    pub is_overdue: bool,
    pub is_at_risk: bool,
}

impl StageRange {
    /// Deadline within the next week and not yet complete.
    pub fn is_upcoming_deadline(&self) -> bool {
        (0..=7).contains(&self.days_until_deadline) && self.progress < 100
    }
}

/// Split `start..=end` across `stages` in `order_index` order.
///
/// Each stage spans `round(percentage / 100 × total_days)` days and begins the
/// day after the previous one ends. The final stage always ends on `end`, so
/// rounding drift never moves the project end date.
pub fn stage_ranges(
    stages: &[Stage],
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Vec<StageRange> {
    let total_days = (end - start).num_days().max(0);
    let mut ordered: Vec<&Stage> = stages.iter().collect();
    ordered.sort_by_key(|s| (s.order_index, s.id));

    let last = ordered.len().saturating_sub(1);
    let mut cumulative: i64 = 0;
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, stage)| {
            let span = (f64::from(stage.percentage) / 100.0 * total_days as f64).round() as i64;
            let stage_start = offset(start, cumulative).min(end);
            let stage_end = if i == last {
                end
            } else {
                offset(start, cumulative + span.max(1) - 1).clamp(stage_start, end)
            };
            cumulative += span;

            let days_until_deadline = (stage_end - today).num_days();
            StageRange {
                stage_id: stage.id,
                name: stage.name.clone(),
                color: stage.color.clone(),
                percentage: stage.percentage,
                progress: stage.progress,
                start: stage_start,
                end: stage_end,
                days_until_deadline,
                is_overdue: is_stage_overdue(stage_end, stage.progress, today),
                is_at_risk: is_stage_at_risk(days_until_deadline, stage.progress),
            }
        })
        .collect()
}

/// The stage window has ended and work remains.
pub fn is_stage_overdue(stage_end: NaiveDate, progress: u32, today: NaiveDate) -> bool {
    stage_end < today && progress < 100
}

/// Deadline within three days and the stage is below 80%.
pub fn is_stage_at_risk(days_until_deadline: i64, progress: u32) -> bool {
    (0..=3).contains(&days_until_deadline) && progress < 80
}

fn offset(date: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        date.checked_add_days(Days::new(days as u64)).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
            .unwrap_or(NaiveDate::MIN)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stage(id: u64, order: u32, percentage: u32, progress: u32) -> Stage {
        Stage {
            id,
            project_id: 1,
            name: format!("S{id}"),
            description: String::new(),
            percentage,
            progress,
            color: "#4361ee".to_string(),
            order_index: order,
            devops: 0,
            engineers: 0,
        }
    }

    #[test]
    fn weighted_progress_example() {
        let stages = vec![stage(1, 0, 60, 50), stage(2, 1, 40, 100)];
        assert_eq!(overall_progress(&stages), 70.0);
    }

    #[test]
    fn no_stages_is_zero() {
        assert_eq!(overall_progress(&[]), 0.0);
    }

    #[test]
    fn progress_stays_within_bounds() {
        for a in [0, 33, 50, 99, 100] {
            for b in [0, 1, 67, 100] {
                let stages = vec![stage(1, 0, 25, a), stage(2, 1, 75, b)];
                let p = overall_progress(&stages);
                assert!((0.0..=100.0).contains(&p), "{p} out of range");
            }
        }
        let done = vec![stage(1, 0, 25, 100), stage(2, 1, 75, 100)];
        assert_eq!(overall_progress(&done), 100.0);
    }

    #[test]
    fn progress_state_buckets() {
        assert_eq!(ProgressState::of(0.0), ProgressState::NotStarted);
        assert_eq!(ProgressState::of(0.5), ProgressState::InProgress);
        assert_eq!(ProgressState::of(100.0), ProgressState::Completed);
    }

    #[test]
    fn breakdown_counts_needing_resources() {
        let mut stages = vec![stage(1, 0, 50, 100), stage(2, 1, 30, 40), stage(3, 2, 20, 0)];
        stages[0].devops = 1;
        let b = stage_breakdown(&stages);
        assert_eq!((b.completed, b.in_progress, b.not_started), (1, 1, 1));
        assert_eq!(b.needing_resources, 2);
    }

    #[test]
    fn ranges_are_contiguous_and_end_on_project_end() {
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 31);
        // 30 days: 33% → 10, 33% → 10, 34% → 10
        let stages = vec![stage(1, 0, 33, 0), stage(2, 1, 33, 0), stage(3, 2, 34, 0)];
        let ranges = stage_ranges(&stages, start, end, date(2023, 12, 1));

        assert_eq!(ranges[0].start, start);
        assert_eq!(ranges[0].end, date(2024, 1, 10));
        assert_eq!(ranges[1].start, date(2024, 1, 11));
        assert_eq!(ranges[1].end, date(2024, 1, 20));
        assert_eq!(ranges[2].start, date(2024, 1, 21));
        assert_eq!(ranges[2].end, end);
    }

    #[test]
    fn ranges_follow_order_index_not_input_order() {
        let stages = vec![stage(1, 1, 50, 0), stage(2, 0, 50, 0)];
        let ranges = stage_ranges(&stages, date(2024, 1, 1), date(2024, 1, 11), date(2024, 1, 1));
        assert_eq!(ranges[0].stage_id, 2);
        assert_eq!(ranges[1].stage_id, 1);
    }

    #[test]
    fn rounding_drift_is_clamped_to_end() {
        // 10 days: 15% → 2 (1.5 rounds up), 15% → 2, 70% → 7 = 11 days total
        let stages = vec![stage(1, 0, 15, 0), stage(2, 1, 15, 0), stage(3, 2, 70, 0)];
        let end = date(2024, 1, 11);
        let ranges = stage_ranges(&stages, date(2024, 1, 1), end, date(2024, 1, 1));
        assert_eq!(ranges.last().unwrap().end, end);
        assert!(ranges.iter().all(|r| r.start <= r.end && r.end <= end));
    }

    #[test]
    fn overdue_and_at_risk_flags() {
        let stages = vec![stage(1, 0, 50, 60), stage(2, 1, 50, 10)];
        // Stage 1: Jan 1..=Jan 5, stage 2: Jan 6..=Jan 11
        let ranges = stage_ranges(&stages, date(2024, 1, 1), date(2024, 1, 11), date(2024, 1, 9));
        assert!(ranges[0].is_overdue);
        assert!(!ranges[0].is_at_risk);
        assert_eq!(ranges[1].days_until_deadline, 2);
        assert!(ranges[1].is_at_risk);
        assert!(!ranges[1].is_overdue);
        assert!(ranges[1].is_upcoming_deadline());
    }

    #[test]
    fn finished_stage_is_never_overdue() {
        assert!(!is_stage_overdue(date(2024, 1, 1), 100, date(2024, 2, 1)));
        assert!(is_stage_overdue(date(2024, 1, 1), 99, date(2024, 2, 1)));
        assert!(!is_stage_at_risk(2, 80));
        assert!(is_stage_at_risk(0, 79));
        assert!(!is_stage_at_risk(-1, 0));
    }
}
