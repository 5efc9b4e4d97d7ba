use crate::error::{Result, StagewiseError};
use crate::task::Task;
use crate::types::{optional_date, patch_date};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_PLANNED_WEEKS: u32 = 10;

fn default_planned_weeks() -> u32 {
    DEFAULT_PLANNED_WEEKS
}

// ---------------------------------------------------------------------------
// Project / Stage records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_planned_weeks")]
    pub planned_weeks: u32,
    #[serde(default, deserialize_with = "optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Both dates set; a project without them is still being planned.
    pub fn schedule(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    pub fn is_planning(&self) -> bool {
        self.schedule().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: u64,
    pub project_id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Share of the project, in percent. A project's stages sum to 100.
    pub percentage: u32,
    /// Completion of this stage alone, 0..=100.
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub order_index: u32,
    #[serde(default)]
    pub devops: u32,
    #[serde(default)]
    pub engineers: u32,
}

impl Stage {
    /// This stage's share of overall project progress.
    pub fn contribution(&self) -> f64 {
        f64::from(self.percentage) * f64::from(self.progress) / 100.0
    }

    pub fn needs_resources(&self) -> bool {
        self.devops == 0 && self.engineers == 0
    }
}

/// Weeks of a `planned_weeks` schedule covered by a stage of `percentage`.
pub fn weeks_for_percentage(percentage: u32, planned_weeks: u32) -> f64 {
    f64::from(percentage) / 100.0 * f64::from(planned_weeks)
}

/// End date for a project started on `start` that runs `planned_weeks`.
pub fn planned_end_date(start: NaiveDate, planned_weeks: u32) -> Option<NaiveDate> {
    start.checked_add_days(Days::new(u64::from(planned_weeks) * 7))
}

// ---------------------------------------------------------------------------
// ProjectView: a project with its stages and tasks attached
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    /// Sorted by `order_index`.
    pub stages: Vec<Stage>,
    pub tasks: Vec<Task>,
}

impl ProjectView {
    pub fn overall_progress(&self) -> f64 {
        crate::progress::overall_progress(&self.stages)
    }

    pub fn stage(&self, id: u64) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// A stage as submitted by a client when creating or editing a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageDraft {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub percentage: u32,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default)]
    pub devops: Option<u32>,
    #[serde(default)]
    pub engineers: Option<u32>,
}

impl StageDraft {
    pub fn new(name: impl Into<String>, percentage: u32) -> Self {
        Self {
            name: name.into(),
            percentage,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub planned_weeks: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub stages: Vec<StageDraft>,
}

/// Partial project update. Absent fields are left untouched; `stages`, when
/// present, replaces the whole stage list (see [`reconcile_stages`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub planned_weeks: Option<u32>,
    #[serde(default, deserialize_with = "patch_date")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "patch_date")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub stages: Option<Vec<StageDraft>>,
}

/// Tracked stage fields, each independently optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StagePatch {
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default)]
    pub devops: Option<u32>,
    #[serde(default)]
    pub engineers: Option<u32>,
}

impl StagePatch {
    pub fn apply(&self, stage: &mut Stage) -> Result<()> {
        if let Some(progress) = self.progress {
            validate_progress(progress)?;
            stage.progress = progress;
        }
        if let Some(devops) = self.devops {
            stage.devops = devops;
        }
        if let Some(engineers) = self.engineers {
            stage.engineers = engineers;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StagewiseError::validation("project name is required"));
    }
    Ok(())
}

pub fn validate_planned_weeks(weeks: u32) -> Result<()> {
    if weeks == 0 {
        return Err(StagewiseError::validation("planned_weeks must be at least 1"));
    }
    Ok(())
}

pub fn validate_schedule(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(StagewiseError::validation(format!(
                "end_date {end} is before start_date {start}"
            )));
        }
    }
    Ok(())
}

pub fn validate_progress(progress: u32) -> Result<()> {
    if progress > 100 {
        return Err(StagewiseError::validation(format!(
            "progress must be between 0 and 100, got {progress}"
        )));
    }
    Ok(())
}

/// Stage names must be present, existing stage ids may appear once, and
/// percentages must sum to exactly 100 whenever at least one stage is given.
pub fn validate_stage_drafts(drafts: &[StageDraft]) -> Result<()> {
    if drafts.is_empty() {
        return Ok(());
    }
    let mut seen = HashSet::new();
    for draft in drafts {
        if draft.name.trim().is_empty() {
            return Err(StagewiseError::validation("stage name is required"));
        }
        if draft.percentage > 100 {
            return Err(StagewiseError::validation(format!(
                "stage percentage must be between 0 and 100, got {}",
                draft.percentage
            )));
        }
        if let Some(progress) = draft.progress {
            validate_progress(progress)?;
        }
        if let Some(id) = draft.id {
            if !seen.insert(id) {
                return Err(StagewiseError::validation(format!(
                    "stage {id} appears more than once"
                )));
            }
        }
    }
    let total: u64 = drafts.iter().map(|d| u64::from(d.percentage)).sum();
    if total != 100 {
        return Err(StagewiseError::validation(format!(
            "stage percentages must sum to 100, got {total}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Stage reconciliation
// ---------------------------------------------------------------------------

/// Build the replacement stage list for `project_id` from client drafts.
///
/// A draft whose `id` matches a previous stage keeps that stage's id and its
/// tracked `progress`, `devops` and `engineers`. Each previous stage is
/// claimed at most once. Any other draft becomes a new stage with a fresh id
/// and the draft's values (0 when omitted). Order in `drafts` becomes
/// `order_index`.
pub fn reconcile_stages(
    project_id: u64,
    previous: &[Stage],
    drafts: &[StageDraft],
    next_stage_id: &mut u64,
) -> Vec<Stage> {
    let mut claimed = HashSet::new();
    drafts
        .iter()
        .enumerate()
        .map(|(index, draft)| {
            let old = draft
                .id
                .filter(|id| claimed.insert(*id))
                .and_then(|id| previous.iter().find(|s| s.id == id));
            let (id, progress, devops, engineers) = match old {
                Some(old) => (old.id, old.progress, old.devops, old.engineers),
                None => {
                    let id = *next_stage_id;
                    *next_stage_id += 1;
                    (
                        id,
                        draft.progress.unwrap_or(0),
                        draft.devops.unwrap_or(0),
                        draft.engineers.unwrap_or(0),
                    )
                }
            };
            Stage {
                id,
                project_id,
                name: draft.name.clone(),
                description: draft.description.clone().unwrap_or_default(),
                percentage: draft.percentage,
                progress,
                color: draft.color.clone().unwrap_or_default(),
                order_index: index as u32,
                devops,
                engineers,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(id: u64, percentage: u32, progress: u32) -> Stage {
        Stage {
            id,
            project_id: 1,
            name: format!("S{id}"),
            description: String::new(),
            percentage,
            progress,
            color: String::new(),
            order_index: 0,
            devops: 2,
            engineers: 3,
        }
    }

    #[test]
    fn contribution_is_weighted() {
        assert_eq!(stage(1, 60, 50).contribution(), 30.0);
        assert_eq!(stage(2, 40, 100).contribution(), 40.0);
    }

    #[test]
    fn needs_resources_only_when_both_zero() {
        let mut s = stage(1, 100, 0);
        assert!(!s.needs_resources());
        s.devops = 0;
        assert!(!s.needs_resources());
        s.engineers = 0;
        assert!(s.needs_resources());
    }

    #[test]
    fn percentages_must_sum_to_100() {
        let ok = vec![StageDraft::new("Design", 30), StageDraft::new("Build", 70)];
        assert!(validate_stage_drafts(&ok).is_ok());

        let short = vec![StageDraft::new("Design", 30), StageDraft::new("Build", 60)];
        let err = validate_stage_drafts(&short).unwrap_err();
        assert!(err.to_string().contains("got 90"));

        assert!(validate_stage_drafts(&[]).is_ok());
    }

    #[test]
    fn oversized_percentages_rejected_without_overflow() {
        let drafts = vec![StageDraft::new("Huge", u32::MAX), StageDraft::new("Small", 101)];
        let err = validate_stage_drafts(&drafts).unwrap_err();
        assert!(matches!(err, StagewiseError::Validation(_)));

        // Each within range, but the sum is checked without wrapping.
        let many = vec![StageDraft::new("A", 100); 3];
        assert!(validate_stage_drafts(&many).unwrap_err().to_string().contains("got 300"));
    }

    #[test]
    fn duplicate_stage_ids_rejected() {
        let mut drafts = vec![StageDraft::new("Design", 50), StageDraft::new("Build", 50)];
        drafts[0].id = Some(1);
        drafts[1].id = Some(1);
        let err = validate_stage_drafts(&drafts).unwrap_err();
        assert!(err.to_string().contains("stage 1 appears more than once"));
    }

    #[test]
    fn blank_stage_name_rejected() {
        let drafts = vec![StageDraft::new("  ", 100)];
        assert!(validate_stage_drafts(&drafts).is_err());
    }

    #[test]
    fn schedule_rejects_inverted_dates() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 10);
        let b = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(validate_schedule(a, b).is_err());
        assert!(validate_schedule(b, a).is_ok());
        assert!(validate_schedule(None, a).is_ok());
    }

    #[test]
    fn reconcile_keeps_tracked_fields_for_matched_ids() {
        let previous = vec![stage(7, 50, 80), stage(8, 50, 20)];
        let mut drafts = vec![StageDraft::new("Renamed", 40), StageDraft::new("New", 60)];
        drafts[0].id = Some(7);
        drafts[0].progress = Some(5);
        drafts[1].progress = Some(10);
        let mut next_id = 20;

        let stages = reconcile_stages(1, &previous, &drafts, &mut next_id);

        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].id, 7);
        assert_eq!(stages[0].name, "Renamed");
        assert_eq!(stages[0].percentage, 40);
        assert_eq!(stages[0].progress, 80, "matched stage keeps its progress");
        assert_eq!((stages[0].devops, stages[0].engineers), (2, 3));

        assert_eq!(stages[1].id, 20);
        assert_eq!(stages[1].progress, 10);
        assert_eq!((stages[1].devops, stages[1].engineers), (0, 0));
        assert_eq!(stages[1].order_index, 1);
        assert_eq!(next_id, 21);
    }

    #[test]
    fn reconcile_unknown_id_gets_fresh_id() {
        let previous = vec![stage(7, 100, 80)];
        let mut drafts = vec![StageDraft::new("Ghost", 100)];
        drafts[0].id = Some(99);
        let mut next_id = 8;
        let stages = reconcile_stages(1, &previous, &drafts, &mut next_id);
        assert_eq!(stages[0].id, 8);
        assert_eq!(stages[0].progress, 0);
    }

    #[test]
    fn reconcile_claims_each_previous_stage_once() {
        let previous = vec![stage(7, 100, 80)];
        let mut drafts = vec![StageDraft::new("First", 50), StageDraft::new("Copy", 50)];
        drafts[0].id = Some(7);
        drafts[1].id = Some(7);
        let mut next_id = 8;
        let stages = reconcile_stages(1, &previous, &drafts, &mut next_id);
        let ids: Vec<u64> = stages.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![7, 8]);
        assert_eq!(stages[0].progress, 80);
        assert_eq!(stages[1].progress, 0);
    }

    #[test]
    fn planned_end_date_adds_whole_weeks() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            planned_end_date(start, 10),
            NaiveDate::from_ymd_opt(2024, 3, 11)
        );
    }

    #[test]
    fn weeks_for_percentage_scales_plan() {
        assert_eq!(weeks_for_percentage(20, 10), 2.0);
        assert_eq!(weeks_for_percentage(25, 10), 2.5);
    }

    #[test]
    fn stage_patch_is_partial_and_checks_progress() {
        let mut s = stage(1, 100, 10);
        StagePatch {
            devops: Some(0),
            ..Default::default()
        }
        .apply(&mut s)
        .unwrap();
        assert_eq!((s.progress, s.devops, s.engineers), (10, 0, 3));

        let bad = StagePatch {
            progress: Some(101),
            ..Default::default()
        };
        assert!(bad.apply(&mut s).is_err());
        assert_eq!(s.progress, 10);
    }

    #[test]
    fn project_without_dates_is_planning() {
        let json = r#"{"id": 1, "name": "Atlas", "start_date": null, "end_date": ""}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert!(project.is_planning());
        assert_eq!(project.planned_weeks, DEFAULT_PLANNED_WEEKS);
    }
}
