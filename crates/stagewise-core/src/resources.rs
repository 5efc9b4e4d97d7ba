use crate::project::{ProjectView, Stage};
use crate::settings::Settings;
use serde::{Deserialize, Serialize};

/// Utilization above this percentage is reported as near capacity.
pub const NEAR_CAPACITY_PERCENT: f64 = 90.0;

/// A devops/engineer headcount pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePair {
    pub devops: u32,
    pub engineers: u32,
}

impl ResourcePair {
    pub fn new(devops: u32, engineers: u32) -> Self {
        Self { devops, engineers }
    }

    pub fn of_stage(stage: &Stage) -> Self {
        Self::new(stage.devops, stage.engineers)
    }

    pub fn is_empty(self) -> bool {
        self.devops == 0 && self.engineers == 0
    }
}

impl std::ops::Add for ResourcePair {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.devops.saturating_add(rhs.devops),
            self.engineers.saturating_add(rhs.engineers),
        )
    }
}

impl std::iter::Sum for ResourcePair {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, p| acc + p)
    }
}

impl From<&Settings> for ResourcePair {
    fn from(s: &Settings) -> Self {
        Self::new(s.total_devops, s.total_engineers)
    }
}

/// `used / total × 100`, or 0 when nothing is available to use.
pub fn utilization_percent(used: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(used) / f64::from(total) * 100.0
}

// ---------------------------------------------------------------------------
// ResourceLedger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Average {
    pub devops: f64,
    pub engineers: f64,
}

/// Headcount allocation over a set of stages against the company pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    pub total: ResourcePair,
    pub utilized: ResourcePair,
    pub available: ResourcePair,
    pub devops_utilization: f64,
    pub engineers_utilization: f64,
    pub stage_count: usize,
    pub stages_with_resources: usize,
    pub stages_needing_resources: usize,
    pub avg_per_stage: Average,
    /// How many more stages of average size the free pool could staff.
    /// `None` means no basis for an estimate (no stage has any resource).
    pub potential_new_stages: Option<u64>,
}

impl ResourceLedger {
    pub fn compute<'a>(stages: impl IntoIterator<Item = &'a Stage>, settings: &Settings) -> Self {
        let total = ResourcePair::from(settings);
        let mut utilized = ResourcePair::default();
        let mut stage_count = 0;
        let mut stages_needing_resources = 0;
        for stage in stages {
            stage_count += 1;
            let pair = ResourcePair::of_stage(stage);
            if pair.is_empty() {
                stages_needing_resources += 1;
            }
            utilized = utilized + pair;
        }

        let available = ResourcePair::new(
            total.devops.saturating_sub(utilized.devops),
            total.engineers.saturating_sub(utilized.engineers),
        );
        let stages_with_resources = stage_count - stages_needing_resources;
        let divisor = stages_with_resources.max(1) as f64;
        let avg_per_stage = Average {
            devops: f64::from(utilized.devops) / divisor,
            engineers: f64::from(utilized.engineers) / divisor,
        };

        Self {
            total,
            utilized,
            available,
            devops_utilization: utilization_percent(utilized.devops, total.devops),
            engineers_utilization: utilization_percent(utilized.engineers, total.engineers),
            stage_count,
            stages_with_resources,
            stages_needing_resources,
            avg_per_stage,
            potential_new_stages: potential_new_stages(available, avg_per_stage),
        }
    }

    /// Ledger over every stage of every project.
    pub fn global(views: &[ProjectView], settings: &Settings) -> Self {
        Self::compute(views.iter().flat_map(|v| &v.stages), settings)
    }

    pub fn devops_near_capacity(&self) -> bool {
        self.devops_utilization > NEAR_CAPACITY_PERCENT
    }

    pub fn engineers_near_capacity(&self) -> bool {
        self.engineers_utilization > NEAR_CAPACITY_PERCENT
    }

    /// Either resource type is fully committed.
    pub fn exhausted(&self) -> bool {
        self.available.devops == 0 || self.available.engineers == 0
    }
}

/// floor(min(free / avg)) over both resource types. A type whose average is
/// zero places no limit; when neither does, the estimate is unbounded.
pub fn potential_new_stages(available: ResourcePair, avg: Average) -> Option<u64> {
    let capacity = |free: u32, avg: f64| (avg > 0.0).then(|| f64::from(free) / avg);
    let bound = match (
        capacity(available.devops, avg.devops),
        capacity(available.engineers, avg.engineers),
    ) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => return None,
    };
    Some(bound.floor() as u64)
}

// ---------------------------------------------------------------------------
// Per-project breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectResources {
    pub project_id: u64,
    pub project_name: String,
    pub utilized: ResourcePair,
    pub stage_count: usize,
    pub stages_needing_resources: usize,
}

pub fn project_breakdown(views: &[ProjectView]) -> Vec<ProjectResources> {
    views
        .iter()
        .map(|v| ProjectResources {
            project_id: v.project.id,
            project_name: v.project.name.clone(),
            utilized: v.stages.iter().map(ResourcePair::of_stage).sum(),
            stage_count: v.stages.len(),
            stages_needing_resources: v.stages.iter().filter(|s| s.needs_resources()).count(),
        })
        .collect()
}

/// A resource-less stage, labelled with its project for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnstaffedStage {
    pub stage_id: u64,
    pub stage_name: String,
    pub project_id: u64,
    pub project_name: String,
    pub percentage: u32,
}

pub fn stages_needing_resources(views: &[ProjectView]) -> Vec<UnstaffedStage> {
    views
        .iter()
        .flat_map(|v| {
            v.stages
                .iter()
                .filter(|s| s.needs_resources())
                .map(move |s| UnstaffedStage {
                    stage_id: s.id,
                    stage_name: s.name.clone(),
                    project_id: v.project.id,
                    project_name: v.project.name.clone(),
                    percentage: s.percentage,
                })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(id: u64, devops: u32, engineers: u32) -> Stage {
        Stage {
            id,
            project_id: 1,
            name: format!("S{id}"),
            description: String::new(),
            percentage: 50,
            progress: 0,
            color: String::new(),
            order_index: 0,
            devops,
            engineers,
        }
    }

    fn settings(devops: u32, engineers: u32) -> Settings {
        Settings {
            total_devops: devops,
            total_engineers: engineers,
        }
    }

    #[test]
    fn over_allocation_never_goes_negative() {
        let stages = vec![stage(1, 7, 0), stage(2, 5, 1)];
        let ledger = ResourceLedger::compute(&stages, &settings(10, 4));
        assert_eq!(ledger.utilized, ResourcePair::new(12, 1));
        assert_eq!(ledger.available, ResourcePair::new(0, 3));
        assert_eq!(ledger.devops_utilization, 120.0);
        assert_eq!(ledger.engineers_utilization, 25.0);
        assert!(ledger.devops_near_capacity());
        assert!(ledger.exhausted());
    }

    #[test]
    fn zero_pool_has_zero_utilization() {
        let stages = vec![stage(1, 3, 3)];
        let ledger = ResourceLedger::compute(&stages, &settings(0, 0));
        assert_eq!(ledger.devops_utilization, 0.0);
        assert_eq!(ledger.engineers_utilization, 0.0);
    }

    #[test]
    fn unstaffed_stages_excluded_from_average() {
        let stages = vec![stage(1, 2, 4), stage(2, 0, 0), stage(3, 2, 2)];
        let ledger = ResourceLedger::compute(&stages, &settings(10, 12));
        assert_eq!(ledger.stages_needing_resources, 1);
        assert_eq!(ledger.stages_with_resources, 2);
        assert_eq!(ledger.avg_per_stage, Average { devops: 2.0, engineers: 3.0 });
        // free 6 devops / 2 = 3, free 6 engineers / 3 = 2
        assert_eq!(ledger.potential_new_stages, Some(2));
    }

    #[test]
    fn no_staffed_stages_means_unbounded() {
        let stages = vec![stage(1, 0, 0)];
        let ledger = ResourceLedger::compute(&stages, &settings(5, 5));
        assert_eq!(ledger.avg_per_stage, Average::default());
        assert_eq!(ledger.potential_new_stages, None);
    }

    #[test]
    fn one_resource_type_alone_bounds_the_estimate() {
        let avg = Average { devops: 0.0, engineers: 2.0 };
        assert_eq!(potential_new_stages(ResourcePair::new(9, 5), avg), Some(2));
    }

    #[test]
    fn breakdown_per_project() {
        use crate::project::{Project, ProjectView};
        let view = ProjectView {
            project: Project {
                id: 4,
                name: "Atlas".to_string(),
                description: String::new(),
                planned_weeks: 10,
                start_date: None,
                end_date: None,
                notes: String::new(),
                created_at: None,
            },
            stages: vec![stage(1, 1, 2), stage(2, 0, 0)],
            tasks: Vec::new(),
        };
        let views = vec![view];
        let rows = project_breakdown(&views);
        assert_eq!(rows[0].utilized, ResourcePair::new(1, 2));
        assert_eq!(rows[0].stages_needing_resources, 1);

        let unstaffed = stages_needing_resources(&views);
        assert_eq!(unstaffed.len(), 1);
        assert_eq!(unstaffed[0].project_name, "Atlas");
        assert_eq!(unstaffed[0].stage_id, 2);
    }
}
