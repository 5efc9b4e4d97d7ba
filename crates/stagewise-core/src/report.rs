//! Weekly status report: risks, recommendations and the plain-text export.

use crate::dashboard::PortfolioSummary;
use crate::paths;
use crate::progress::{stage_breakdown, StageBreakdown};
use crate::project::ProjectView;
use crate::resources::ResourceLedger;
use crate::settings::Settings;
use crate::task::{summarize, TaskSummary};
use crate::timeline::{PortfolioHealth, ProjectTimeline};
use crate::types::RiskLevel;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Free headcount above this suggests room for new work.
pub const SPARE_CAPACITY: u32 = 3;

const RULE_WIDTH: usize = 80;

/// Monday..=Sunday of the week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = u64::from(date.weekday().num_days_from_monday());
    let monday = date.checked_sub_days(Days::new(offset)).unwrap_or(date);
    let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(monday);
    (monday, sunday)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub level: RiskLevel,
    pub message: String,
}

impl Risk {
    fn high(message: impl Into<String>) -> Self {
        Self {
            level: RiskLevel::High,
            message: message.into(),
        }
    }

    fn medium(message: impl Into<String>) -> Self {
        Self {
            level: RiskLevel::Medium,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetail {
    pub name: String,
    pub timeline: ProjectTimeline,
    pub stage_count: usize,
    pub tasks_done: usize,
    pub tasks_total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub summary: PortfolioSummary,
    pub on_track: usize,
    pub at_risk: usize,
    pub behind: usize,
    pub overdue: usize,
    pub resources: ResourceLedger,
    pub stages: StageBreakdown,
    pub tasks: TaskSummary,
    pub projects: Vec<ProjectDetail>,
    pub risks: Vec<Risk>,
    pub recommendations: Vec<String>,
}

impl WeeklyReport {
    /// Figures reflect the portfolio as of `today`; `week_of` only selects
    /// the week named in the header.
    pub fn build(
        views: &[ProjectView],
        settings: &Settings,
        week_of: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        let (week_start, week_end) = week_bounds(week_of);
        let health = PortfolioHealth::assess(views, today);
        let resources = ResourceLedger::global(views, settings);
        let stages = stage_breakdown(views.iter().flat_map(|v| &v.stages));
        let tasks = summarize(views.iter().flat_map(|v| &v.tasks), today);
        let summary = PortfolioSummary::of(views);

        let projects = views
            .iter()
            .filter_map(|v| {
                let timeline = health
                    .timelines
                    .iter()
                    .find(|t| t.project_id == v.project.id)?
                    .clone();
                Some(ProjectDetail {
                    name: v.project.name.clone(),
                    timeline,
                    stage_count: v.stages.len(),
                    tasks_done: v.tasks.iter().filter(|t| t.is_done()).count(),
                    tasks_total: v.tasks.len(),
                })
            })
            .collect();

        let mut report = Self {
            week_start,
            week_end,
            summary,
            on_track: health.on_track,
            at_risk: health.at_risk,
            behind: health.behind,
            overdue: health.overdue,
            resources,
            stages,
            tasks,
            projects,
            risks: Vec::new(),
            recommendations: Vec::new(),
        };
        report.risks = report.assess_risks();
        report.recommendations = report.recommend();
        report
    }

    fn assess_risks(&self) -> Vec<Risk> {
        let mut risks = Vec::new();
        if self.overdue > 0 {
            risks.push(Risk::high(format!("{} project(s) are overdue", self.overdue)));
        }
        if self.behind > 0 {
            risks.push(Risk::high(format!(
                "{} project(s) significantly behind schedule",
                self.behind
            )));
        }
        if self.at_risk > 0 {
            risks.push(Risk::medium(format!(
                "{} project(s) at risk of delay",
                self.at_risk
            )));
        }
        if self.stages.needing_resources > 0 {
            risks.push(Risk::medium(format!(
                "{} stage(s) have no resources assigned",
                self.stages.needing_resources
            )));
        }
        if self.tasks.overdue > 0 {
            risks.push(Risk::medium(format!(
                "{} task(s) are overdue",
                self.tasks.overdue
            )));
        }
        if self.resources.devops_near_capacity() {
            risks.push(Risk::medium("DevOps resources near capacity (>90%)"));
        }
        if self.resources.engineers_near_capacity() {
            risks.push(Risk::medium("Engineering resources near capacity (>90%)"));
        }
        if self.resources.exhausted() {
            risks.push(Risk::high("No available resources for new work"));
        }
        risks
    }

    fn recommend(&self) -> Vec<String> {
        let free = self.resources.available;
        let mut recs = Vec::new();
        if self.stages.needing_resources > 0 {
            recs.push(format!(
                "Assign resources to {} unassigned stage(s) to begin tracking progress",
                self.stages.needing_resources
            ));
        }
        if self.behind > 0 {
            recs.push(format!(
                "Review and reallocate resources for {} behind-schedule project(s)",
                self.behind
            ));
        }
        if free.devops > SPARE_CAPACITY || free.engineers > SPARE_CAPACITY {
            recs.push(format!(
                "Consider taking on new projects - {} DevOps and {} Engineers available",
                free.devops, free.engineers
            ));
        }
        if self.tasks.overdue > 0 {
            recs.push(format!(
                "Address {} overdue task(s) as priority",
                self.tasks.overdue
            ));
        }
        if self.summary.not_started > 0 {
            recs.push(format!(
                "{} project(s) have not started - review kickoff schedules",
                self.summary.not_started
            ));
        }
        recs
    }

    pub fn file_name(&self) -> String {
        paths::report_file_name(self.week_start)
    }

    // -----------------------------------------------------------------------
    // Plain-text export
    // -----------------------------------------------------------------------

    pub fn render_text(&self, generated_at: NaiveDateTime) -> String {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        let r = &self.resources;
        let mut out = String::new();

        out.push_str(&format!(
            "{heavy}\n\
             {:24}WEEKLY STATUS REPORT\n\
             {:16}{} - {}\n\
             {heavy}\n\
             \n",
            "",
            "",
            self.week_start.format("%B %d"),
            self.week_end.format("%B %d, %Y"),
        ));

        let s = &self.summary;
        out.push_str(&format!(
            "EXECUTIVE SUMMARY\n\
             -----------------\n\
             Total Projects:     {}\n  \
             - Active:         {}\n  \
             - Completed:      {}\n  \
             - Not Started:    {}\n\
             Average Progress:   {:.1}%\n\
             \n",
            s.total_projects, s.in_progress, s.completed, s.not_started, s.average_progress,
        ));

        out.push_str(&format!(
            "PROJECT HEALTH\n\
             --------------\n\
             On Track:           {} project(s)\n\
             At Risk:            {} project(s)\n\
             Behind Schedule:    {} project(s)\n\
             Overdue:            {} project(s)\n\
             \n",
            self.on_track, self.at_risk, self.behind, self.overdue,
        ));

        out.push_str(&format!(
            "RESOURCE UTILIZATION\n\
             --------------------\n\
             DevOps Engineers:   {} / {} ({:.0}% utilized)\n\
             Software Engineers: {} / {} ({:.0}% utilized)\n\
             Available:          {} DevOps, {} Engineers\n\
             \n",
            r.utilized.devops,
            r.total.devops,
            r.devops_utilization,
            r.utilized.engineers,
            r.total.engineers,
            r.engineers_utilization,
            r.available.devops,
            r.available.engineers,
        ));

        let st = &self.stages;
        out.push_str(&format!(
            "STAGE PROGRESS\n\
             --------------\n\
             Total Stages:       {}\n  \
             - Completed:      {}\n  \
             - In Progress:    {}\n  \
             - Not Started:    {}\n  \
             - Need Resources: {}\n\
             \n",
            st.total, st.completed, st.in_progress, st.not_started, st.needing_resources,
        ));

        let t = &self.tasks;
        out.push_str(&format!(
            "TASK STATUS\n\
             -----------\n\
             Total Tasks:        {}\n  \
             - Completed:      {} ({:.0}%)\n  \
             - In Progress:    {}\n  \
             - To Do:          {}\n  \
             - Overdue:        {}\n\
             \n",
            t.total, t.done, t.completion_rate, t.in_progress, t.todo, t.overdue,
        ));

        out.push_str("PROJECT DETAILS\n---------------\n");
        for p in &self.projects {
            let tl = &p.timeline;
            let sign = if tl.variance >= 0.0 { "+" } else { "" };
            let overdue = if tl.is_overdue { " - OVERDUE" } else { "" };
            out.push_str(&format!(
                "\n{}\n  \
                 Progress:         {:.1}% (Expected: {:.1}%)\n  \
                 Variance:         {sign}{:.1}%\n  \
                 Status:           {}{overdue}\n  \
                 Days Remaining:   {}\n  \
                 Timeline:         {} - {}\n  \
                 Stages:           {}\n  \
                 Tasks:            {}/{} completed\n",
                p.name,
                tl.actual_progress,
                tl.expected_progress,
                tl.variance,
                tl.status.as_str().to_uppercase(),
                tl.days_remaining,
                tl.start_date.format("%b %d, %Y"),
                tl.end_date.format("%b %d, %Y"),
                p.stage_count,
                p.tasks_done,
                p.tasks_total,
            ));
        }

        out.push_str("\n\nRISKS & ISSUES\n--------------\n");
        if self.risks.is_empty() {
            out.push_str("No significant risks identified");
        } else {
            let lines: Vec<String> = self
                .risks
                .iter()
                .map(|risk| format!("[{}] {}", risk.level.as_str().to_uppercase(), risk.message))
                .collect();
            out.push_str(&lines.join("\n"));
        }

        out.push_str("\n\nRECOMMENDATIONS\n---------------\n");
        if self.recommendations.is_empty() {
            out.push_str("No immediate actions required");
        } else {
            let lines: Vec<String> = self
                .recommendations
                .iter()
                .enumerate()
                .map(|(i, rec)| format!("{}. {rec}", i + 1))
                .collect();
            out.push_str(&lines.join("\n"));
        }

        out.push_str(&format!(
            "\n\n{light}\nGenerated: {}\n{heavy}\n",
            generated_at.format("%B %d, %Y %H:%M"),
        ));
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
