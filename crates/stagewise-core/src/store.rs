//! The tracker's single JSON document and every write against it.
//!
//! The whole document is loaded into memory and rewritten atomically after
//! each mutation. A `Store` is single-writer: callers that share one across
//! threads must serialize access themselves.

use crate::error::{Result, StagewiseError};
use crate::io::atomic_write;
use crate::project::{
    planned_end_date, reconcile_stages, validate_name, validate_planned_weeks,
    validate_schedule, validate_stage_drafts, NewProject, Project, ProjectPatch, ProjectView,
    Stage, StagePatch, DEFAULT_PLANNED_WEEKS,
};
use crate::settings::{Settings, SettingsPatch};
use crate::task::{validate_title, NewTask, Task, TaskPatch};
use crate::types::{Role, TaskStatus};
use crate::user::{default_users, validate_new_user, Credentials, NewUser, PublicUser, User, UserPatch};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Dataset: the on-disk document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub settings: Settings,
    /// `None` when the file predates accounts; filled with defaults on open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
}

impl Dataset {
    /// A fresh document with the default accounts.
    pub fn seeded() -> Self {
        Self {
            users: Some(default_users()),
            ..Default::default()
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn users(&self) -> &[User] {
        self.users.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NextIds {
    project: u64,
    stage: u64,
    task: u64,
    user: u64,
}

impl NextIds {
    fn scan(data: &Dataset) -> Self {
        fn next<T>(items: &[T], id: impl Fn(&T) -> u64) -> u64 {
            items.iter().map(id).max().map_or(1, |max| max + 1)
        }
        Self {
            project: next(&data.projects, |p| p.id),
            stage: next(&data.stages, |s| s.id),
            task: next(&data.tasks, |t| t.id),
            user: next(data.users(), |u| u.id),
        }
    }
}

fn take(counter: &mut u64) -> u64 {
    let id = *counter;
    *counter += 1;
    id
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Store {
    path: Option<PathBuf>,
    data: Dataset,
    next: NextIds,
}

impl Store {
    /// Load the document at `path`, creating it when absent. A document
    /// without a `users` list gets the default accounts and is saved back.
    pub fn open(path: &Path) -> Result<Self> {
        let (data, existed) = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            (serde_json::from_str::<Dataset>(&raw)?, true)
        } else {
            (Dataset::default(), false)
        };
        let mut store = Self::from_dataset(data, Some(path.to_path_buf()));
        let seeded = store.data.users.is_none();
        if seeded {
            store.data.users = Some(default_users());
            store.next = NextIds::scan(&store.data);
        }
        if !existed || seeded {
            store.persist()?;
        }
        Ok(store)
    }

    /// A seeded store that never touches disk.
    pub fn in_memory() -> Self {
        Self::from_dataset(Dataset::seeded(), None)
    }

    fn from_dataset(data: Dataset, path: Option<PathBuf>) -> Self {
        let next = NextIds::scan(&data);
        Self { path, data, next }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    fn persist(&self) -> Result<()> {
        if let Some(path) = &self.path {
            atomic_write(path, self.data.to_json()?.as_bytes())?;
        }
        Ok(())
    }

    /// Apply `f` and persist the result. If either step fails the document
    /// and the id counters are restored, so memory never holds unsaved data.
    fn mutate<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = (self.data.clone(), self.next);
        let result = f(self).and_then(|value| {
            self.persist()?;
            Ok(value)
        });
        if result.is_err() {
            (self.data, self.next) = snapshot;
        }
        result
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    /// Every project with its stages (in `order_index` order) and tasks.
    pub fn project_views(&self) -> Vec<ProjectView> {
        self.data.projects.iter().map(|p| self.view_of(p)).collect()
    }

    pub fn project_view(&self, id: u64) -> Result<ProjectView> {
        let project = self.project(id)?;
        Ok(self.view_of(project))
    }

    fn view_of(&self, project: &Project) -> ProjectView {
        let mut stages: Vec<Stage> = self
            .data
            .stages
            .iter()
            .filter(|s| s.project_id == project.id)
            .cloned()
            .collect();
        stages.sort_by_key(|s| s.order_index);
        let tasks = self
            .data
            .tasks
            .iter()
            .filter(|t| t.project_id == project.id)
            .cloned()
            .collect();
        ProjectView {
            project: project.clone(),
            stages,
            tasks,
        }
    }

    fn project(&self, id: u64) -> Result<&Project> {
        self.data
            .projects
            .iter()
            .find(|p| p.id == id)
            .ok_or(StagewiseError::ProjectNotFound(id))
    }

    fn project_mut(&mut self, id: u64) -> Result<&mut Project> {
        self.data
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StagewiseError::ProjectNotFound(id))
    }

    pub fn create_project(&mut self, input: NewProject) -> Result<ProjectView> {
        validate_name(&input.name)?;
        let planned_weeks = input.planned_weeks.unwrap_or(DEFAULT_PLANNED_WEEKS);
        validate_planned_weeks(planned_weeks)?;
        validate_schedule(input.start_date, input.end_date)?;
        validate_stage_drafts(&input.stages)?;

        self.mutate(|store| {
            let id = take(&mut store.next.project);
            let project = Project {
                id,
                name: input.name.trim().to_string(),
                description: input.description.unwrap_or_default(),
                planned_weeks,
                start_date: input.start_date,
                end_date: input.end_date,
                notes: input.notes.unwrap_or_default(),
                created_at: Some(Utc::now()),
            };
            let stages = reconcile_stages(id, &[], &input.stages, &mut store.next.stage);
            store.data.projects.push(project);
            store.data.stages.extend(stages);
            store.project_view(id)
        })
    }

    /// Apply a partial update. A `stages` list replaces the project's stages
    /// via [`reconcile_stages`].
    pub fn update_project(&mut self, id: u64, patch: ProjectPatch) -> Result<ProjectView> {
        let current = self.project(id)?.clone();

        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(weeks) = patch.planned_weeks {
            validate_planned_weeks(weeks)?;
        }
        let start = patch.start_date.unwrap_or(current.start_date);
        let end = patch.end_date.unwrap_or(current.end_date);
        validate_schedule(start, end)?;
        if let Some(drafts) = &patch.stages {
            validate_stage_drafts(drafts)?;
        }

        self.mutate(|store| {
            if let Some(drafts) = &patch.stages {
                let previous: Vec<Stage> = store
                    .data
                    .stages
                    .iter()
                    .filter(|s| s.project_id == id)
                    .cloned()
                    .collect();
                let replacement = reconcile_stages(id, &previous, drafts, &mut store.next.stage);
                store.data.stages.retain(|s| s.project_id != id);
                store.data.stages.extend(replacement);
            }

            let project = store.project_mut(id)?;
            if let Some(name) = patch.name {
                project.name = name.trim().to_string();
            }
            if let Some(description) = patch.description {
                project.description = description;
            }
            if let Some(notes) = patch.notes {
                project.notes = notes;
            }
            if let Some(weeks) = patch.planned_weeks {
                project.planned_weeks = weeks;
            }
            project.start_date = start;
            project.end_date = end;
            store.project_view(id)
        })
    }

    /// Move a planning project onto the calendar: it starts on `start_date`
    /// and ends `planned_weeks` later.
    pub fn start_project(&mut self, id: u64, start_date: NaiveDate) -> Result<ProjectView> {
        self.mutate(|store| {
            let project = store.project_mut(id)?;
            let end = planned_end_date(start_date, project.planned_weeks).ok_or_else(|| {
                StagewiseError::validation(format!("start_date {start_date} is out of range"))
            })?;
            project.start_date = Some(start_date);
            project.end_date = Some(end);
            store.project_view(id)
        })
    }

    /// Remove a project together with its stages and tasks.
    pub fn delete_project(&mut self, id: u64) -> Result<()> {
        self.project(id)?;
        self.mutate(|store| {
            store.data.projects.retain(|p| p.id != id);
            store.data.stages.retain(|s| s.project_id != id);
            store.data.tasks.retain(|t| t.project_id != id);
            Ok(())
        })
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    pub fn update_stage(&mut self, id: u64, patch: &StagePatch) -> Result<Stage> {
        self.mutate(|store| {
            let stage = store
                .data
                .stages
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or(StagewiseError::StageNotFound(id))?;
            patch.apply(stage)?;
            Ok(stage.clone())
        })
    }

    fn check_stage_in_project(&self, stage_id: u64, project_id: u64) -> Result<()> {
        let stage = self
            .data
            .stages
            .iter()
            .find(|s| s.id == stage_id)
            .ok_or(StagewiseError::StageNotFound(stage_id))?;
        if stage.project_id != project_id {
            return Err(StagewiseError::validation(format!(
                "stage {stage_id} does not belong to project {project_id}"
            )));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub fn task(&self, id: u64) -> Result<&Task> {
        self.data
            .tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or(StagewiseError::TaskNotFound(id))
    }

    /// New tasks always start as `todo`.
    pub fn create_task(&mut self, input: NewTask) -> Result<Task> {
        validate_title(&input.title)?;
        self.project(input.project_id)?;
        self.check_stage_in_project(input.stage_id, input.project_id)
            .map_err(|e| match e {
                StagewiseError::StageNotFound(id) => StagewiseError::validation(format!(
                    "stage {id} does not belong to project {}",
                    input.project_id
                )),
                other => other,
            })?;

        self.mutate(|store| {
            let task = Task {
                id: take(&mut store.next.task),
                project_id: input.project_id,
                stage_id: input.stage_id,
                title: input.title.trim().to_string(),
                description: input.description.unwrap_or_default(),
                status: TaskStatus::Todo,
                due_date: input.due_date,
                created_at: Some(Utc::now()),
            };
            store.data.tasks.push(task.clone());
            Ok(task)
        })
    }

    pub fn update_task(&mut self, id: u64, patch: TaskPatch) -> Result<Task> {
        let project_id = self.task(id)?.project_id;
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(stage_id) = patch.stage_id {
            self.check_stage_in_project(stage_id, project_id)
                .map_err(|e| match e {
                    StagewiseError::StageNotFound(id) => StagewiseError::validation(format!(
                        "stage {id} does not belong to project {project_id}"
                    )),
                    other => other,
                })?;
        }

        self.mutate(|store| {
            let task = store
                .data
                .tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or(StagewiseError::TaskNotFound(id))?;
            if let Some(title) = patch.title {
                task.title = title.trim().to_string();
            }
            if let Some(description) = patch.description {
                task.description = description;
            }
            if let Some(status) = patch.status {
                task.status = status;
            }
            if let Some(stage_id) = patch.stage_id {
                task.stage_id = stage_id;
            }
            if let Some(due_date) = patch.due_date {
                task.due_date = due_date;
            }
            Ok(task.clone())
        })
    }

    pub fn delete_task(&mut self, id: u64) -> Result<()> {
        self.task(id)?;
        self.mutate(|store| {
            store.data.tasks.retain(|t| t.id != id);
            Ok(())
        })
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    pub fn settings(&self) -> Settings {
        self.data.settings
    }

    pub fn replace_settings(&mut self, settings: Settings) -> Result<Settings> {
        self.mutate(|store| {
            store.data.settings = settings;
            Ok(settings)
        })
    }

    pub fn patch_settings(&mut self, patch: &SettingsPatch) -> Result<Settings> {
        self.mutate(|store| {
            store.data.settings.apply(patch);
            Ok(store.data.settings)
        })
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub fn users(&self) -> Vec<PublicUser> {
        self.data.users().iter().map(User::public).collect()
    }

    fn users_mut(&mut self) -> &mut Vec<User> {
        self.data.users.get_or_insert_with(Vec::new)
    }

    fn username_taken(&self, username: &str, except: Option<u64>) -> bool {
        self.data
            .users()
            .iter()
            .any(|u| u.username == username && Some(u.id) != except)
    }

    pub fn create_user(&mut self, input: NewUser) -> Result<PublicUser> {
        validate_new_user(&input)?;
        let username = input.username.trim().to_string();
        if self.username_taken(&username, None) {
            return Err(StagewiseError::UsernameTaken(username));
        }
        self.mutate(|store| {
            let user = User {
                id: take(&mut store.next.user),
                name: input
                    .name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| username.clone()),
                username,
                password: input.password,
                role: input.role.unwrap_or(Role::Viewer),
            };
            let public = user.public();
            store.users_mut().push(user);
            Ok(public)
        })
    }

    pub fn update_user(&mut self, id: u64, patch: &UserPatch) -> Result<PublicUser> {
        if let Some(username) = patch.new_username() {
            if self.username_taken(username, Some(id)) {
                return Err(StagewiseError::UsernameTaken(username.to_string()));
            }
        }
        self.mutate(|store| {
            let user = store
                .users_mut()
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or(StagewiseError::UserNotFound(id))?;
            patch.apply(user);
            Ok(user.public())
        })
    }

    pub fn delete_user(&mut self, id: u64) -> Result<()> {
        self.mutate(|store| {
            let users = store.users_mut();
            let before = users.len();
            users.retain(|u| u.id != id);
            if users.len() == before {
                return Err(StagewiseError::UserNotFound(id));
            }
            Ok(())
        })
    }

    /// Exact username and password match; no session is created.
    pub fn login(&self, credentials: &Credentials) -> Result<PublicUser> {
        self.data
            .users()
            .iter()
            .find(|u| u.matches(&credentials.username, &credentials.password))
            .map(User::public)
            .ok_or(StagewiseError::InvalidCredentials)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
