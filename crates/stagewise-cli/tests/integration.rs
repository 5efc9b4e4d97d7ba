#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn stagewise(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stagewise").unwrap();
    cmd.current_dir(dir.path()).env("STAGEWISE_ROOT", dir.path());
    cmd
}

fn init_tracker(dir: &TempDir) {
    stagewise(dir).arg("init").assert().success();
}

/// One dated project with two stages and a task, written straight to the
/// data file.
fn seed_project(dir: &TempDir) {
    let data = serde_json::json!({
        "projects": [{
            "id": 1,
            "name": "Atlas",
            "description": "Billing rewrite",
            "planned_weeks": 4,
            "start_date": "2024-01-01",
            "end_date": "2024-01-29",
            "notes": ""
        }],
        "stages": [
            {"id": 1, "project_id": 1, "name": "Design", "percentage": 60,
             "progress": 50, "color": "#3b82f6", "order_index": 0, "devops": 1, "engineers": 2},
            {"id": 2, "project_id": 1, "name": "Build", "percentage": 40,
             "progress": 0, "color": "#10b981", "order_index": 1, "devops": 0, "engineers": 0}
        ],
        "tasks": [
            {"id": 1, "project_id": 1, "stage_id": 1, "title": "Wireframes",
             "status": "done", "due_date": "2024-01-05"}
        ],
        "settings": {"totalDevops": 4, "totalEngineers": 10},
        "users": [
            {"id": 1, "username": "admin", "password": "admin123", "role": "admin",
             "name": "Administrator"}
        ]
    });
    std::fs::write(
        dir.path().join(".stagewise/data.json"),
        serde_json::to_string_pretty(&data).unwrap(),
    )
    .unwrap();
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

// ---------------------------------------------------------------------------
// stagewise init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_data_file() {
    let dir = TempDir::new().unwrap();
    stagewise(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: .stagewise/config.yaml"));

    assert!(dir.path().join(".stagewise/config.yaml").exists());
    let data = std::fs::read_to_string(dir.path().join(".stagewise/data.json")).unwrap();
    assert!(data.contains("\"admin\""));
    assert!(data.contains("\"viewer\""));
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    stagewise(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  .stagewise/config.yaml"));
}

#[test]
fn init_keeps_existing_data() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    seed_project(&dir);
    init_tracker(&dir);

    let projects = json_output(stagewise(&dir).args(["project", "list", "--json"]));
    assert_eq!(projects.as_array().unwrap().len(), 1);
}

#[test]
fn commands_require_init() {
    let dir = TempDir::new().unwrap();
    stagewise(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

// ---------------------------------------------------------------------------
// stagewise project
// ---------------------------------------------------------------------------

#[test]
fn project_list_empty() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    stagewise(&dir)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects."));
}

#[test]
fn project_list_shows_weighted_progress() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    seed_project(&dir);
    stagewise(&dir)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Atlas"))
        .stdout(predicate::str::contains("30.0%"));
}

#[test]
fn project_show_json_nests_stages_and_tasks() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    seed_project(&dir);

    let view = json_output(stagewise(&dir).args(["project", "show", "1", "--json"]));
    assert_eq!(view["name"], "Atlas");
    assert_eq!(view["stages"].as_array().unwrap().len(), 2);
    assert_eq!(view["tasks"][0]["title"], "Wireframes");
}

#[test]
fn project_show_missing_fails() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    stagewise(&dir)
        .args(["project", "show", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("project not found: 42"));
}

#[test]
fn project_timeline_splits_schedule_by_weight() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    seed_project(&dir);

    let calendar = json_output(stagewise(&dir).args(["project", "timeline", "1", "--json"]));
    let stages = calendar["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 2);
    // 28 days: Design takes 60% (17 days), Build ends on the project end.
    assert_eq!(stages[0]["start"], "2024-01-01");
    assert_eq!(stages[0]["end"], "2024-01-17");
    assert_eq!(stages[1]["start"], "2024-01-18");
    assert_eq!(stages[1]["end"], "2024-01-29");
    assert_eq!(calendar["timeline"]["actual_progress"], 30.0);
}

// ---------------------------------------------------------------------------
// stagewise settings / user
// ---------------------------------------------------------------------------

#[test]
fn settings_set_updates_only_given_totals() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    stagewise(&dir)
        .args(["settings", "set", "--devops", "5", "--engineers", "12"])
        .assert()
        .success();
    stagewise(&dir)
        .args(["settings", "set", "--devops", "7"])
        .assert()
        .success();

    let settings = json_output(stagewise(&dir).args(["settings", "show", "--json"]));
    assert_eq!(settings["totalDevops"], 7);
    assert_eq!(settings["totalEngineers"], 12);
}

#[test]
fn settings_set_without_values_fails() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    stagewise(&dir)
        .args(["settings", "set"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to set"));
}

#[test]
fn user_add_and_list() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    stagewise(&dir)
        .args(["user", "add", "maria", "--password", "s3cret", "--role", "admin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created user maria"));

    let users = json_output(stagewise(&dir).args(["user", "list", "--json"]));
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 3);
    let maria = users.iter().find(|u| u["username"] == "maria").unwrap();
    assert_eq!(maria["role"], "admin");
    assert_eq!(maria["name"], "maria");
    assert!(maria.get("password").is_none());
}

#[test]
fn user_add_duplicate_fails() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    stagewise(&dir)
        .args(["user", "add", "admin", "--password", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("username already exists: admin"));
}

#[test]
fn user_add_rejects_unknown_role() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    stagewise(&dir)
        .args(["user", "add", "sam", "--password", "x", "--role", "owner"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid role 'owner'"));
}

// ---------------------------------------------------------------------------
// stagewise status / report
// ---------------------------------------------------------------------------

#[test]
fn status_json_reports_resources() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    seed_project(&dir);

    let dashboard = json_output(stagewise(&dir).args(["status", "--json"]));
    assert_eq!(dashboard["summary"]["total_projects"], 1);
    assert_eq!(dashboard["resources"]["utilized"]["devops"], 1);
    assert_eq!(dashboard["resources"]["available"]["engineers"], 8);
    assert_eq!(dashboard["stages_needing_resources"][0]["stage_name"], "Build");
}

#[test]
fn report_prints_text_for_requested_week() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    seed_project(&dir);
    stagewise(&dir)
        .args(["report", "--week", "2024-01-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WEEKLY STATUS REPORT"))
        .stdout(predicate::str::contains("January 01 - January 07, 2024"))
        .stdout(predicate::str::contains("Atlas"));
}

#[test]
fn report_output_dir_uses_week_file_name() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    let out = TempDir::new().unwrap();
    stagewise(&dir)
        .args(["report", "--week", "2024-01-03", "--output"])
        .arg(out.path())
        .assert()
        .success();

    let file = out.path().join("weekly-report-2024-01-01.txt");
    let text = std::fs::read_to_string(file).unwrap();
    assert!(text.starts_with(&"=".repeat(80)));
}

#[test]
fn report_rejects_bad_week() {
    let dir = TempDir::new().unwrap();
    init_tracker(&dir);
    stagewise(&dir)
        .args(["report", "--week", "last-tuesday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid week"));
}
