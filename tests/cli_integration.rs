//! CLI integration tests for editdesk
//!
//! These tests drive the binary end to end: workspace setup, members,
//! tasks with derived publish state, shifts and work logs.

use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Get a command instance for the editdesk binary
fn editdesk_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("editdesk"));
    cmd.env_remove("EDITDESK_DATABASE").env_remove("EDITDESK_LOG");
    cmd
}

/// Create a temporary directory and initialize a workspace
fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    editdesk_cmd().arg("init").arg(dir.path()).assert().success();
    dir
}

/// Runs a command in JSON mode and parses stdout
fn json(dir: &TempDir, args: &[&str]) -> Value {
    let output = editdesk_cmd()
        .current_dir(dir.path())
        .args(["--format", "json"])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Workspace with three members: 1 Mina (writer), 2 Aoi (editor), 3 Ren (checker)
fn setup_team() -> TempDir {
    let dir = setup_workspace();
    json(&dir, &["user", "add", "Mina"]);
    json(&dir, &["user", "add", "Aoi", "--role", "editor"]);
    json(&dir, &["user", "add", "Ren", "--role", "checker"]);
    dir
}

fn add_task(dir: &TempDir, title: &str, extra: &[&str]) -> Value {
    let mut args = vec![
        "task", "add", title, "--assignee", "1", "--author", "2", "--checker", "3", "--due",
        "2024-04-01",
    ];
    args.extend_from_slice(extra);
    json(dir, &args)
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    editdesk_cmd()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized editdesk workspace"));

    assert!(dir.path().join(".editdesk").is_dir());
    assert!(dir.path().join(".editdesk/config.toml").is_file());
    assert!(dir.path().join(".editdesk/.gitignore").is_file());
    assert!(dir.path().join(".editdesk/editdesk.db").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    editdesk_cmd().arg("init").arg(dir.path()).assert().success();
    editdesk_cmd().arg("init").arg(dir.path()).assert().success();
}

#[test]
fn test_commands_require_workspace() {
    let dir = TempDir::new().unwrap();

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["task", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in an editdesk workspace"));
}

#[test]
fn test_workspace_flag_and_database_override() {
    let dir = setup_workspace();
    let elsewhere = TempDir::new().unwrap();
    let db_path = elsewhere.path().join("shared.db");

    editdesk_cmd()
        .env("EDITDESK_DATABASE", &db_path)
        .arg("--workspace")
        .arg(dir.path())
        .args(["user", "add", "Sora"])
        .assert()
        .success();

    assert!(db_path.is_file());

    // The workspace's own database doesn't see the member
    editdesk_cmd()
        .arg("--workspace")
        .arg(dir.path())
        .args(["user", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No members"));
}

// =============================================================================
// Member Tests
// =============================================================================

#[test]
fn test_user_lifecycle() {
    let dir = setup_team();

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["user", "deactivate", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deactivated member 1: Mina"));

    let active = json(&dir, &["user", "list"]);
    let names: Vec<&str> = active
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Aoi", "Ren"]);

    let all = json(&dir, &["user", "list", "--all"]);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let mina = json(&dir, &["user", "activate", "1"]);
    assert_eq!(mina["isActive"], true);
    assert_eq!(mina["role"], "writer");
}

#[test]
fn test_user_not_found() {
    let dir = setup_workspace();

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["user", "activate", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("User 42 not found"));
}

// =============================================================================
// Task Tests
// =============================================================================

#[test]
fn test_task_add_and_show() {
    let dir = setup_team();

    let task = add_task(&dir, "Spring travel guide", &["--start", "2024-03-20", "--slug", "spring-guide"]);
    assert_eq!(task["id"], 1);
    assert_eq!(task["status"], "not_started");
    assert_eq!(task["type"], "new_article");
    assert_eq!(task["isPublished"], false);
    assert_eq!(task["publishedAt"], Value::Null);
    assert_eq!(task["dueDate"], "2024-04-01T00:00:00");

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["task", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: Spring travel guide"))
        .stdout(predicate::str::contains("Slug: spring-guide"))
        .stdout(predicate::str::contains("Published: no"));
}

#[test]
fn test_task_add_requires_participants() {
    let dir = setup_team();

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["task", "add", "Missing checker", "--assignee", "1", "--author", "2", "--due", "2024-04-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task checker is required"));

    editdesk_cmd()
        .current_dir(dir.path())
        .args([
            "task", "add", "Unknown member", "--assignee", "9", "--author", "2", "--checker", "3",
            "--due", "2024-04-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("User 9 not found"));
}

#[test]
fn test_task_created_done_is_published() {
    let dir = setup_team();

    let task = add_task(&dir, "Rewrite FAQ", &["--type", "rewrite", "--status", "done", "--published-at", "2024-03-20"]);
    assert_eq!(task["isPublished"], true);
    assert_eq!(task["publishedAt"], "2024-03-20T00:00:00");

    let other = add_task(&dir, "Team offsite", &["--type", "other", "--status", "done"]);
    assert_eq!(other["isPublished"], false);
    assert_eq!(other["publishedAt"], Value::Null);
}

#[test]
fn test_task_publish_state_follows_status() {
    let dir = setup_team();
    add_task(&dir, "Interview", &[]);

    let done = json(&dir, &["task", "update", "1", "--status", "done", "--published-at", "2024-03-25"]);
    assert_eq!(done["isPublished"], true);
    assert_eq!(done["publishedAt"], "2024-03-25T00:00:00");

    // Touching only the title leaves the publish date alone
    let retitled = json(&dir, &["task", "update", "1", "--title", "Interview, part 1"]);
    assert_eq!(retitled["publishedAt"], "2024-03-25T00:00:00");

    // Re-sending done without a date keeps the recorded instant
    let again = json(&dir, &["task", "update", "1", "--json", r#"{"status": "done"}"#]);
    assert_eq!(again["publishedAt"], "2024-03-25T00:00:00");

    let held = json(&dir, &["task", "update", "1", "--status", "on_hold"]);
    assert_eq!(held["isPublished"], false);
    assert_eq!(held["publishedAt"], Value::Null);
}

#[test]
fn test_task_update_json_and_clear_flags() {
    let dir = setup_team();
    add_task(&dir, "Column", &["--start", "2024-03-20", "--url", "https://example.com/column"]);

    let updated = json(
        &dir,
        &["task", "update", "1", "--json", r#"{"startDate": null, "assigneeId": 2}"#, "--clear-url"],
    );
    assert_eq!(updated["startDate"], Value::Null);
    assert_eq!(updated["articleUrl"], Value::Null);
    assert_eq!(updated["assigneeId"], 2);
}

#[test]
fn test_task_update_rejects_bad_input() {
    let dir = setup_team();
    add_task(&dir, "Column", &[]);

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["task", "update", "1", "--due", "next week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid due date"));

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["task", "update", "1", "--json", "{oops"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid update payload"));

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["task", "update", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to update"));

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["task", "update", "7", "--title", "Ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task 7 not found"));
}

#[test]
fn test_task_list_filters() {
    let dir = setup_team();
    add_task(&dir, "Late", &["--due", "2024-04-20"]);
    add_task(&dir, "Early", &["--due", "2024-03-10"]);
    add_task(&dir, "Published", &["--status", "done", "--published-at", "2024-02-14"]);

    let titles = |args: &[&str]| -> Vec<String> {
        let mut full = vec!["task", "list"];
        full.extend_from_slice(args);
        json(&dir, &full)
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap().to_string())
            .collect()
    };

    assert_eq!(titles(&[]), vec!["Early", "Published", "Late"]);
    assert_eq!(titles(&["--exclude-done"]), vec!["Early", "Late"]);
    assert_eq!(titles(&["--published", "true", "--published-month", "2024-02"]), vec!["Published"]);
    assert_eq!(titles(&["--due-by", "2024-03-31"]), vec!["Early"]);
    assert_eq!(titles(&["--sort", "created"]), vec!["Published", "Early", "Late"]);

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["task", "list", "--published-month", "2024-13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --published-month"));
}

#[test]
fn test_task_list_text_table() {
    let dir = setup_team();
    add_task(&dir, "Spring travel guide", &[]);

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["task", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("STATUS"))
        .stdout(predicate::str::contains("not_started"))
        .stdout(predicate::str::contains("Spring travel guide"));
}

#[test]
fn test_task_delete() {
    let dir = setup_team();
    add_task(&dir, "Short-lived", &[]);

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["task", "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted task 1"));

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["task", "show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task 1 not found"));
}

// =============================================================================
// Shift Tests
// =============================================================================

#[test]
fn test_shift_add_and_list_week() {
    let dir = setup_team();

    let shift = json(
        &dir,
        &["shift", "add", "--user", "1", "--date", "2024-03-12", "--start", "18:00", "--end", "24:00"],
    );
    assert_eq!(shift["date"], "2024-03-12");
    assert_eq!(shift["startTime"], "2024-03-12T18:00:00");
    assert_eq!(shift["endTime"], "2024-03-13T00:00:00");
    assert_eq!(shift["isWorking"], true);

    json(&dir, &["shift", "add", "--user", "2", "--date", "2024-03-11", "--start", "09:00", "--end", "17:00"]);
    json(&dir, &["shift", "add", "--user", "2", "--date", "2024-03-18", "--start", "09:00", "--end", "17:00"]);

    let week = json(&dir, &["shift", "list", "--week-start", "2024-03-13"]);
    let rows: Vec<(String, String)> = week
        .as_array()
        .unwrap()
        .iter()
        .map(|s| {
            (
                s["userName"].as_str().unwrap().to_string(),
                s["date"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Aoi".to_string(), "2024-03-11".to_string()),
            ("Mina".to_string(), "2024-03-12".to_string()),
        ]
    );

    let range = json(&dir, &["shift", "list", "--from", "2024-03-11", "--to", "2024-03-18"]);
    assert_eq!(range.as_array().unwrap().len(), 3);

    let day = json(&dir, &["shift", "list", "--date", "2024-03-12"]);
    assert_eq!(day.as_array().unwrap().len(), 1);
}

#[test]
fn test_shift_business_hours_enforced() {
    let dir = setup_team();

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["shift", "add", "--user", "1", "--date", "2024-03-12", "--start", "08:59", "--end", "12:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("start time must be 09:00 or later"));

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["shift", "add", "--user", "1", "--date", "2024-03-12", "--start", "12:00", "--end", "12:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("end time must be after start time"));

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["shift", "add", "--user", "1", "--date", "2024-03-12", "--start", "20:00", "--end", "24:01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid shift time"));

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["shift", "add", "--user", "1", "--date", "2024-02-30", "--start", "10:00", "--end", "12:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid shift date"));
}

#[test]
fn test_shift_list_requires_both_range_ends() {
    let dir = setup_workspace();

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["shift", "list", "--from", "2024-03-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("both --from and --to are required"));
}

#[test]
fn test_shift_update_keeps_omitted_times() {
    let dir = setup_team();
    json(
        &dir,
        &["shift", "add", "--user", "1", "--date", "2024-03-12", "--start", "10:00", "--end", "18:00", "--memo", "desk"],
    );

    let moved = json(&dir, &["shift", "update", "1", "--end", "20:00", "--clear-memo", "--working", "false"]);
    assert_eq!(moved["startTime"], "2024-03-12T10:00:00");
    assert_eq!(moved["endTime"], "2024-03-12T20:00:00");
    assert_eq!(moved["memo"], Value::Null);
    assert_eq!(moved["isWorking"], false);

    let reassigned = json(&dir, &["shift", "update", "1", "--json", r#"{"userId": 3, "startTime": ""}"#]);
    assert_eq!(reassigned["userName"], "Ren");
    assert_eq!(reassigned["startTime"], "2024-03-12T10:00:00");

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["shift", "update", "1", "--start", "07:30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("09:00 or later"));
}

#[test]
fn test_shift_delete() {
    let dir = setup_team();
    json(&dir, &["shift", "add", "--user", "1", "--date", "2024-03-12", "--start", "10:00", "--end", "18:00"]);

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["shift", "delete", "1"])
        .assert()
        .success();

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["shift", "delete", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Shift 1 not found"));
}

// =============================================================================
// Work Log Tests
// =============================================================================

#[test]
fn test_work_logs_snapshot_and_show() {
    let dir = setup_team();
    add_task(&dir, "Feature", &["--status", "in_progress"]);

    let first = json(&dir, &["log", "add", "--user", "1", "--task", "1", "--date", "2024-03-04", "--note", "outline"]);
    assert_eq!(first["statusSnapshot"], "in_progress");
    assert_eq!(first["taskTitle"], "Feature");

    json(
        &dir,
        &["log", "add", "--user", "3", "--task", "1", "--date", "2024-03-05", "--note", "review", "--status-snapshot", "check_request"],
    );

    let all = json(&dir, &["log", "list"]);
    let notes: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["note"].as_str().unwrap())
        .collect();
    assert_eq!(notes, vec!["review", "outline"]);

    let by_member = json(&dir, &["log", "list", "--user", "1"]);
    assert_eq!(by_member.as_array().unwrap().len(), 1);

    let on_day = json(&dir, &["log", "list", "--date", "2024-03-05"]);
    assert_eq!(on_day[0]["statusSnapshot"], "check_request");

    let detail = json(&dir, &["task", "show", "1"]);
    assert_eq!(detail["title"], "Feature");
    assert_eq!(detail["workLogs"].as_array().unwrap().len(), 2);
    assert_eq!(detail["workLogs"][0]["note"], "review");
}

// =============================================================================
// Output Tests
// =============================================================================

#[test]
fn test_json_errors_are_structured() {
    let dir = setup_workspace();

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["--format", "json", "task", "show", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#""success":false"#))
        .stderr(predicate::str::contains("Task 5 not found"));
}

#[test]
fn test_verbose_output() {
    let dir = setup_workspace();

    editdesk_cmd()
        .current_dir(dir.path())
        .args(["--verbose", "user", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[verbose]"));
}
