mod common;

use std::time::Duration;

use chrono::NaiveDate;
use common::{MemoryStore, task};
use tasktrack::board::TaskBoard;
use tasktrack::browse::Session;
use tasktrack::config::Config;
use tasktrack::form::DUE_DATE_IN_PAST;
use tasktrack::render::Renderer;

const DEBOUNCE: Duration = Duration::from_millis(20);

fn config(confirm_delete: bool) -> Config {
    Config {
        base_url: "http://localhost/tasks".to_string(),
        debounce_ms: 20,
        template_dir: None,
        confirm_delete,
    }
}

fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2029, 6, 1).unwrap()
}

fn store() -> MemoryStore {
    MemoryStore::with_tasks(vec![
        task("1", "Buy milk", "", false, ""),
        task("2", "Walk dog", "", true, ""),
    ])
}

/// Feed `input` to a session and return (output, store calls, remaining titles).
async fn run_session(input: &str, confirm_delete: bool) -> (String, Vec<String>, Vec<String>) {
    let renderer = Renderer::new(None).unwrap();
    let mut session = Session::new(
        TaskBoard::new(store()),
        &renderer,
        &config(confirm_delete),
        Vec::new(),
    )
    .with_today(fixed_today);
    session.run(input.as_bytes(), DEBOUNCE).await.unwrap();

    let calls = session.board().store().calls();
    let titles = session
        .board()
        .view()
        .tasks()
        .iter()
        .map(|t| t.task_name.clone())
        .collect();
    let out = String::from_utf8(session.into_output()).unwrap();
    (out, calls, titles)
}

#[tokio::test]
async fn initial_draw_lists_tasks() {
    let (out, calls, _) = run_session("quit\n", true).await;
    assert!(out.contains("Buy milk"));
    assert!(out.contains("Showing 2 of 2 tasks"));
    assert_eq!(calls, vec!["list".to_string()]);
}

#[tokio::test]
async fn rapid_search_edits_apply_only_the_last_term() {
    let (out, _, _) = run_session("/m\n/mi\n/milk\n", true).await;
    assert!(out.contains("Search: \"milk\""));
    assert!(!out.contains("Search: \"m\""));
    assert!(!out.contains("Search: \"mi\""));
    assert!(out.contains("Showing 1 of 2 tasks"));
}

#[tokio::test]
async fn status_filter_and_clear() {
    let (out, _, _) = run_session("status completed\nclear\n", true).await;
    assert!(out.contains("Status: completed"));
    assert!(out.contains("Showing 1 of 2 tasks"));
    assert!(out.ends_with("Showing 2 of 2 tasks\n"));
}

#[tokio::test]
async fn delete_asks_for_confirmation() {
    let (out, calls, titles) = run_session("delete 1\nn\n", true).await;
    assert!(out.contains("Delete 'Buy milk'? [y/N]"));
    assert!(out.contains("Cancelled."));
    assert_eq!(calls, vec!["list".to_string()]);
    assert_eq!(titles.len(), 2);

    let (_, calls, titles) = run_session("delete 1\ny\n", true).await;
    assert_eq!(calls, vec!["list".to_string(), "delete 1".to_string()]);
    assert_eq!(titles, vec!["Walk dog"]);
}

#[tokio::test]
async fn delete_without_confirmation_when_disabled() {
    let (_, calls, _) = run_session("delete 2\n", false).await;
    assert_eq!(calls, vec!["list".to_string(), "delete 2".to_string()]);
}

#[tokio::test]
async fn add_validates_before_saving() {
    let (out, calls, _) = run_session("add Old task 2000-01-01\n", true).await;
    assert!(out.contains(DUE_DATE_IN_PAST));
    assert_eq!(calls, vec!["list".to_string()]);

    let (out, calls, titles) = run_session("add Buy oat milk 2030-01-02\n", true).await;
    assert!(out.contains("Showing 3 of 3 tasks"));
    assert_eq!(calls[1], "create Buy oat milk");
    assert!(titles.contains(&"Buy oat milk".to_string()));
}

#[tokio::test]
async fn toggle_by_row_number() {
    let (_, calls, _) = run_session("sort task_name\nsort task_name\ntoggle 1\n", true).await;
    // Descending by title puts "Walk dog" (id 2) first.
    assert_eq!(calls, vec!["list".to_string(), "update 2".to_string()]);
}

#[tokio::test]
async fn unknown_rows_and_commands_are_reported() {
    let (out, calls, _) = run_session("toggle 9\nfrobnicate\n", true).await;
    assert!(out.contains("No task at 9"));
    assert!(out.contains("unknown command: frobnicate"));
    assert_eq!(calls, vec!["list".to_string()]);
}
