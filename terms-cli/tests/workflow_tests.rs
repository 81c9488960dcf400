//! Batch workflow tests
//!
//! Drives each branch of the seed/append/check flow with scripted answers
//! against the in-memory store.

use serde_json::{json, Value};
use terms_cli::workflow::{self, OVERWRITE_PROMPT, REPORT_PROMPT, STRIP_PROMPT};
use terms_cli::{AssumeYes, Outcome, ScriptedPrompter, WorkflowOptions, WriteMode};
use terms_common::logger::MemoryLogger;
use terms_common::store::MemoryDocumentStore;
use terms_common::{TermRecord, TermsRepository};

const ID_1: &str = "1a1f99ae-a50b-4096-8791-13f0ba3341df";
const ID_2: &str = "75d69da3-618f-4567-a58a-d27c1425a1a5";
const ID_3: &str = "238eec8e-f1ee-4b8c-9fe3-81fc52e6f755";
const ID_DB: &str = "c56a4180-65aa-42ec-a945-5fd21dec0538";

fn raw(id: &str, term: &str, title: &str) -> Value {
    json!({ "id": id, "type": "front end", "term": term, "title": title })
}

fn stored_grid() -> TermRecord {
    TermRecord::new(ID_DB, "front end", "css grid", "CSS Grid")
}

fn repo(store: &MemoryDocumentStore) -> TermsRepository<MemoryDocumentStore> {
    TermsRepository::new(store.clone(), "terms")
}

async fn run(
    store: &MemoryDocumentStore,
    batch: &[Value],
    mode: WriteMode,
    prompter: &mut ScriptedPrompter,
    options: WorkflowOptions,
) -> (Outcome, MemoryLogger) {
    let console = MemoryLogger::new();
    let outcome = workflow::run_raw(&repo(store), batch, mode, prompter, &console, options).await;
    (outcome, console)
}

#[tokio::test]
async fn test_invalid_batch_exits_1_without_writing() {
    let store = MemoryDocumentStore::new();
    let batch = vec![json!({ "id": "not-a-uuid", "type": "front end", "term": "a", "title": "A" })];
    let mut prompter = ScriptedPrompter::default();

    let (outcome, _) = run(&store, &batch, WriteMode::Seed, &mut prompter, Default::default()).await;

    assert!(matches!(outcome, Outcome::Invalid(_)));
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(store.write_count(), 0);
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_debug_reports_failed_rule() {
    let store = MemoryDocumentStore::new();
    let batch = vec![raw(ID_1, "grid", "Grid"), json!({ "id": ID_2, "type": "back end", "term": "b", "title": "B" })];
    let mut prompter = ScriptedPrompter::default();
    let options = WorkflowOptions { debug: true, dry_run: false };

    let (outcome, console) = run(&store, &batch, WriteMode::Seed, &mut prompter, options).await;

    assert!(matches!(outcome, Outcome::Invalid(_)));
    assert!(console.contains("Term type value mismatch at index 1"));
}

#[tokio::test]
async fn test_duplicate_terms_are_invalid() {
    let store = MemoryDocumentStore::new();
    let batch = vec![raw(ID_1, "grid", "Grid"), raw(ID_2, "grid", "Grid 2")];
    let mut prompter = ScriptedPrompter::default();

    let (outcome, console) = run(&store, &batch, WriteMode::Seed, &mut prompter, Default::default()).await;

    assert!(matches!(outcome, Outcome::Invalid(_)));
    assert!(console.contains("The problematic term object property was: term"));
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_seed_creates_document() {
    let store = MemoryDocumentStore::new();
    let batch = vec![raw(ID_1, "grid", "Grid"), raw(ID_2, "flexbox", "Flexbox")];
    let mut prompter = ScriptedPrompter::default();

    let (outcome, _) = run(&store, &batch, WriteMode::Seed, &mut prompter, Default::default()).await;

    assert!(matches!(outcome, Outcome::Done(ref msg) if msg.contains("2 term object(s)")));
    assert_eq!(store.snapshot("terms", "front_end").unwrap().items.len(), 2);
    assert!(prompter.asked().is_empty());
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_seed_existing_document_fails() {
    let store = MemoryDocumentStore::with_document("terms", "front_end", vec![stored_grid()]);
    let batch = vec![raw(ID_1, "flexbox", "Flexbox")];
    let mut prompter = ScriptedPrompter::default();

    let (outcome, _) = run(&store, &batch, WriteMode::Seed, &mut prompter, Default::default()).await;

    assert!(matches!(outcome, Outcome::Failed(ref msg) if msg.contains("would have overwritten")));
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(store.snapshot("terms", "front_end").unwrap().items, vec![stored_grid()]);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_overwrite_declined_is_aborted_exit_0() {
    let store = MemoryDocumentStore::with_document("terms", "front_end", vec![stored_grid()]);
    let batch = vec![raw(ID_1, "flexbox", "Flexbox")];
    let mut prompter = ScriptedPrompter::new(["n"]);

    let (outcome, _) = run(&store, &batch, WriteMode::OverwriteSeed, &mut prompter, Default::default()).await;

    assert_eq!(outcome, Outcome::Declined("Aborted seeding operation.".to_string()));
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(prompter.asked(), &[OVERWRITE_PROMPT]);
    assert_eq!(store.write_count(), 0);
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_overwrite_confirmed_replaces_document() {
    let store = MemoryDocumentStore::with_document("terms", "front_end", vec![stored_grid()]);
    let batch = vec![raw(ID_1, "flexbox", "Flexbox")];
    let mut prompter = ScriptedPrompter::new(["y"]);

    let (outcome, _) = run(&store, &batch, WriteMode::OverwriteSeed, &mut prompter, Default::default()).await;

    assert!(outcome.is_success());
    let items = store.snapshot("terms", "front_end").unwrap().items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].term, "flexbox");
}

#[tokio::test]
async fn test_append_without_conflicts_writes_directly() {
    let store = MemoryDocumentStore::with_document("terms", "front_end", vec![stored_grid()]);
    let batch = vec![raw(ID_1, "flexbox", "Flexbox")];
    let mut prompter = ScriptedPrompter::default();

    let (outcome, console) = run(&store, &batch, WriteMode::Append, &mut prompter, Default::default()).await;

    assert!(matches!(outcome, Outcome::Done(ref msg) if msg.contains("Duplicates were ignored")));
    assert!(console.contains("safe to append"));
    assert!(prompter.asked().is_empty());
    assert_eq!(store.snapshot("terms", "front_end").unwrap().items.len(), 2);
}

#[tokio::test]
async fn test_append_conflicts_report_then_strip() {
    let store = MemoryDocumentStore::with_document("terms", "front_end", vec![stored_grid()]);
    let batch = vec![
        raw(ID_1, "css grid", "Grid Layout"),
        raw(ID_2, "flexbox", "Flexbox"),
        raw(ID_3, "vue", "CSS Grid"),
    ];
    let mut prompter = ScriptedPrompter::new(["y", "y"]);

    let (outcome, console) = run(&store, &batch, WriteMode::Append, &mut prompter, Default::default()).await;

    assert!(outcome.is_success());
    assert_eq!(prompter.asked(), &[REPORT_PROMPT, STRIP_PROMPT]);
    assert!(console.contains("'term' property value already exists in the database: css grid"));
    assert!(console.contains("'title' property value already exists in the database: CSS Grid"));
    assert!(console.contains("Problematic data was removed."));

    let items = store.snapshot("terms", "front_end").unwrap().items;
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].term, "flexbox");
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_append_report_declined_still_asks_to_strip() {
    let store = MemoryDocumentStore::with_document("terms", "front_end", vec![stored_grid()]);
    let batch = vec![raw(ID_1, "css grid", "Grid Layout"), raw(ID_2, "flexbox", "Flexbox")];
    let mut prompter = ScriptedPrompter::new(["n", "n"]);

    let (outcome, console) = run(&store, &batch, WriteMode::Append, &mut prompter, Default::default()).await;

    assert_eq!(
        outcome,
        Outcome::Declined("No data was appended. Program aborted.".to_string())
    );
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(prompter.asked(), &[REPORT_PROMPT, STRIP_PROMPT]);
    assert!(!console.contains("Report:"));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_append_typo_at_strip_prompt_asks_again() {
    let store = MemoryDocumentStore::with_document("terms", "front_end", vec![stored_grid()]);
    let batch = vec![raw(ID_1, "css grid", "Grid Layout"), raw(ID_2, "flexbox", "Flexbox")];
    let mut prompter = ScriptedPrompter::new(["n", "yy", "y"]);

    let (outcome, _) = run(&store, &batch, WriteMode::Append, &mut prompter, Default::default()).await;

    assert!(outcome.is_success());
    assert_eq!(prompter.asked(), &[REPORT_PROMPT, STRIP_PROMPT, STRIP_PROMPT]);
    let items = store.snapshot("terms", "front_end").unwrap().items;
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].term, "flexbox");
}

#[tokio::test]
async fn test_append_nothing_left_exits_1() {
    let store = MemoryDocumentStore::with_document("terms", "front_end", vec![stored_grid()]);
    let batch = vec![raw(ID_1, "css grid", "CSS Grid")];
    let mut prompter = ScriptedPrompter::new(["n", "y"]);

    let (outcome, _) = run(&store, &batch, WriteMode::Append, &mut prompter, Default::default()).await;

    assert_eq!(outcome, Outcome::NothingLeft);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(store.write_count(), 0);
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_append_write_failure_exits_1_and_closes() {
    let store = MemoryDocumentStore::with_document("terms", "front_end", vec![stored_grid()]);
    store.fail_writes(true);
    let batch = vec![raw(ID_1, "flexbox", "Flexbox")];
    let mut prompter = ScriptedPrompter::default();

    let (outcome, _) = run(&store, &batch, WriteMode::Append, &mut prompter, Default::default()).await;

    assert!(matches!(outcome, Outcome::Failed(ref msg) if msg.contains("simulated write failure")));
    assert_eq!(outcome.exit_code(), 1);
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_append_missing_document_fails() {
    let store = MemoryDocumentStore::new();
    let batch = vec![raw(ID_1, "flexbox", "Flexbox")];
    let mut prompter = ScriptedPrompter::default();

    let (outcome, _) = run(&store, &batch, WriteMode::Append, &mut prompter, Default::default()).await;

    assert!(matches!(outcome, Outcome::Failed(_)));
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let store = MemoryDocumentStore::with_document("terms", "front_end", vec![stored_grid()]);
    let batch = vec![raw(ID_1, "css grid", "Grid Layout"), raw(ID_2, "flexbox", "Flexbox")];
    let mut prompter = ScriptedPrompter::new(["n", "y"]);
    let options = WorkflowOptions { debug: false, dry_run: true };

    let (outcome, _) = run(&store, &batch, WriteMode::Append, &mut prompter, options).await;

    assert!(matches!(outcome, Outcome::Done(ref msg) if msg.starts_with("Dry run: 1 term object(s)")));
    assert_eq!(store.write_count(), 0);
    assert_eq!(store.read_count(), 1);
}

#[tokio::test]
async fn test_check_reports_conflicts() {
    let store = MemoryDocumentStore::with_document("terms", "front_end", vec![stored_grid()]);
    let batch = vec![raw(ID_1, "css grid", "CSS Grid")];
    let mut prompter = ScriptedPrompter::default();

    let (outcome, console) = run(&store, &batch, WriteMode::Check, &mut prompter, Default::default()).await;

    assert_eq!(outcome, Outcome::Conflicts(2));
    assert!(console.contains(&format!("id in the database for that terms object is: {}", ID_DB)));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_check_clean_batch() {
    let store = MemoryDocumentStore::new();
    let batch = vec![raw(ID_1, "flexbox", "Flexbox")];
    let mut prompter = ScriptedPrompter::default();

    let (outcome, console) = run(&store, &batch, WriteMode::Check, &mut prompter, Default::default()).await;

    assert!(outcome.is_success());
    assert!(console.contains("safe to append"));
}

#[tokio::test]
async fn test_assume_yes_strips_and_appends() {
    let store = MemoryDocumentStore::with_document("terms", "front_end", vec![stored_grid()]);
    let records = vec![
        TermRecord::new(ID_1, "front end", "css grid", "Grid Layout"),
        TermRecord::new(ID_2, "front end", "flexbox", "Flexbox"),
    ];
    let console = MemoryLogger::new();

    let outcome = workflow::run_records(
        &repo(&store),
        &records,
        WriteMode::Append,
        &mut AssumeYes,
        &console,
        WorkflowOptions::default(),
    )
    .await;

    assert!(outcome.is_success());
    assert!(console.contains("Report:"));
    assert_eq!(store.snapshot("terms", "front_end").unwrap().items.len(), 2);
}
