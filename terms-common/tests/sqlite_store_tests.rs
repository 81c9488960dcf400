//! On-disk SQLite store tests
//!
//! Exercises database creation, reopening, and the seed/append orchestrator
//! against a real database file.

use tempfile::TempDir;
use terms_common::store::SqliteDocumentStore;
use terms_common::{DocumentStore, Error, TermRecord, TermsRepository};

fn front(id: &str, term: &str, title: &str) -> TermRecord {
    TermRecord::new(id, "front end", term, title)
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("terms.db");
    assert!(!db_path.exists());

    let store = SqliteDocumentStore::open(&db_path).await;
    assert!(store.is_ok(), "Database initialization failed: {:?}", store.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_documents_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("terms.db");
    let records = vec![front("1a1f99ae-a50b-4096-8791-13f0ba3341df", "css grid", "CSS Grid")];

    {
        let repo = TermsRepository::new(SqliteDocumentStore::open(&db_path).await.unwrap(), "terms");
        repo.seed(&records).await.unwrap();
        repo.close().await;
    }

    let store = SqliteDocumentStore::open(&db_path).await.unwrap();
    let document = store.get_document("terms", "front_end").await.unwrap().unwrap();
    assert_eq!(document.items, records);
    store.close().await;
}

#[tokio::test]
async fn test_seed_then_append_flow() {
    let dir = TempDir::new().unwrap();
    let store = SqliteDocumentStore::open(&dir.path().join("terms.db")).await.unwrap();
    let repo = TermsRepository::new(store, "terms");

    let seeded = vec![front("1a1f99ae-a50b-4096-8791-13f0ba3341df", "css grid", "CSS Grid")];
    repo.seed(&seeded).await.unwrap();

    // second create-only seed must not clobber the document
    let err = repo
        .seed(&[front("6f9619ff-8b86-4011-b42d-00c04fc964ff", "flexbox", "Flexbox")])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::WouldOverwrite { .. }));

    let batch = vec![
        front("6f9619ff-8b86-4011-b42d-00c04fc964ff", "flexbox", "Flexbox"),
        front("c56a4180-65aa-42ec-a945-5fd21dec0538", "css grid", "Grid Again"),
    ];
    let conflicts = repo.exists_in_db(&batch, None).await.unwrap().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].index, 1);
    assert_eq!(conflicts[0].field(), "term");

    let clean = terms_common::reconcile::strip_conflicts(&batch, &conflicts);
    repo.append(&clean).await.unwrap();

    let stored = repo.store().get_document("terms", "front_end").await.unwrap().unwrap();
    assert_eq!(stored.items.len(), 2);
    assert_eq!(stored.items[1].term, "flexbox");

    assert!(repo.store().get_document("terms", "back_end").await.unwrap().is_none());
    repo.close().await;
}
