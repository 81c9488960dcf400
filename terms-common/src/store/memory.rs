//! In-memory document store
//!
//! Backs the workflow tests. Can be preloaded with documents
//! and told to fail every write, to exercise the store-error paths.

use super::{array_union, DocumentStore};
use crate::model::{TermRecord, TermsDocument};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type DocumentMap = HashMap<(String, String), TermsDocument>;

/// Document store kept in a process-local map
#[derive(Debug, Default, Clone)]
pub struct MemoryDocumentStore {
    documents: Arc<Mutex<DocumentMap>>,
    fail_writes: Arc<AtomicBool>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with one document
    pub fn with_document(collection: &str, key: &str, items: Vec<TermRecord>) -> Self {
        let store = Self::new();
        if let Ok(mut documents) = store.documents.lock() {
            documents.insert(
                (collection.to_string(), key.to_string()),
                TermsDocument::new(items),
            );
        }
        store
    }

    /// Make every subsequent write fail with a store error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `get_document` calls served
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of write calls that modified the map
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Synchronous snapshot of a document, for assertions
    pub fn snapshot(&self, collection: &str, key: &str) -> Option<TermsDocument> {
        self.documents
            .lock()
            .ok()?
            .get(&(collection.to_string(), key.to_string()))
            .cloned()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, DocumentMap>> {
        self.documents
            .lock()
            .map_err(|_| Error::Store("Failed to acquire lock".to_string()))
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Store("simulated write failure".to_string()));
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get_document(&self, collection: &str, key: &str) -> Result<Option<TermsDocument>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let documents = self.lock()?;
        Ok(documents
            .get(&(collection.to_string(), key.to_string()))
            .cloned())
    }

    async fn create_document(
        &self,
        collection: &str,
        key: &str,
        document: &TermsDocument,
    ) -> Result<bool> {
        self.check_writable()?;
        let mut documents = self.lock()?;
        let doc_id = (collection.to_string(), key.to_string());
        if documents.contains_key(&doc_id) {
            return Ok(false);
        }
        documents.insert(doc_id, document.clone());
        self.record_write();
        Ok(true)
    }

    async fn set_document(&self, collection: &str, key: &str, document: &TermsDocument) -> Result<()> {
        self.check_writable()?;
        let mut documents = self.lock()?;
        documents.insert((collection.to_string(), key.to_string()), document.clone());
        self.record_write();
        Ok(())
    }

    async fn union_append(&self, collection: &str, key: &str, items: &[TermRecord]) -> Result<usize> {
        self.check_writable()?;
        let mut documents = self.lock()?;
        let document = documents
            .get_mut(&(collection.to_string(), key.to_string()))
            .ok_or_else(|| Error::NotFound(format!("No document to update: {}/{}", collection, key)))?;
        let added = array_union(&mut document.items, items);
        if added > 0 {
            self.record_write();
        }
        Ok(added)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
