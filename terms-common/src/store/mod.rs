//! Document store collaborator
//!
//! A store holds named collections of documents; each document is a
//! [`TermsDocument`] (one `items` array). The write orchestrator only talks
//! to the [`DocumentStore`] trait so a SQLite database, an in-memory map or
//! a test double can sit behind it.

use crate::model::{TermRecord, TermsDocument};
use crate::Result;
use async_trait::async_trait;

pub mod memory;
#[cfg(feature = "sqlx")]
pub mod sqlite;

pub use memory::MemoryDocumentStore;
#[cfg(feature = "sqlx")]
pub use sqlite::SqliteDocumentStore;

/// Async document store used by the reconciliation layer
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for log lines (e.g. "sqlite", "memory")
    fn backend(&self) -> &'static str;

    /// Fetch a document
    ///
    /// # Returns
    /// * `Ok(None)` - The document does not exist
    async fn get_document(&self, collection: &str, key: &str) -> Result<Option<TermsDocument>>;

    /// Create a document only if it does not exist yet
    ///
    /// The existence check and the write are a single atomic step.
    ///
    /// # Returns
    /// * `Ok(true)` - The document was created
    /// * `Ok(false)` - A document with this key already existed; nothing written
    async fn create_document(
        &self,
        collection: &str,
        key: &str,
        document: &TermsDocument,
    ) -> Result<bool>;

    /// Create or fully overwrite a document
    async fn set_document(&self, collection: &str, key: &str, document: &TermsDocument) -> Result<()>;

    /// Add every record not already element-equal to an existing item
    ///
    /// Equality is whole-record (all four fields). Records repeated inside
    /// `items` are added once.
    ///
    /// # Returns
    /// * `Ok(n)` - Number of records actually added
    /// * `Err(Error::NotFound)` - The document does not exist
    async fn union_append(&self, collection: &str, key: &str, items: &[TermRecord]) -> Result<usize>;

    /// Release the underlying connection
    async fn close(&self) {}
}

/// Whole-record array union: returns how many of `additions` were pushed
pub(crate) fn array_union(existing: &mut Vec<TermRecord>, additions: &[TermRecord]) -> usize {
    let mut added = 0;
    for record in additions {
        if !existing.contains(record) {
            existing.push(record.clone());
            added += 1;
        }
    }
    added
}
