//! Remote conflict detection and the seed/append write orchestrator
//!
//! [`TermsRepository`] owns a [`DocumentStore`] and a collection name. All
//! writes target the document keyed by `snake_case(records[0].type)`.

use crate::logger::TermsLogger;
use crate::model::{Conflict, TermRecord, TermsDocument};
use crate::store::DocumentStore;
use crate::{Error, Result};
use std::collections::HashSet;
use tracing::{debug, error, info};

/// Default collection holding the term documents
pub const DEFAULT_COLLECTION: &str = "terms";

/// How a seed treats an already existing document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedMode {
    /// Fail with [`Error::WouldOverwrite`] if the document exists
    #[default]
    CreateOnly,
    /// Replace the whole document unconditionally
    Overwrite,
}

impl SeedMode {
    pub fn from_force(force: bool) -> Self {
        if force {
            SeedMode::Overwrite
        } else {
            SeedMode::CreateOnly
        }
    }
}

/// Write orchestrator bound to one store and one collection
pub struct TermsRepository<S: DocumentStore> {
    store: S,
    collection: String,
}

impl<S: DocumentStore> TermsRepository<S> {
    pub fn new(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Compare a local batch against the stored document for its type
    ///
    /// With `remote_override` the comparison runs against those records and
    /// the store is never touched; otherwise exactly one document read is made.
    ///
    /// # Returns
    /// * `Ok(None)` - Empty batch, missing document, or nothing collides
    /// * `Ok(Some(conflicts))` - Non-empty list in (local index, remote order) order
    pub async fn exists_in_db(
        &self,
        local: &[TermRecord],
        remote_override: Option<&[TermRecord]>,
    ) -> Result<Option<Vec<Conflict>>> {
        let Some(anchor) = local.first() else {
            return Ok(None);
        };

        let conflicts = match remote_override {
            Some(remote) => find_conflicts(local, remote),
            None => {
                let key = document_key(anchor)?;
                match self.store.get_document(&self.collection, &key).await? {
                    Some(document) => find_conflicts(local, &document.items),
                    None => {
                        debug!("No stored document {}/{}; nothing to compare", self.collection, key);
                        Vec::new()
                    }
                }
            }
        };

        if conflicts.is_empty() {
            Ok(None)
        } else {
            debug!("{} conflict(s) against stored terms", conflicts.len());
            Ok(Some(conflicts))
        }
    }

    /// Create-only seed
    pub async fn seed(&self, records: &[TermRecord]) -> Result<String> {
        self.seed_with(records, SeedMode::CreateOnly).await
    }

    /// Destructive seed: replaces the whole document
    pub async fn overwrite_seed(&self, records: &[TermRecord]) -> Result<String> {
        self.seed_with(records, SeedMode::Overwrite).await
    }

    pub async fn seed_with(&self, records: &[TermRecord], mode: SeedMode) -> Result<String> {
        let Some(anchor) = records.first() else {
            return Err(Error::Shape("cannot seed an empty batch".to_string()));
        };
        let key = document_key(anchor)?;
        let document = TermsDocument::new(records.to_vec());

        debug!(
            "Seeding {}/{} via {} store ({:?}, {} record(s))",
            self.collection,
            key,
            self.store.backend(),
            mode,
            records.len()
        );

        let written = match mode {
            SeedMode::CreateOnly => {
                self.store
                    .create_document(&self.collection, &key, &document)
                    .await
            }
            SeedMode::Overwrite => self
                .store
                .set_document(&self.collection, &key, &document)
                .await
                .map(|()| true),
        };

        match written {
            Ok(true) => {
                info!("Seeded {} record(s) into {}/{}", records.len(), self.collection, key);
                Ok(format!(
                    "The collection '{}' was created and the document '{}' was added. \
                     {} term object(s) was seeded into the '{}' document.",
                    self.collection,
                    key,
                    records.len(),
                    key
                ))
            }
            Ok(false) => Err(Error::WouldOverwrite {
                collection: self.collection.clone(),
                key,
            }),
            Err(e) => {
                error!("Seeding {}/{} failed: {}", self.collection, key, e);
                Err(Error::SeedFailed)
            }
        }
    }

    /// Union-append a batch into its existing document
    ///
    /// Exact (all-field) duplicates are skipped; a record that differs only
    /// by `id` is added, so conflict detection has to run before this.
    pub async fn append(&self, records: &[TermRecord]) -> Result<String> {
        let Some(anchor) = records.first() else {
            return Ok("nothing to append".to_string());
        };
        let key = document_key(anchor)?;

        let added = self
            .store
            .union_append(&self.collection, &key, records)
            .await
            .map_err(|e| {
                error!("Appending to {}/{} failed: {}", self.collection, key, e);
                Error::Store(e.to_string())
            })?;

        info!(
            "Appended {} of {} record(s) to {}/{}",
            added,
            records.len(),
            self.collection,
            key
        );
        Ok(format!(
            "Terms object(s) successfully appended {} terms in the '{}' collection for the '{}' document. \
             NOTE: Duplicates were ignored.",
            added, self.collection, key
        ))
    }

    /// Release the store connection
    pub async fn close(&self) {
        self.store.close().await;
    }
}

fn document_key(anchor: &TermRecord) -> Result<String> {
    let key = anchor.document_key();
    if key.is_empty() {
        return Err(Error::Shape(format!(
            "type '{}' does not produce a document key",
            anchor.record_type
        )));
    }
    Ok(key)
}

/// Every (local, remote) pair sharing a `term` or a `title`
///
/// A pair sharing both yields two entries, term first.
pub fn find_conflicts(local: &[TermRecord], remote: &[TermRecord]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for (index, record) in local.iter().enumerate() {
        for stored in remote {
            if record.term == stored.term {
                conflicts.push(Conflict::on_term(&stored.id, index, &stored.term));
            }
            if record.title == stored.title {
                conflicts.push(Conflict::on_title(&stored.id, index, &stored.title));
            }
        }
    }
    conflicts
}

/// Write a human-readable conflict report through `logger`
pub fn conflict_report(local: &[TermRecord], conflicts: &[Conflict], logger: &dyn TermsLogger) {
    if conflicts.is_empty() {
        logger.log(
            "No duplicate data was found in the local terms. Data is safe to append to the database.",
        );
        return;
    }

    logger.log(
        "ERROR: Terms data you were trying to append the database already existed in the database.\n\
         Only the 'type' property can be non unique.",
    );
    logger.log("Report:");

    for conflict in conflicts {
        let offending = local
            .get(conflict.index)
            .and_then(|record| serde_json::to_string_pretty(record).ok())
            .unwrap_or_else(|| format!("<no local record at index {}>", conflict.index));
        logger.log(&format!(
            "Local term at index {}:\n{}\n'{}' property value already exists in the database: {}\n\
             id in the database for that terms object is: {}",
            conflict.index,
            offending,
            conflict.field(),
            conflict.value(),
            conflict.db_id
        ));
    }
}

/// Copy of `local` without any record named by a conflict, order preserved
pub fn strip_conflicts(local: &[TermRecord], conflicts: &[Conflict]) -> Vec<TermRecord> {
    let flagged: HashSet<usize> = conflicts.iter().map(|c| c.index).collect();
    local
        .iter()
        .enumerate()
        .filter(|(index, _)| !flagged.contains(index))
        .map(|(_, record)| record.clone())
        .collect()
}
