//! Persistence seam. The engine computes transitions in memory and hands
//! finished records to an abstract repository; storage, querying, and retry
//! policy live on the other side of this trait.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::models::{CefrLevel, MasteryRecord, VocabularyItem};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("write conflict: {0}")]
    Conflict(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Optional constraints for `list_items`.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// Keep items sharing at least one of these tags. Empty means no tag
    /// constraint.
    pub tags: Vec<String>,
    pub level: Option<CefrLevel>,
}

impl ItemFilter {
    pub fn matches(&self, item: &VocabularyItem) -> bool {
        if let Some(level) = self.level {
            if item.level != Some(level) {
                return false;
            }
        }
        if !self.tags.is_empty() && !item.tags.iter().any(|tag| self.tags.contains(tag)) {
            return false;
        }
        true
    }
}

/// Abstract store for mastery records and vocabulary items.
///
/// `upsert_mastery_record` is a conditional write: it must compare the
/// record's `version` against the stored one and reject stale writes with
/// `Conflict`, so two concurrent answers to the same item can never silently
/// lose an increment. The engine never retries; callers own that policy.
#[allow(async_fn_in_trait)]
pub trait MasteryRepository: Send + Sync {
    async fn get_mastery_record(
        &self,
        learner_id: &str,
        item_id: &str,
    ) -> Result<Option<MasteryRecord>, RepositoryError>;

    /// Stores the record if its `version` matches the persisted version
    /// (0 for a record never written). Returns the stored copy with the
    /// version advanced.
    async fn upsert_mastery_record(
        &self,
        record: &MasteryRecord,
    ) -> Result<MasteryRecord, RepositoryError>;

    /// All records for the learner with `next_due <= now`, in a
    /// deterministic order. Callers sort; ties must stay stable across
    /// calls with equal inputs.
    async fn list_due_records(
        &self,
        learner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<MasteryRecord>, RepositoryError>;

    async fn list_items(
        &self,
        filter: Option<&ItemFilter>,
    ) -> Result<Vec<VocabularyItem>, RepositoryError>;
}

/// In-process reference implementation. Backs the test suite and lets
/// embedders run the engine without a database; the version check mirrors
/// what a storage-layer conditional update enforces.
#[derive(Default)]
pub struct MemoryRepository {
    items: RwLock<Vec<VocabularyItem>>,
    records: RwLock<BTreeMap<(String, String), MasteryRecord>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<VocabularyItem>) -> Self {
        let repo = Self::new();
        *repo.items.write() = items;
        repo
    }

    pub fn insert_item(&self, item: VocabularyItem) {
        self.items.write().push(item);
    }

    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }
}

impl MasteryRepository for MemoryRepository {
    async fn get_mastery_record(
        &self,
        learner_id: &str,
        item_id: &str,
    ) -> Result<Option<MasteryRecord>, RepositoryError> {
        let key = (learner_id.to_string(), item_id.to_string());
        Ok(self.records.read().get(&key).cloned())
    }

    async fn upsert_mastery_record(
        &self,
        record: &MasteryRecord,
    ) -> Result<MasteryRecord, RepositoryError> {
        let key = (record.learner_id.clone(), record.item_id.clone());
        let mut records = self.records.write();

        let stored_version = records.get(&key).map(|stored| stored.version).unwrap_or(0);
        if stored_version != record.version {
            return Err(RepositoryError::Conflict(format!(
                "record {} was modified concurrently (expected version {}, found {})",
                record.id, record.version, stored_version
            )));
        }

        let mut stored = record.clone();
        stored.version += 1;
        records.insert(key, stored.clone());
        Ok(stored)
    }

    async fn list_due_records(
        &self,
        learner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<MasteryRecord>, RepositoryError> {
        let records = self.records.read();
        Ok(records
            .values()
            .filter(|record| record.learner_id == learner_id && record.is_due(now))
            .cloned()
            .collect())
    }

    async fn list_items(
        &self,
        filter: Option<&ItemFilter>,
    ) -> Result<Vec<VocabularyItem>, RepositoryError> {
        let items = self.items.read();
        Ok(items
            .iter()
            .filter(|item| filter.map(|f| f.matches(item)).unwrap_or(true))
            .cloned()
            .collect())
    }
}
