use crate::assembler::distinct_key;
use crate::naming::{is_person_type, IndexNamer, GLOBAL_INDEX, PEOPLE_INDEX};
use crate::registry::TransformerRegistry;
use crate::traits::SearchService;
use crate::{ContentItem, ContentStatus, IndexerError, RecordFilter, SearchRecord, Tenant};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Replaces the records of one content item: delete by distinct key, then save.
pub struct BatchUpserter<S> {
    service: Arc<S>,
    namer: IndexNamer,
}

impl<S> BatchUpserter<S>
where
    S: SearchService,
{
    pub fn new(service: Arc<S>, namer: IndexNamer) -> Self {
        Self { service, namer }
    }

    /// All `records` must come from one content item. The delete completes
    /// before the save is issued, so shrinking chunk counts leave no stale
    /// chunks behind.
    pub async fn upsert(&self, logical_index: &str, records: &[SearchRecord]) -> Result<(), IndexerError> {
        let Some(first) = records.first() else {
            return Ok(());
        };

        let index = self.namer.qualify(logical_index);
        self.delete_by_key(&index, &first.distinct_key).await?;

        self.service
            .save_records(&index, records)
            .await
            .map_err(|error| IndexerError::upstream("save", &index, error))?;

        debug!(index = %index, distinct_key = %first.distinct_key, records = records.len(), "records replaced");
        Ok(())
    }

    pub async fn remove(&self, logical_index: &str, key: &str) -> Result<(), IndexerError> {
        let index = self.namer.qualify(logical_index);
        self.delete_by_key(&index, key).await
    }

    async fn delete_by_key(&self, index: &str, key: &str) -> Result<(), IndexerError> {
        let filter = RecordFilter::DistinctKey(key.to_string());
        self.service
            .delete_by_filter(index, &filter)
            .await
            .map_err(|error| IndexerError::upstream("delete", index, error))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotSearchable,
    Revision,
    Status(ContentStatus),
    NoTransformer,
    NoRecords,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Indexed { records: usize, people: bool },
    Removed { people: bool },
    Skipped(SkipReason),
}

pub struct IncrementalIndexer<S> {
    upserter: BatchUpserter<S>,
    registry: Arc<TransformerRegistry>,
    searchable_types: Vec<String>,
}

impl<S> IncrementalIndexer<S>
where
    S: SearchService,
{
    pub fn new(
        upserter: BatchUpserter<S>,
        registry: Arc<TransformerRegistry>,
        searchable_types: Vec<String>,
    ) -> Self {
        Self {
            upserter,
            registry,
            searchable_types,
        }
    }

    pub async fn content_saved(&self, item: &ContentItem, tenant: &Tenant) -> Result<UpdateOutcome, IndexerError> {
        if !self.searchable_types.iter().any(|name| *name == item.content_type) {
            return Ok(UpdateOutcome::Skipped(SkipReason::NotSearchable));
        }
        if item.is_revision || item.is_autosave {
            return Ok(UpdateOutcome::Skipped(SkipReason::Revision));
        }
        if !matches!(item.status, ContentStatus::Publish | ContentStatus::Trash) {
            return Ok(UpdateOutcome::Skipped(SkipReason::Status(item.status)));
        }
        if !self.registry.contains(&item.content_type) {
            warn!(content_type = %item.content_type, item_id = item.id, "no transformer registered, update skipped");
            return Ok(UpdateOutcome::Skipped(SkipReason::NoTransformer));
        }

        let people = is_person_type(&item.content_type);

        if item.status == ContentStatus::Trash {
            let key = distinct_key(tenant.id, &item.content_type, item.id);
            let global = self.upserter.remove(GLOBAL_INDEX, &key).await;
            let mirrored = if people {
                self.upserter.remove(PEOPLE_INDEX, &key).await
            } else {
                Ok(())
            };
            global.and(mirrored)?;
            info!(distinct_key = %key, "trashed item removed from search");
            return Ok(UpdateOutcome::Removed { people });
        }

        let records = self.registry.transform(item, tenant)?;
        if records.is_empty() {
            return Ok(UpdateOutcome::Skipped(SkipReason::NoRecords));
        }

        // The people index is written even when the global write failed.
        let global = self.upserter.upsert(GLOBAL_INDEX, &records).await;
        let mirrored = if people {
            self.upserter.upsert(PEOPLE_INDEX, &records).await
        } else {
            Ok(())
        };
        global.and(mirrored)?;

        info!(
            content_type = %item.content_type,
            item_id = item.id,
            records = records.len(),
            people,
            "item reindexed"
        );
        Ok(UpdateOutcome::Indexed {
            records: records.len(),
            people,
        })
    }
}
