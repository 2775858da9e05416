use crate::catalog::{searchable_types, DEFAULT_EXCLUDED_TYPES};
use crate::fetch::{validate_page_size, PaginatedFetcher, DEFAULT_PAGE_SIZE};
use crate::naming::{is_person_type, IndexNamer, GLOBAL_INDEX, PEOPLE_INDEX};
use crate::registry::TransformerRegistry;
use crate::traits::{primary_tenant, ContentSource, SearchService};
use crate::{ContentStatus, IndexerError, Tenant};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Consecutive failed page fetches after which a content type is abandoned
/// for the current tenant.
pub const MAX_CONSECUTIVE_FETCH_FAILURES: u32 = 3;

#[derive(Debug, Clone)]
pub struct ReindexOptions {
    /// Restrict the run to one content type. Indexes are not cleared then.
    pub content_type: Option<String>,
    pub verbose: bool,
    pub page_size: usize,
}

impl Default for ReindexOptions {
    fn default() -> Self {
        Self {
            content_type: None,
            verbose: false,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReindexFailure {
    Clear {
        index: String,
        reason: String,
    },
    Fetch {
        index: String,
        tenant_id: u64,
        content_type: String,
        page: u32,
        reason: String,
    },
    Save {
        index: String,
        tenant_id: u64,
        content_type: String,
        page: u32,
        records: usize,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReindexReport {
    pub indexed_items: u64,
    pub indexed_records: u64,
    pub skipped_items: u64,
    pub failures: Vec<ReindexFailure>,
}

impl ReindexReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Rebuilds the global index, then the people index, from the content store.
///
/// Per-page failures are logged and recorded in the report and the walk moves
/// on to the next page. Only [`MAX_CONSECUTIVE_FETCH_FAILURES`] failed fetches
/// in a row end a content type early. There is no checkpoint: an interrupted
/// run has to start over.
pub struct Reindexer<C, S> {
    source: Arc<C>,
    service: Arc<S>,
    registry: Arc<TransformerRegistry>,
    namer: IndexNamer,
    excluded_types: Vec<String>,
}

struct TypeRun<'a> {
    index: &'a str,
    tenant: &'a Tenant,
    content_type: &'a str,
}

impl<C, S> Reindexer<C, S>
where
    C: ContentSource,
    S: SearchService,
{
    pub fn new(
        source: Arc<C>,
        service: Arc<S>,
        registry: Arc<TransformerRegistry>,
        namer: IndexNamer,
    ) -> Self {
        Self {
            source,
            service,
            registry,
            namer,
            excluded_types: DEFAULT_EXCLUDED_TYPES.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn with_excluded_types(mut self, excluded_types: Vec<String>) -> Self {
        self.excluded_types = excluded_types;
        self
    }

    pub async fn searchable_types(&self) -> Result<Vec<String>, IndexerError> {
        let tenants = self.source.tenants().await?;
        let primary = primary_tenant(&tenants).ok_or_else(|| {
            IndexerError::InvalidArgument("content store reported no tenants".to_string())
        })?;
        let types = self.source.content_types(primary).await?;
        Ok(searchable_types(&types, &self.excluded_types))
    }

    pub async fn run(&self, options: &ReindexOptions) -> Result<ReindexReport, IndexerError> {
        validate_page_size(options.page_size)?;
        let tenants = self.source.tenants().await?;
        let primary = primary_tenant(&tenants).cloned().ok_or_else(|| {
            IndexerError::InvalidArgument("content store reported no tenants".to_string())
        })?;
        let searchable = searchable_types(
            &self.source.content_types(&primary).await?,
            &self.excluded_types,
        );

        let selected = match &options.content_type {
            Some(content_type) if !searchable.contains(content_type) => {
                return Err(IndexerError::InvalidArgument(format!(
                    "{content_type} is not a valid content type"
                )));
            }
            Some(content_type) => vec![content_type.clone()],
            None => searchable,
        };
        let clear = options.content_type.is_none();
        let mut report = ReindexReport::default();

        let global_index = self.namer.qualify(GLOBAL_INDEX);
        if clear {
            self.clear(&global_index, &mut report).await;
        }
        for tenant in &tenants {
            info!(tenant_id = tenant.id, index = %global_index, "indexing tenant");
            for content_type in &selected {
                let run = TypeRun {
                    index: &global_index,
                    tenant,
                    content_type,
                };
                self.index_type(&run, options, &mut report).await?;
            }
        }

        // People content lives on the primary tenant only.
        let people_index = self.namer.qualify(PEOPLE_INDEX);
        if clear {
            self.clear(&people_index, &mut report).await;
        }
        for content_type in selected.iter().filter(|name| is_person_type(name)) {
            let run = TypeRun {
                index: &people_index,
                tenant: &primary,
                content_type,
            };
            self.index_type(&run, options, &mut report).await?;
        }

        info!(
            items = report.indexed_items,
            records = report.indexed_records,
            skipped = report.skipped_items,
            failures = report.failures.len(),
            "reindex finished"
        );
        Ok(report)
    }

    async fn clear(&self, index: &str, report: &mut ReindexReport) {
        info!(index = %index, "clearing all records from index");
        if let Err(error) = self.service.clear_index(index).await {
            let error = IndexerError::upstream("clear", index, error);
            error!(index = %index, error = %error, "index clear failed");
            report.failures.push(ReindexFailure::Clear {
                index: index.to_string(),
                reason: error.to_string(),
            });
        }
    }

    async fn index_type(
        &self,
        run: &TypeRun<'_>,
        options: &ReindexOptions,
        report: &mut ReindexReport,
    ) -> Result<(), IndexerError> {
        let mut fetcher = PaginatedFetcher::new(
            &*self.source,
            run.tenant,
            run.content_type,
            ContentStatus::Publish,
            options.page_size,
        )?;
        let mut type_count = 0u64;
        let mut consecutive_failures = 0u32;

        loop {
            let (page, items) = match fetcher.next_page().await {
                Ok(Some(page)) => {
                    consecutive_failures = 0;
                    page
                }
                Ok(None) => break,
                Err(error) => {
                    let page = fetcher.skip_page();
                    consecutive_failures += 1;
                    error!(
                        index = %run.index,
                        tenant_id = run.tenant.id,
                        content_type = %run.content_type,
                        page,
                        error = %error,
                        "content fetch failed, skipping page"
                    );
                    report.failures.push(ReindexFailure::Fetch {
                        index: run.index.to_string(),
                        tenant_id: run.tenant.id,
                        content_type: run.content_type.to_string(),
                        page,
                        reason: error.to_string(),
                    });

                    if consecutive_failures >= MAX_CONSECUTIVE_FETCH_FAILURES {
                        warn!(
                            tenant_id = run.tenant.id,
                            content_type = %run.content_type,
                            failures = consecutive_failures,
                            "giving up on content type"
                        );
                        break;
                    }
                    continue;
                }
            };

            let mut batch = Vec::new();
            let mut batch_items = 0u64;
            for item in &items {
                if options.verbose {
                    info!(content_type = %item.content_type, title = %item.title, "serializing");
                } else {
                    debug!(content_type = %item.content_type, title = %item.title, "serializing");
                }

                match self.registry.transform(item, run.tenant) {
                    Ok(records) if records.is_empty() => report.skipped_items += 1,
                    Ok(records) => {
                        batch.extend(records);
                        batch_items += 1;
                    }
                    Err(error) => {
                        warn!(item_id = item.id, error = %error, "item skipped");
                        report.skipped_items += 1;
                    }
                }
            }

            if batch.is_empty() {
                continue;
            }

            if options.verbose {
                info!(page, records = batch.len(), "sending batch");
            }

            match self.service.save_records(run.index, &batch).await {
                Ok(()) => {
                    type_count += batch_items;
                    report.indexed_items += batch_items;
                    report.indexed_records += batch.len() as u64;
                    info!(
                        index = %run.index,
                        tenant_id = run.tenant.id,
                        content_type = %run.content_type,
                        count = type_count,
                        "{type_count} {} records indexed",
                        run.content_type
                    );
                }
                Err(error) => {
                    let error = IndexerError::upstream("save", run.index, error);
                    error!(
                        index = %run.index,
                        content_type = %run.content_type,
                        page,
                        records = batch.len(),
                        error = %error,
                        "batch save failed"
                    );
                    report.failures.push(ReindexFailure::Save {
                        index: run.index.to_string(),
                        tenant_id: run.tenant.id,
                        content_type: run.content_type.to_string(),
                        page,
                        records: batch.len(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
