use crate::{
    ContentError, ContentItem, ContentStatus, ContentTypeInfo, RecordFilter, SearchError,
    SearchRecord, Tenant,
};
use async_trait::async_trait;
use serde_json::Value;

/// Operations consumed from the hosted search service. Index names are
/// always physical (already prefixed).
#[async_trait]
pub trait SearchService: Send + Sync {
    // Returns once the service reports the task done.
    async fn clear_index(&self, index: &str) -> Result<(), SearchError>;

    // Completes before returning.
    async fn delete_by_filter(&self, index: &str, filter: &RecordFilter) -> Result<(), SearchError>;

    async fn save_records(&self, index: &str, records: &[SearchRecord]) -> Result<(), SearchError>;

    async fn index_exists(&self, index: &str) -> Result<bool, SearchError>;

    async fn get_settings(&self, index: &str) -> Result<Value, SearchError>;

    async fn set_settings(&self, index: &str, settings: &Value) -> Result<(), SearchError>;

    async fn browse_synonyms(&self, index: &str) -> Result<Vec<Value>, SearchError>;

    async fn replace_synonyms(&self, index: &str, synonyms: &[Value]) -> Result<(), SearchError>;

    async fn browse_rules(&self, index: &str) -> Result<Vec<Value>, SearchError>;

    async fn replace_rules(&self, index: &str, rules: &[Value]) -> Result<(), SearchError>;
}

#[derive(Debug, Clone)]
pub struct PageRequest<'a> {
    pub tenant: &'a Tenant,
    pub content_type: &'a str,
    pub status: ContentStatus,
    /// 1-based.
    pub page: u32,
    pub page_size: usize,
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn tenants(&self) -> Result<Vec<Tenant>, ContentError>;

    async fn content_types(&self, tenant: &Tenant) -> Result<Vec<ContentTypeInfo>, ContentError>;

    /// One page of items; an empty page means there is nothing further.
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Vec<ContentItem>, ContentError>;
}

/// The flagged primary tenant, else the one with the lowest id.
pub fn primary_tenant(tenants: &[Tenant]) -> Option<&Tenant> {
    tenants
        .iter()
        .find(|tenant| tenant.is_primary)
        .or_else(|| tenants.iter().min_by_key(|tenant| tenant.id))
}
