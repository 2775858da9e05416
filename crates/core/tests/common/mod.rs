#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use site_search_core::{
    ContentError, ContentItem, ContentSource, ContentStatus, ContentTypeInfo, PageRequest,
    RecordFilter, SearchError, SearchRecord, SearchService, Tenant,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Clear(String),
    Delete(String, RecordFilter),
    Save(String, Vec<String>),
    SetSettings(String),
    ReplaceSynonyms(String, usize),
    ReplaceRules(String, usize),
}

#[derive(Default)]
struct ServiceState {
    indexes: HashMap<String, BTreeMap<String, SearchRecord>>,
    settings: HashMap<String, Value>,
    synonyms: HashMap<String, Vec<Value>>,
    rules: HashMap<String, Vec<Value>>,
    calls: Vec<Call>,
    save_calls: usize,
    failing_saves: HashSet<usize>,
    failing_clears: bool,
}

/// In-memory search service keyed by physical index name.
#[derive(Default)]
pub struct FakeSearchService {
    state: Mutex<ServiceState>,
}

impl FakeSearchService {
    pub fn seed(&self, index: &str, records: Vec<SearchRecord>) {
        let mut state = self.state.lock().unwrap();
        let stored = state.indexes.entry(index.to_string()).or_default();
        for record in records {
            stored.insert(record.object_id.clone(), record);
        }
    }

    pub fn create_index(&self, index: &str) {
        self.state
            .lock()
            .unwrap()
            .indexes
            .entry(index.to_string())
            .or_default();
    }

    /// Fails the n-th save call (1-based, counted across all indexes).
    pub fn fail_save_call(&self, call: usize) {
        self.state.lock().unwrap().failing_saves.insert(call);
    }

    pub fn fail_clears(&self) {
        self.state.lock().unwrap().failing_clears = true;
    }

    pub fn records(&self, index: &str) -> Vec<SearchRecord> {
        self.state
            .lock()
            .unwrap()
            .indexes
            .get(index)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn object_ids(&self, index: &str) -> Vec<String> {
        self.records(index)
            .into_iter()
            .map(|record| record.object_id)
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn settings(&self, index: &str) -> Option<Value> {
        self.state.lock().unwrap().settings.get(index).cloned()
    }

    pub fn synonyms(&self, index: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .synonyms
            .get(index)
            .cloned()
            .unwrap_or_default()
    }
}

fn rejected(details: &str) -> SearchError {
    SearchError::BackendResponse {
        backend: "fake".to_string(),
        details: details.to_string(),
    }
}

#[async_trait]
impl SearchService for FakeSearchService {
    async fn clear_index(&self, index: &str) -> Result<(), SearchError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Clear(index.to_string()));
        if state.failing_clears {
            return Err(rejected("clear refused"));
        }
        state.indexes.entry(index.to_string()).or_default().clear();
        Ok(())
    }

    async fn delete_by_filter(&self, index: &str, filter: &RecordFilter) -> Result<(), SearchError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::Delete(index.to_string(), filter.clone()));
        if let Some(records) = state.indexes.get_mut(index) {
            records.retain(|_, record| !filter.matches(record));
        }
        Ok(())
    }

    async fn save_records(&self, index: &str, records: &[SearchRecord]) -> Result<(), SearchError> {
        let mut state = self.state.lock().unwrap();
        state.save_calls += 1;
        let call = state.save_calls;
        state.calls.push(Call::Save(
            index.to_string(),
            records.iter().map(|record| record.object_id.clone()).collect(),
        ));
        if state.failing_saves.contains(&call) {
            return Err(rejected("save refused"));
        }

        let stored = state.indexes.entry(index.to_string()).or_default();
        for record in records {
            stored.insert(record.object_id.clone(), record.clone());
        }
        Ok(())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        Ok(self.state.lock().unwrap().indexes.contains_key(index))
    }

    async fn get_settings(&self, index: &str) -> Result<Value, SearchError> {
        Ok(self.settings(index).unwrap_or(Value::Null))
    }

    async fn set_settings(&self, index: &str, settings: &Value) -> Result<(), SearchError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::SetSettings(index.to_string()));
        state.settings.insert(index.to_string(), settings.clone());
        Ok(())
    }

    async fn browse_synonyms(&self, index: &str) -> Result<Vec<Value>, SearchError> {
        Ok(self.synonyms(index))
    }

    async fn replace_synonyms(&self, index: &str, synonyms: &[Value]) -> Result<(), SearchError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::ReplaceSynonyms(index.to_string(), synonyms.len()));
        state.synonyms.insert(index.to_string(), synonyms.to_vec());
        Ok(())
    }

    async fn browse_rules(&self, index: &str) -> Result<Vec<Value>, SearchError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .rules
            .get(index)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_rules(&self, index: &str, rules: &[Value]) -> Result<(), SearchError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::ReplaceRules(index.to_string(), rules.len()));
        state.rules.insert(index.to_string(), rules.to_vec());
        Ok(())
    }
}

/// In-memory multi-tenant content store.
pub struct FakeContentSource {
    pub tenants: Vec<Tenant>,
    pub types: Vec<ContentTypeInfo>,
    items: HashMap<u64, Vec<ContentItem>>,
    failing_types: HashSet<String>,
    failing_pages: HashSet<(String, u32)>,
    requests: Mutex<Vec<(u64, String, ContentStatus, u32)>>,
}

impl FakeContentSource {
    pub fn new(tenants: Vec<Tenant>, types: &[&str]) -> Self {
        Self {
            tenants,
            types: types.iter().map(|name| ContentTypeInfo::public(*name)).collect(),
            items: HashMap::new(),
            failing_types: HashSet::new(),
            failing_pages: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_items(mut self, tenant_id: u64, items: Vec<ContentItem>) -> Self {
        self.items.entry(tenant_id).or_default().extend(items);
        self
    }

    pub fn failing_type(mut self, content_type: &str) -> Self {
        self.failing_types.insert(content_type.to_string());
        self
    }

    pub fn failing_page(mut self, content_type: &str, page: u32) -> Self {
        self.failing_pages.insert((content_type.to_string(), page));
        self
    }

    pub fn requests(&self) -> Vec<(u64, String, ContentStatus, u32)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentSource for FakeContentSource {
    async fn tenants(&self) -> Result<Vec<Tenant>, ContentError> {
        Ok(self.tenants.clone())
    }

    async fn content_types(&self, _tenant: &Tenant) -> Result<Vec<ContentTypeInfo>, ContentError> {
        Ok(self.types.clone())
    }

    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Vec<ContentItem>, ContentError> {
        self.requests.lock().unwrap().push((
            request.tenant.id,
            request.content_type.to_string(),
            request.status,
            request.page,
        ));
        if self.failing_types.contains(request.content_type)
            || self
                .failing_pages
                .contains(&(request.content_type.to_string(), request.page))
        {
            return Err(ContentError::BackendResponse("503 Service Unavailable".to_string()));
        }

        let start = (request.page as usize).saturating_sub(1) * request.page_size;
        Ok(self
            .items
            .get(&request.tenant.id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(|item| item.content_type == request.content_type && item.status == request.status)
            .skip(start)
            .take(request.page_size)
            .cloned()
            .collect())
    }
}

pub fn item(id: u64, content_type: &str, status: ContentStatus, body_chars: usize) -> ContentItem {
    ContentItem {
        id,
        content_type: content_type.to_string(),
        status,
        title: format!("{content_type} {id}"),
        content: "b".repeat(body_chars),
        date: NaiveDate::from_ymd_opt(2022, 5, 1)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .unwrap(),
        permalink: format!("https://example.edu/{content_type}/{id}"),
        featured_image: None,
        fields: Default::default(),
        terms: Default::default(),
        is_revision: false,
        is_autosave: false,
    }
}

pub fn published(id: u64, content_type: &str) -> ContentItem {
    item(id, content_type, ContentStatus::Publish, 10)
}

pub fn primary(id: u64) -> Tenant {
    Tenant {
        is_primary: true,
        ..Tenant::new(id, "Main")
    }
}
