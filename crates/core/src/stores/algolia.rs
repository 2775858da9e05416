use crate::traits::SearchService;
use crate::{RecordFilter, SearchError, SearchRecord};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::form_urlencoded;

const BACKEND: &str = "algolia";
const BROWSE_PAGE_SIZE: usize = 1_000;

#[derive(Debug, Clone)]
pub struct AlgoliaConfig {
    pub app_id: String,
    pub api_key: String,
    /// Defaults to `https://{app_id}.algolia.net`.
    pub host: Option<String>,
    pub batch_size: usize,
    pub task_poll_interval: Duration,
    pub task_max_polls: u32,
}

impl AlgoliaConfig {
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            api_key: api_key.into(),
            host: None,
            batch_size: 1_000,
            task_poll_interval: Duration::from_millis(250),
            task_max_polls: 240,
        }
    }
}

pub struct AlgoliaClient {
    client: Arc<Client>,
    endpoint: Url,
    app_id: String,
    api_key: String,
    batch_size: usize,
    task_poll_interval: Duration,
    task_max_polls: u32,
}

impl AlgoliaClient {
    pub fn new(config: AlgoliaConfig) -> Result<Self, SearchError> {
        let endpoint = config
            .host
            .unwrap_or_else(|| format!("https://{}.algolia.net", config.app_id));

        Ok(Self {
            client: Arc::new(Client::new()),
            endpoint: Url::parse(&endpoint)?,
            app_id: config.app_id,
            api_key: config.api_key,
            batch_size: config.batch_size.max(1),
            task_poll_interval: config.task_poll_interval,
            task_max_polls: config.task_max_polls.max(1),
        })
    }

    fn request(&self, method: Method, index: &str, path: &str) -> Result<RequestBuilder, SearchError> {
        Ok(self
            .client
            .request(method, index_url(&self.endpoint, index, path)?)
            .header("X-Algolia-Application-Id", &self.app_id)
            .header("X-Algolia-API-Key", &self.api_key))
    }

    async fn wait_task(&self, index: &str, task_id: u64) -> Result<(), SearchError> {
        for _ in 0..self.task_max_polls {
            let response = self
                .request(Method::GET, index, &format!("/task/{task_id}"))?
                .send()
                .await?;
            let body = expect_success(response).await?;

            if body.pointer("/status").and_then(Value::as_str) == Some("published") {
                return Ok(());
            }
            tokio::time::sleep(self.task_poll_interval).await;
        }

        Err(SearchError::TaskTimeout {
            index: index.to_string(),
            task_id,
            polls: self.task_max_polls,
        })
    }

    async fn browse(&self, index: &str, path: &str) -> Result<Vec<Value>, SearchError> {
        let mut collected = Vec::new();
        let mut page = 0usize;

        loop {
            let response = self
                .request(Method::POST, index, path)?
                .json(&json!({
                    "query": "",
                    "page": page,
                    "hitsPerPage": BROWSE_PAGE_SIZE,
                }))
                .send()
                .await?;
            let body = expect_success(response).await?;

            let hits = body
                .pointer("/hits")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let count = hits.len();

            collected.extend(hits.into_iter().map(strip_highlight));
            if count < BROWSE_PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(collected)
    }
}

#[async_trait]
impl SearchService for AlgoliaClient {
    async fn clear_index(&self, index: &str) -> Result<(), SearchError> {
        let response = self.request(Method::POST, index, "/clear")?.send().await?;
        let body = expect_success(response).await?;
        self.wait_task(index, task_id(&body)?).await
    }

    async fn delete_by_filter(&self, index: &str, filter: &RecordFilter) -> Result<(), SearchError> {
        let params = form_urlencoded::Serializer::new(String::new())
            .append_pair("filters", &filter.to_filter_string())
            .finish();

        let response = self
            .request(Method::POST, index, "/deleteByQuery")?
            .json(&json!({ "params": params }))
            .send()
            .await?;
        let body = expect_success(response).await?;
        self.wait_task(index, task_id(&body)?).await
    }

    async fn save_records(&self, index: &str, records: &[SearchRecord]) -> Result<(), SearchError> {
        for chunk in records.chunks(self.batch_size) {
            let requests = chunk
                .iter()
                .map(|record| -> Result<Value, serde_json::Error> {
                    Ok(json!({
                        "action": "updateObject",
                        "body": serde_json::to_value(record)?,
                    }))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let response = self
                .request(Method::POST, index, "/batch")?
                .json(&json!({ "requests": requests }))
                .send()
                .await?;
            expect_success(response).await?;
            debug!(index = %index, records = chunk.len(), "batch sent");
        }

        Ok(())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        let response = self.request(Method::GET, index, "/settings")?.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        expect_success(response).await?;
        Ok(true)
    }

    async fn get_settings(&self, index: &str) -> Result<Value, SearchError> {
        let response = self.request(Method::GET, index, "/settings")?.send().await?;
        expect_success(response).await
    }

    async fn set_settings(&self, index: &str, settings: &Value) -> Result<(), SearchError> {
        let response = self
            .request(Method::PUT, index, "/settings")?
            .json(settings)
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    async fn browse_synonyms(&self, index: &str) -> Result<Vec<Value>, SearchError> {
        self.browse(index, "/synonyms/search").await
    }

    async fn replace_synonyms(&self, index: &str, synonyms: &[Value]) -> Result<(), SearchError> {
        let response = self
            .request(
                Method::POST,
                index,
                "/synonyms/batch?replaceExistingSynonyms=true&forwardToReplicas=false",
            )?
            .json(synonyms)
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    async fn browse_rules(&self, index: &str) -> Result<Vec<Value>, SearchError> {
        self.browse(index, "/rules/search").await
    }

    async fn replace_rules(&self, index: &str, rules: &[Value]) -> Result<(), SearchError> {
        let response = self
            .request(Method::POST, index, "/rules/batch?clearExistingRules=true")?
            .json(rules)
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }
}

/// `{endpoint}/1/indexes/{index}{path}` with the index name as one
/// percent-encoded path segment. `path` may carry a query string.
fn index_url(endpoint: &Url, index: &str, path: &str) -> Result<Url, SearchError> {
    let (path, query) = match path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path, None),
    };

    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|()| SearchError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(["1", "indexes", index])
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    url.set_query(query);
    Ok(url)
}

fn task_id(body: &Value) -> Result<u64, SearchError> {
    body.pointer("/taskID")
        .and_then(Value::as_u64)
        .ok_or_else(|| SearchError::BackendResponse {
            backend: BACKEND.to_string(),
            details: format!("response carries no taskID: {body}"),
        })
}

async fn expect_success(response: Response) -> Result<Value, SearchError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| body.pointer("/message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(text);
        return Err(SearchError::BackendResponse {
            backend: BACKEND.to_string(),
            details: format!("{status}: {message}"),
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

fn strip_highlight(mut hit: Value) -> Value {
    if let Some(object) = hit.as_object_mut() {
        object.remove("_highlightResult");
    }
    hit
}
