use crate::traits::{ContentSource, PageRequest};
use crate::{ContentError, ContentItem, ContentTypeInfo, Tenant};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Client for the JSON export endpoints the CMS exposes:
/// `/sites`, `/sites/{id}/types` and `/sites/{id}/items`.
pub struct RestContentSource {
    client: Arc<Client>,
    base: Url,
    token: Option<String>,
}

impl RestContentSource {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ContentError> {
        // A trailing slash keeps the last path segment when joining.
        let base = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };

        Ok(Self {
            client: Arc::new(Client::new()),
            base,
            token,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ContentError> {
        Ok(self.base.join(path)?)
    }

    fn page_url(&self, request: &PageRequest<'_>) -> Result<Url, ContentError> {
        let mut url = self.url(&format!("sites/{}/items", request.tenant.id))?;
        url.query_pairs_mut()
            .append_pair("type", request.content_type)
            .append_pair("status", request.status.as_str())
            .append_pair("page", &request.page.to_string())
            .append_pair("per_page", &request.page_size.to_string());
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ContentError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContentError::BackendResponse(format!("{status}: {body}")));
        }

        let raw = response.bytes().await?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

#[async_trait]
impl ContentSource for RestContentSource {
    async fn tenants(&self) -> Result<Vec<Tenant>, ContentError> {
        self.get(self.url("sites")?).await
    }

    async fn content_types(&self, tenant: &Tenant) -> Result<Vec<ContentTypeInfo>, ContentError> {
        self.get(self.url(&format!("sites/{}/types", tenant.id))?).await
    }

    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Vec<ContentItem>, ContentError> {
        self.get(self.page_url(request)?).await
    }
}
