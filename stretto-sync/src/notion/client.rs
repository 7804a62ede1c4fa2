//! Notion REST client
//!
//! Thin `reqwest` wrapper implementing [`DocumentApi`]. One request per
//! call, no retries; a non-2xx answer becomes `Error::RemoteApi` carrying
//! the status code and response body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::{json, Value};
use stretto_common::config::NotionConfig;
use stretto_common::{Error, Result};
use tracing::debug;

use super::{BlockRef, ContentBlock, DocumentApi, PageRef, RemoteBlock};

const NOTION_VERSION: &str = "2022-06-28";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<PageRef>,
}

#[derive(Debug, Deserialize)]
struct ChildrenResponse {
    #[serde(default)]
    results: Vec<RemoteBlock>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    #[serde(default)]
    results: Vec<BlockRef>,
}

/// Notion API client bound to one repertoire database
pub struct NotionClient {
    http_client: reqwest::Client,
    base_url: String,
    repertoire_db_id: String,
}

impl NotionClient {
    pub fn new(config: &NotionConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| Error::Config(format!("invalid Notion API key: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::RemoteApi(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            repertoire_db_id: config.repertoire_db_id.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send<T: serde::de::DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::RemoteApi(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RemoteApi(format!("{}: {}", status.as_u16(), body)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::RemoteApi(format!("unreadable response: {}", e)))
    }
}

#[async_trait]
impl DocumentApi for NotionClient {
    async fn find_page_by_key(&self, key: &str) -> Result<Option<PageRef>> {
        let body = json!({
            "filter": {
                "property": "piece_id",
                "rich_text": { "equals": key }
            }
        });
        let url = self.url(&format!("databases/{}/query", self.repertoire_db_id));
        let response: QueryResponse = self.send(self.http_client.post(url).json(&body)).await?;
        Ok(response.results.into_iter().next())
    }

    async fn create_page(&self, properties: Value) -> Result<PageRef> {
        let body = json!({
            "parent": { "database_id": self.repertoire_db_id },
            "properties": properties,
        });
        self.send(self.http_client.post(self.url("pages")).json(&body)).await
    }

    async fn list_children(&self, block_id: &str, page_size: u32) -> Result<Vec<RemoteBlock>> {
        let url = self.url(&format!("blocks/{}/children", block_id));
        let request = self
            .http_client
            .get(url)
            .query(&[("page_size", page_size.to_string())]);
        let response: ChildrenResponse = self.send(request).await?;
        if response.has_more {
            debug!(block_id, page_size, "Children listing truncated to first page");
        }
        Ok(response.results)
    }

    async fn append_children(&self, block_id: &str, blocks: &[ContentBlock]) -> Result<Vec<BlockRef>> {
        let url = self.url(&format!("blocks/{}/children", block_id));
        let body = json!({ "children": blocks });
        let response: AppendResponse = self.send(self.http_client.patch(url).json(&body)).await?;
        Ok(response.results)
    }

    async fn delete_block(&self, block_id: &str) -> Result<()> {
        let url = self.url(&format!("blocks/{}", block_id));
        let _: Value = self.send(self.http_client.delete(url)).await?;
        Ok(())
    }
}
