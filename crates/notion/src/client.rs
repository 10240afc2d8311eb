//! HTTP client for the Notion API.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::SdkError;
use crate::types::{CreatePageRequest, Database, QueryRequest, QueryResponse};

const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1/";
const NOTION_VERSION: &str = "2022-06-28";

/// Client for the three remote calls ntx relies on.
///
/// All calls are single-shot: no retry, no timeout beyond what the transport
/// applies. Callers that need to bound waiting wrap a call in
/// [`crate::poll_until`].
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl NotionClient {
    /// Create a client against the production API.
    pub fn new(token: impl Into<String>) -> Result<Self, SdkError> {
        let base_url = Url::parse(DEFAULT_BASE_URL)?;
        Ok(Self::with_base_url(token, base_url))
    }

    /// Create a client against an arbitrary base URL. Used by tests and
    /// proxied deployments.
    pub fn with_base_url(token: impl Into<String>, base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: token.into(),
        }
    }

    /// Fetch the schema of a database: its property descriptor map and title.
    pub async fn retrieve_database(&self, database_id: &str) -> Result<Database, SdkError> {
        let url = self.endpoint(&format!("databases/{database_id}"))?;
        tracing::debug!(database_id, "retrieving database schema");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Query one page of rows from a database.
    pub async fn query_database(
        &self,
        database_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, SdkError> {
        let url = self.endpoint(&format!("databases/{database_id}/query"))?;
        tracing::debug!(database_id, "querying database");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Create a record. Returns the created page as raw JSON.
    pub async fn create_page(&self, request: &CreatePageRequest) -> Result<Value, SdkError> {
        let url = self.endpoint("pages")?;
        tracing::debug!(database_id = %request.parent.database_id, "creating page");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, SdkError> {
        Ok(self.base_url.join(path)?)
    }

    /// Turn a response into `T`, mapping non-success statuses to
    /// [`SdkError::Api`] with the remote error message when one is present.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SdkError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SdkError::Api {
            status: status.as_u16(),
            message: extract_error_message(status, &body),
        })
    }
}

/// Pull the `message` field out of a Notion error body, falling back to the
/// raw body or the status line.
fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body)
        && let Some(message) = value.get("message").and_then(Value::as_str)
    {
        return message.to_string();
    }
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}
