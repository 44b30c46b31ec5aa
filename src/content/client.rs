//! Content client - executes queries against a content store

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::model::{CategorySummary, Post, PostSummary, SlugEntry};
use super::query::Query;
use crate::config::ContentConfig;
use crate::error::{Error, Result};

/// A read-only store that answers content queries
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Execute a query and return the raw `result` value
    async fn fetch_raw(&self, query: &Query) -> Result<Value>;
}

impl dyn ContentSource + '_ {
    /// Execute a query and decode the result
    pub async fn fetch<T: DeserializeOwned>(&self, query: &Query) -> Result<T> {
        let value = self.fetch_raw(query).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// All posts, newest first
    pub async fn posts(&self) -> Result<Vec<PostSummary>> {
        self.fetch(&Query::PostList).await
    }

    /// All categories with their post counts
    pub async fn categories(&self) -> Result<Vec<CategorySummary>> {
        self.fetch(&Query::Categories).await
    }

    /// The post with the given slug, if any
    pub async fn post(&self, slug: &str) -> Result<Option<Post>> {
        self.fetch(&Query::post_by_slug(slug)).await
    }

    /// Slugs of every addressable post
    pub async fn slugs(&self) -> Result<Vec<SlugEntry>> {
        self.fetch(&Query::Slugs).await
    }
}

/// HTTP client for the hosted content API
#[derive(Debug, Clone)]
pub struct SanityClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl SanityClient {
    /// Create a client for the configured project and dataset
    pub fn new(config: &ContentConfig) -> Self {
        Self::with_token(config, config.token())
    }

    /// Create a client with an explicit token
    pub fn with_token(config: &ContentConfig, token: Option<String>) -> Self {
        // Authenticated reads bypass the CDN so private documents resolve
        let host = if config.use_cdn && token.is_none() {
            "apicdn.sanity.io"
        } else {
            "api.sanity.io"
        };
        let version = config.api_version.trim_start_matches('v');
        let endpoint = format!(
            "https://{}.{}/v{}/data/query/{}",
            config.project_id, host, version, config.dataset
        );

        Self {
            http: reqwest::Client::new(),
            endpoint,
            token,
        }
    }

    /// Query endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ContentSource for SanityClient {
    async fn fetch_raw(&self, query: &Query) -> Result<Value> {
        tracing::debug!("Querying {} at {}", query, self.endpoint);

        let mut request = self.http.get(&self.endpoint).query(&query.to_url_params());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error.description.or(e.error.message))
                .unwrap_or(body);
            tracing::warn!("Query {} failed with {}: {}", query, status, message);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: QueryResponse = response.json().await?;
        Ok(body.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdn_endpoint() {
        let config = ContentConfig::default();
        let client = SanityClient::with_token(&config, None);
        assert_eq!(
            client.endpoint(),
            "https://c10s91qu.apicdn.sanity.io/v2024-01-01/data/query/production"
        );
    }

    #[test]
    fn test_token_bypasses_cdn() {
        let config = ContentConfig {
            api_version: "v2023-05-03".to_string(),
            dataset: "staging".to_string(),
            ..ContentConfig::default()
        };
        let client = SanityClient::with_token(&config, Some("secret".to_string()));
        assert_eq!(
            client.endpoint(),
            "https://c10s91qu.api.sanity.io/v2023-05-03/data/query/staging"
        );
    }

    #[test]
    fn test_api_error_body() {
        let body = r#"{"error":{"description":"expected '}' following object body","type":"queryParseError"}}"#;
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.error.description.as_deref(),
            Some("expected '}' following object body")
        );
    }
}
