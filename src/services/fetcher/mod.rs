use crate::config::RecommendationApiConfig;
use crate::models::RecommendationPayload;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("recommendation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("recommendation backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("recommendation backend returned an unreadable body: {0}")]
    Decode(String),
}

/// Source of fresh recommendations for a (category, subject tag) pair.
#[async_trait]
pub trait RecommendationFetcher: Send + Sync {
    async fn fetch(&self, category: &str, subject_tag: &str) -> Result<RecommendationPayload, FetchError>;
}

#[derive(Debug, Serialize)]
struct CommunityRequest<'a> {
    category: String,
    archetype: &'a str,
}

/// POSTs `{category, archetype}` as JSON to the community recommendation endpoint.
pub struct HttpRecommendationFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpRecommendationFetcher {
    pub fn new(config: &RecommendationApiConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: config.community_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RecommendationFetcher for HttpRecommendationFetcher {
    async fn fetch(&self, category: &str, subject_tag: &str) -> Result<RecommendationPayload, FetchError> {
        let request = CommunityRequest {
            category: category.to_lowercase(),
            archetype: subject_tag,
        };

        debug!("POST {} for {} / {}", self.url, subject_tag, request.category);
        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
