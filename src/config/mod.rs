use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub recommendation_api: RecommendationApiConfig,
    pub redis: RedisConfig,
    pub cache: CacheConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationApiConfig {
    pub base_url: String,
    pub community_path: String,
    /// Zero leaves the HTTP client's default in place.
    pub timeout_seconds: u64,
}

impl RecommendationApiConfig {
    pub fn community_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.community_path.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub key_prefix: String,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub recommendations_collection: String,
    pub likes_collection: String,
    pub sessions_collection: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub top_k: usize,
    pub connection_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            connection_threshold: 10.0,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            recommendations_collection: "community_recommendations".to_string(),
            likes_collection: "community_likes".to_string(),
            sessions_collection: "user_sessions".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recommendation_api: RecommendationApiConfig {
                base_url: "https://taste-backend-fxwh.onrender.com".to_string(),
                community_path: "community-recommendations".to_string(),
                timeout_seconds: 0,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                key_prefix: "tastematch".to_string(),
                ttl_seconds: 7 * 24 * 3600,
            },
            cache: CacheConfig::default(),
            matching: MatchingConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("TASTEMATCH").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_community_url_joins_cleanly() {
        let mut api = Config::default().recommendation_api;
        api.base_url = "http://localhost:5000/".to_string();
        api.community_path = "/community-recommendations".to_string();
        assert_eq!(api.community_url(), "http://localhost:5000/community-recommendations");
    }

    #[test]
    fn test_zero_timeout_means_client_default() {
        let mut api = Config::default().recommendation_api;
        assert_eq!(api.timeout(), None);
        api.timeout_seconds = 15;
        assert_eq!(api.timeout(), Some(Duration::from_secs(15)));
    }
}
