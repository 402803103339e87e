pub mod algorithms;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use models::*;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Composition root: builds every service once and owns their lifecycle.
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn services::store::DocumentStore>,
    pub recommendations: Arc<services::recommendation::WeeklyRecommendationCache>,
    pub poll: Arc<services::poll::CommunityPoll>,
    pub sessions: Arc<services::session::SessionStore>,
    pub matcher: Arc<algorithms::TasteMatcher<algorithms::OverlapScorer>>,
    pub tasks: Arc<utils::TaskSpawner>,
}

impl AppState {
    /// Wires the Redis store, HTTP fetcher and system clock.
    pub fn new(config: Config) -> Result<Self> {
        let store = Arc::new(services::store::RedisStore::new(&config.redis)?);
        let fetcher = Arc::new(services::fetcher::HttpRecommendationFetcher::new(
            &config.recommendation_api,
        )?);

        Ok(Self::with_collaborators(
            config,
            store,
            fetcher,
            Arc::new(utils::SystemClock),
        ))
    }

    pub fn with_collaborators(
        config: Config,
        store: Arc<dyn services::store::DocumentStore>,
        fetcher: Arc<dyn services::fetcher::RecommendationFetcher>,
        clock: Arc<dyn utils::Clock>,
    ) -> Self {
        let config = Arc::new(config);
        let tasks = Arc::new(utils::TaskSpawner::new());

        let recommendations = Arc::new(services::recommendation::WeeklyRecommendationCache::new(
            store.clone(),
            fetcher,
            clock.clone(),
            tasks.clone(),
            &config.cache,
        ));

        let poll = Arc::new(services::poll::CommunityPoll::new(
            store.clone(),
            clock.clone(),
            &config.cache,
        ));

        let sessions = Arc::new(services::session::SessionStore::new(
            store.clone(),
            clock,
            &config.cache,
        ));

        let matcher = Arc::new(algorithms::TasteMatcher::new(
            algorithms::OverlapScorer,
            &config.matching,
        ));

        Self {
            config,
            store,
            recommendations,
            poll,
            sessions,
            matcher,
            tasks,
        }
    }

    /// Waits for outstanding background writes.
    pub async fn shutdown(&self) {
        let pending = self.tasks.pending();
        if pending > 0 {
            info!("Waiting for {} background task(s) before shutdown", pending);
        }
        self.tasks.flush().await;
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
