use crate::config::CacheConfig;
use crate::models::{CachedRecommendationRecord, RecommendationItem, RecommendationPayload};
use crate::services::fetcher::RecommendationFetcher;
use crate::services::store::DocumentStore;
use crate::utils::metrics::{CacheMetrics, CacheMetricsSnapshot};
use crate::utils::{cache_key, iso_week_id, Clock, TaskSpawner};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const FALLBACK_ITEM_COUNT: usize = 5;

/// Where a served payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    Cache,
    Fresh,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheOutcome {
    pub key: String,
    pub source: PayloadSource,
    pub payload: RecommendationPayload,
}

/// Generic placeholder set served when the backend cannot be reached.
pub fn fallback_payload(subject_tag: &str, category: &str) -> RecommendationPayload {
    let recommendations = (1..=FALLBACK_ITEM_COUNT)
        .map(|n| {
            RecommendationItem::new(format!("{} Item {}", category, n))
                .with_image(placeholder_image(n))
        })
        .collect();

    RecommendationPayload {
        recommendations,
        category: category.to_lowercase(),
        archetype: subject_tag.to_string(),
    }
}

pub fn placeholder_image(n: usize) -> String {
    format!("https://picsum.photos/200/200?random={}", n)
}

/// Read-through cache over the recommendation backend, keyed per subject
/// tag, category and week.
///
/// The store is always consulted before the fetcher. Fresh payloads are
/// written back in the background; fallbacks are never written, so the next
/// call in the same week retries the backend.
pub struct WeeklyRecommendationCache {
    store: Arc<dyn DocumentStore>,
    fetcher: Arc<dyn RecommendationFetcher>,
    clock: Arc<dyn Clock>,
    tasks: Arc<TaskSpawner>,
    metrics: Arc<CacheMetrics>,
    collection: String,
}

impl WeeklyRecommendationCache {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        fetcher: Arc<dyn RecommendationFetcher>,
        clock: Arc<dyn Clock>,
        tasks: Arc<TaskSpawner>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            clock,
            tasks,
            metrics: Arc::new(CacheMetrics::new()),
            collection: config.recommendations_collection.clone(),
        }
    }

    pub fn current_key(&self, subject_tag: &str, category: &str) -> String {
        cache_key(subject_tag, category, &iso_week_id(&self.clock.now()))
    }

    pub async fn get_recommendations(&self, subject_tag: &str, category: &str) -> CacheOutcome {
        let now = self.clock.now();
        let week_id = iso_week_id(&now);
        let key = cache_key(subject_tag, category, &week_id);

        if let Some(payload) = self.read_cached(&key).await {
            self.metrics.record_hit();
            info!("Serving cached recommendations for {}", key);
            return CacheOutcome {
                key,
                source: PayloadSource::Cache,
                payload,
            };
        }
        self.metrics.record_miss();

        match self.fetcher.fetch(category, subject_tag).await {
            Ok(payload) => {
                self.metrics.record_fresh();
                info!(
                    "Fetched {} fresh recommendations for {}",
                    payload.recommendations.len(),
                    key
                );

                let record = CachedRecommendationRecord::new(&payload, &week_id, now.with_timezone(&Utc));
                self.write_back(key.clone(), record);

                CacheOutcome {
                    key,
                    source: PayloadSource::Fresh,
                    payload,
                }
            }
            Err(e) => {
                self.metrics.record_fallback();
                warn!("Recommendation fetch for {} failed, serving fallback: {}", key, e);
                CacheOutcome {
                    key,
                    source: PayloadSource::Fallback,
                    payload: fallback_payload(subject_tag, category),
                }
            }
        }
    }

    pub fn metrics(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn read_cached(&self, key: &str) -> Option<RecommendationPayload> {
        match self.store.get(&self.collection, key).await {
            // Any stored document under the key is a hit; record metadata is not required.
            Ok(Some(document)) => match serde_json::from_value::<RecommendationPayload>(document) {
                Ok(payload) => Some(payload),
                Err(e) => {
                    warn!("Ignoring unreadable cache document {}: {}", key, e);
                    None
                }
            },
            Ok(None) => {
                debug!("Cache miss for {}", key);
                None
            }
            Err(e) => {
                self.metrics.record_store_read_error();
                warn!("Cache read for {} failed, treating as miss: {}", key, e);
                None
            }
        }
    }

    fn write_back(&self, key: String, record: CachedRecommendationRecord) {
        let store = self.store.clone();
        let metrics = self.metrics.clone();
        let collection = self.collection.clone();

        self.tasks.spawn_logged("cache-write", async move {
            let document = serde_json::to_value(&record)?;
            if let Err(e) = store.put(&collection, &key, document).await {
                metrics.record_store_write_error();
                return Err(anyhow::Error::from(e).context(format!("writing {}", key)));
            }
            Ok::<(), anyhow::Error>(())
        });
    }
}
