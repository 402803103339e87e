use crate::config::CacheConfig;
use crate::models::{LikeTally, PollItem, RecommendationPayload};
use crate::services::recommendation::placeholder_image;
use crate::services::store::DocumentStore;
use crate::utils::validation::validate_poll_item_id;
use crate::utils::{cache_key, iso_week_id, likes_key, Clock};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

const FEATURED_FLOOR: i64 = -1;

/// Weekly "vote for your favourite" poll built on top of a recommendation payload.
pub struct CommunityPoll {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    collection: String,
}

impl CommunityPoll {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>, config: &CacheConfig) -> Self {
        Self {
            store,
            clock,
            collection: config.likes_collection.clone(),
        }
    }

    /// The first five recommendations as poll entries, padded with placeholders.
    pub fn poll_items(payload: &RecommendationPayload) -> Vec<PollItem> {
        LikeTally::ITEM_IDS
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let n = index + 1;
                match payload.recommendations.get(index) {
                    Some(item) => PollItem {
                        id: id.to_string(),
                        title: item
                            .title()
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("Item {}", n)),
                        image: item.image.clone().unwrap_or_else(|| placeholder_image(n)),
                    },
                    None => PollItem {
                        id: id.to_string(),
                        title: "No data".to_string(),
                        image: placeholder_image(n),
                    },
                }
            })
            .collect()
    }

    pub fn likes_document_id(&self, subject_tag: &str, category: &str) -> String {
        let week_id = iso_week_id(&self.clock.now());
        likes_key(&cache_key(subject_tag, category, &week_id))
    }

    pub async fn like_tally(&self, subject_tag: &str, category: &str) -> Result<LikeTally> {
        let id = self.likes_document_id(subject_tag, category);
        match self.store.get(&self.collection, &id).await? {
            Some(document) => Ok(serde_json::from_value(document)?),
            None => Ok(LikeTally::default()),
        }
    }

    /// Adds a like, or removes one when `currently_liked`, and returns the new tally.
    ///
    /// Read-modify-write without locking; concurrent toggles on the same
    /// document may lose an update.
    pub async fn toggle_like(
        &self,
        subject_tag: &str,
        category: &str,
        item_id: &str,
        currently_liked: bool,
    ) -> Result<LikeTally> {
        validate_poll_item_id(item_id)?;

        let week_id = iso_week_id(&self.clock.now());
        let id = likes_key(&cache_key(subject_tag, category, &week_id));

        let mut tally = match self.store.get(&self.collection, &id).await? {
            Some(document) => serde_json::from_value(document)?,
            None => LikeTally {
                week_id,
                archetype: subject_tag.to_string(),
                category: category.to_lowercase(),
                ..LikeTally::default()
            },
        };

        let delta = if currently_liked { -1 } else { 1 };
        tally.add(item_id, delta);
        self.store
            .put(&self.collection, &id, serde_json::to_value(&tally)?)
            .await?;

        info!("Recorded {:+} for {} in {}", delta, item_id, id);
        Ok(tally)
    }

    /// The item with the highest count above -1; earlier items win ties.
    ///
    /// Counts can go negative through unlikes, so a poll where every count is
    /// -1 or lower has no featured item.
    pub fn featured_item<'a>(tally: &LikeTally, items: &'a [PollItem]) -> Option<&'a PollItem> {
        let mut featured = None;
        let mut highest = FEATURED_FLOOR;

        for item in items {
            let Some(count) = tally.count(&item.id) else {
                continue;
            };
            if count > highest {
                highest = count;
                featured = Some(item);
            }
        }

        featured
    }
}
